use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::schema::DiseaseId;

/// `POST /predict` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePredictRequest {
    pub disease: DiseaseId,
    /// One value per registry field, in registry order
    pub data: Vec<f64>,
}

/// `POST /multi-predict` request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPredictRequest {
    /// Feature vector per disease, serialized in registry order
    pub data: BTreeMap<DiseaseId, Vec<f64>>,
}

/// One prediction record as sent by the service.
///
/// Every field is optional and loosely typed: the service is not trusted
/// to send a complete or well-formed record. Convert with
/// [`Prediction::from_raw`] before using it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub confidence: Option<Value>,
    #[serde(default)]
    pub raw_prob: Option<Value>,
    /// Set instead of the other fields when the service failed for one
    /// disease of a multi-disease request
    #[serde(default)]
    pub error: Option<Value>,
}

impl RawPrediction {
    /// Lenient conversion; anything that is not an object yields an empty
    /// record.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

/// `POST /multi-predict` response body (entries kept untyped)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MultiPredictResponse {
    #[serde(default)]
    pub results: Option<HashMap<String, Value>>,
}

/// Error body of a non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Validated prediction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Integral result code, `None` when missing or not an integer
    pub result: Option<i64>,
    pub message: String,
    /// Confidence in percent
    pub confidence: Option<f64>,
    /// Probability of disease, 0..=1
    pub raw_prob: Option<f64>,
}

impl Prediction {
    /// Validate a raw record field by field. Never fails.
    pub fn from_raw(raw: &RawPrediction) -> Self {
        let message = raw
            .message
            .as_ref()
            .and_then(text)
            .or_else(|| raw.error.as_ref().and_then(text))
            .unwrap_or_default();

        Self {
            result: raw.result.as_ref().and_then(integral),
            message,
            confidence: raw.confidence.as_ref().and_then(finite),
            raw_prob: raw.raw_prob.as_ref().and_then(finite),
        }
    }
}

fn integral(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    let v = value.as_f64()?;
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

fn finite(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Replace bare `NaN`, `Infinity` and `-Infinity` tokens with `null`.
///
/// Python's JSON encoder emits these for non-finite floats, which makes the
/// body invalid JSON. String contents are left untouched.
pub fn sanitize_non_finite(body: &str) -> Cow<'_, str> {
    if !body.contains("NaN") && !body.contains("Infinity") {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            rest = &rest[c.len_utf8()..];
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if let Some(token) = ["-Infinity", "Infinity", "NaN"]
            .into_iter()
            .find(|t| rest.starts_with(t))
        {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_request_wire_format() {
        let req = SinglePredictRequest {
            disease: DiseaseId::HeartDisease,
            data: vec![54.0, 1.0],
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"disease": "Heart Disease", "data": [54.0, 1.0]})
        );
    }

    #[test]
    fn test_multi_request_keys_in_registry_order() {
        let mut data = BTreeMap::new();
        data.insert(DiseaseId::LiverDisease, vec![1.0]);
        data.insert(DiseaseId::Diabetes, vec![2.0]);
        let body = serde_json::to_string(&MultiPredictRequest { data }).unwrap();
        assert_eq!(body, r#"{"data":{"Diabetes":[2.0],"Liver Disease":[1.0]}}"#);
    }

    #[test]
    fn test_prediction_from_complete_record() {
        let raw = RawPrediction::from_value(json!({
            "result": 1,
            "message": "Has Disease",
            "confidence": 82.3,
            "raw_prob": 0.91
        }));
        let p = Prediction::from_raw(&raw);
        assert_eq!(p.result, Some(1));
        assert_eq!(p.message, "Has Disease");
        assert_eq!(p.confidence, Some(82.3));
        assert_eq!(p.raw_prob, Some(0.91));
    }

    #[test]
    fn test_prediction_from_partial_record() {
        let raw = RawPrediction::from_value(json!({"result": "x", "confidence": null}));
        let p = Prediction::from_raw(&raw);
        assert_eq!(p.result, None);
        assert_eq!(p.message, "");
        assert_eq!(p.confidence, None);
        assert_eq!(p.raw_prob, None);
    }

    #[test]
    fn test_prediction_from_non_object() {
        let p = Prediction::from_raw(&RawPrediction::from_value(json!([1, 2])));
        assert_eq!(p.result, None);
        assert_eq!(p.confidence, None);
    }

    #[test]
    fn test_prediction_error_entry_uses_error_text() {
        let raw = RawPrediction::from_value(json!({"error": "Expected 10 features"}));
        let p = Prediction::from_raw(&raw);
        assert_eq!(p.message, "Expected 10 features");
        assert_eq!(p.result, None);
    }

    #[test]
    fn test_integral_result_codes() {
        let raw = RawPrediction::from_value(json!({"result": 1.0}));
        assert_eq!(Prediction::from_raw(&raw).result, Some(1));
        let raw = RawPrediction::from_value(json!({"result": 0.5}));
        assert_eq!(Prediction::from_raw(&raw).result, None);
        let raw = RawPrediction::from_value(json!({"result": -1}));
        assert_eq!(Prediction::from_raw(&raw).result, Some(-1));
    }

    #[test]
    fn test_string_numbers_are_not_trusted() {
        let raw = RawPrediction::from_value(json!({"confidence": "82.3"}));
        assert_eq!(Prediction::from_raw(&raw).confidence, None);
    }

    #[test]
    fn test_sanitize_non_finite() {
        let body = r#"{"confidence": NaN, "raw_prob": -Infinity, "message": "NaN stays"}"#;
        let clean = sanitize_non_finite(body);
        assert_eq!(
            clean,
            r#"{"confidence": null, "raw_prob": null, "message": "NaN stays"}"#
        );
        let value: Value = serde_json::from_str(&clean).unwrap();
        assert_eq!(value["message"], "NaN stays");
    }

    #[test]
    fn test_sanitize_leaves_clean_body_borrowed() {
        let body = r#"{"result": 0}"#;
        assert!(matches!(sanitize_non_finite(body), Cow::Borrowed(_)));
    }

    #[test]
    fn test_multi_response_without_results() {
        let resp: MultiPredictResponse = serde_json::from_str(r#"{"other": 1}"#).unwrap();
        assert!(resp.results.is_none());
    }
}
