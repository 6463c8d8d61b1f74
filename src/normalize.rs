//! Result normalization and ranking.
//!
//! Turns validated [`Prediction`] records into display-ready
//! [`Assessment`]s. Missing or odd values degrade to "indeterminate" and
//! "N/A"; nothing in here can fail.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::models::{Prediction, RawPrediction};
use crate::schema::DiseaseId;

/// Marker shown for an unavailable number
pub const UNAVAILABLE: &str = "N/A";

/// Three-way bucket derived from the result code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    AtRisk,
    Clear,
    Indeterminate,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::AtRisk => "at risk",
            Severity::Clear => "clear",
            Severity::Indeterminate => "indeterminate",
        }
    }

    /// Higher is riskier
    fn rank(&self) -> u8 {
        match self {
            Severity::AtRisk => 2,
            Severity::Indeterminate => 1,
            Severity::Clear => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `1` is at risk, `0` is clear, anything else (including no code) is
/// indeterminate.
pub fn classify(result: Option<i64>) -> Severity {
    match result {
        Some(1) => Severity::AtRisk,
        Some(0) => Severity::Clear,
        _ => Severity::Indeterminate,
    }
}

/// Two decimals and a percent sign, or [`UNAVAILABLE`] for a missing or
/// non-finite value.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v),
        _ => UNAVAILABLE.to_string(),
    }
}

/// Format a 0..=1 probability as a percentage.
pub fn format_probability(prob: Option<f64>) -> String {
    format_percent(prob.map(|p| p * 100.0))
}

/// Display-ready outcome for one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// `None` for a single-mode result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease: Option<DiseaseId>,
    pub severity: Severity,
    pub message: String,
    pub confidence: Option<f64>,
    pub raw_prob: Option<f64>,
    pub confidence_text: String,
    pub raw_prob_text: String,
}

impl Assessment {
    pub fn new(disease: Option<DiseaseId>, prediction: &Prediction) -> Self {
        Self {
            disease,
            severity: classify(prediction.result),
            message: prediction.message.clone(),
            confidence: prediction.confidence,
            raw_prob: prediction.raw_prob,
            confidence_text: format_percent(prediction.confidence),
            raw_prob_text: format_probability(prediction.raw_prob),
        }
    }
}

/// Normalize a single-mode response.
pub fn assess_single(raw: &RawPrediction) -> Assessment {
    Assessment::new(None, &Prediction::from_raw(raw))
}

/// Normalize and rank a multi-mode `results` map.
///
/// Keys outside the disease registry are logged and skipped. Every known
/// disease present in the map yields exactly one assessment, however
/// incomplete its record.
pub fn assess_multi(results: &HashMap<String, Value>) -> Vec<Assessment> {
    let mut assessments: Vec<Assessment> = results
        .iter()
        .filter_map(|(name, value)| match name.parse::<DiseaseId>() {
            Ok(disease) => {
                let raw = RawPrediction::from_value(value.clone());
                Some(Assessment::new(Some(disease), &Prediction::from_raw(&raw)))
            }
            Err(e) => {
                warn!("Skipping result entry: {}", e);
                None
            }
        })
        .collect();

    rank(&mut assessments);
    assessments
}

/// Sort riskiest first.
///
/// Order: severity (at risk, indeterminate, clear), then `raw_prob`
/// descending, then `confidence` descending, then registry order. Missing
/// numbers sort after present ones.
pub fn rank(assessments: &mut [Assessment]) {
    assessments.sort_by(|a, b| {
        b.severity
            .rank()
            .cmp(&a.severity.rank())
            .then_with(|| desc_missing_last(a.raw_prob, b.raw_prob))
            .then_with(|| desc_missing_last(a.confidence, b.confidence))
            .then_with(|| a.disease.cmp(&b.disease))
    });
}

fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
