//! Request builder: turns the form into the payload the scoring service
//! expects.
//!
//! Default policy: a field that is missing, blank or unparseable is sent
//! as `0`. Submission is never blocked on individual fields.

use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{validate_feature_count, PayloadError, SubmitError};
use crate::form::{field_key, FormState, Mode};
use crate::models::{MultiPredictRequest, SinglePredictRequest};
use crate::schema::DiseaseId;

/// Value sent for a field with no usable input
pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

/// Wire payload for either endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    Single(SinglePredictRequest),
    Multi(MultiPredictRequest),
}

impl RequestPayload {
    pub fn mode(&self) -> Mode {
        match self {
            RequestPayload::Single(_) => Mode::Single,
            RequestPayload::Multi(_) => Mode::Multi,
        }
    }

    /// Check every feature vector length against the registry.
    pub fn validate(&self) -> Result<(), PayloadError> {
        match self {
            RequestPayload::Single(req) => validate_feature_count(req.disease, req.data.len()),
            RequestPayload::Multi(req) => {
                for disease in DiseaseId::ALL {
                    let data = req
                        .data
                        .get(&disease)
                        .ok_or(PayloadError::MissingDisease(disease))?;
                    validate_feature_count(disease, data.len())?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered feature vector for one disease, read with the keys of `mode`.
pub fn feature_vector(form: &FormState, disease: DiseaseId, mode: Mode) -> Vec<f64> {
    disease
        .fields()
        .iter()
        .map(|f| {
            form.value(&field_key(mode, disease, f.name))
                .and_then(|v| v.as_number())
                .unwrap_or(DEFAULT_FEATURE_VALUE)
        })
        .collect()
}

/// Build the payload for the form's current mode.
///
/// Single mode without a selected disease fails with
/// [`SubmitError::NoDiseaseSelected`]; nothing else can fail.
pub fn build(form: &FormState) -> Result<RequestPayload, SubmitError> {
    match form.mode() {
        Mode::Single => {
            let disease = form.selected_disease().ok_or(SubmitError::NoDiseaseSelected)?;
            Ok(RequestPayload::Single(build_single(form, disease)))
        }
        Mode::Multi => Ok(RequestPayload::Multi(build_multi(form))),
    }
}

/// Single-disease payload using bare feature keys
pub fn build_single(form: &FormState, disease: DiseaseId) -> SinglePredictRequest {
    let data = feature_vector(form, disease, Mode::Single);
    debug!("Built {} payload with {} features", disease, data.len());
    SinglePredictRequest { disease, data }
}

/// Multi-disease payload using namespaced keys, one vector per disease
pub fn build_multi(form: &FormState) -> MultiPredictRequest {
    let data: BTreeMap<DiseaseId, Vec<f64>> = DiseaseId::ALL
        .into_iter()
        .map(|d| (d, feature_vector(form, d, Mode::Multi)))
        .collect();
    debug!("Built multi-disease payload for {} diseases", data.len());
    MultiPredictRequest { data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::multi_key;

    fn single_form(disease: DiseaseId) -> FormState {
        let mut form = FormState::new();
        form.set_selected_disease(Some(disease)).unwrap();
        form
    }

    #[test]
    fn test_full_single_form_in_registry_order() {
        for disease in DiseaseId::ALL {
            let mut form = single_form(disease);
            for (i, f) in disease.fields().iter().enumerate() {
                form.set_field(f.name, &format!("{}", i + 1)).unwrap();
            }

            let payload = build(&form).unwrap();
            let RequestPayload::Single(req) = payload else {
                panic!("expected single payload");
            };
            assert_eq!(req.disease, disease);
            assert_eq!(req.data.len(), disease.fields().len());
            let expected: Vec<f64> = (1..=disease.fields().len()).map(|i| i as f64).collect();
            assert_eq!(req.data, expected);
        }
    }

    #[test]
    fn test_missing_and_invalid_fields_default_to_zero() {
        let mut form = single_form(DiseaseId::Diabetes);
        form.set_field("Pregnancies", "2").unwrap();
        form.set_field("Glucose", "").unwrap();
        form.set_field("BloodPressure", "abc").unwrap();
        form.set_field("BMI", "33.6").unwrap();
        // SkinThickness, Insulin, DiabetesPedigreeFunction, Age never entered

        let req = build_single(&form, DiseaseId::Diabetes);
        assert_eq!(req.data, vec![2.0, 0.0, 0.0, 0.0, 0.0, 33.6, 0.0, 0.0]);
    }

    #[test]
    fn test_single_mode_without_disease_is_rejected() {
        let form = FormState::new();
        assert!(matches!(build(&form), Err(SubmitError::NoDiseaseSelected)));
    }

    #[test]
    fn test_empty_multi_form_is_zero_filled() {
        let mut form = FormState::new();
        form.set_mode(Mode::Multi);

        let RequestPayload::Multi(req) = build(&form).unwrap() else {
            panic!("expected multi payload");
        };
        assert_eq!(req.data.len(), DiseaseId::ALL.len());
        for disease in DiseaseId::ALL {
            let data = &req.data[&disease];
            assert_eq!(data.len(), disease.fields().len());
            assert!(data.iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_multi_mode_reads_namespaced_keys_only() {
        let mut form = single_form(DiseaseId::Diabetes);
        form.set_field("Age", "61").unwrap();
        form.set_mode(Mode::Multi);
        form.set_field(&multi_key(DiseaseId::HeartDisease, "Age"), "45")
            .unwrap();

        let req = build_multi(&form);
        // Single-mode "Age" is stale in multi mode
        assert_eq!(req.data[&DiseaseId::Diabetes][7], 0.0);
        assert_eq!(req.data[&DiseaseId::HeartDisease][0], 45.0);
        assert_eq!(req.data[&DiseaseId::Hypertension][0], 0.0);
    }

    #[test]
    fn test_shared_single_keys_carry_across_diseases() {
        let mut form = single_form(DiseaseId::Diabetes);
        form.set_field("BMI", "28").unwrap();
        form.set_selected_disease(Some(DiseaseId::Hypertension))
            .unwrap();

        let req = build_single(&form, DiseaseId::Hypertension);
        assert_eq!(req.data[5], 28.0);
    }

    #[test]
    fn test_built_payloads_validate() {
        let mut form = single_form(DiseaseId::KidneyDisease);
        assert!(build(&form).unwrap().validate().is_ok());
        form.set_mode(Mode::Multi);
        assert!(build(&form).unwrap().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_hand_built_payloads() {
        let payload = RequestPayload::Single(SinglePredictRequest {
            disease: DiseaseId::Diabetes,
            data: vec![1.0; 3],
        });
        assert!(payload.validate().is_err());

        let payload = RequestPayload::Multi(MultiPredictRequest {
            data: BTreeMap::new(),
        });
        assert_eq!(
            payload.validate(),
            Err(PayloadError::MissingDisease(DiseaseId::Diabetes))
        );
    }

    #[test]
    fn test_payload_mode() {
        let form = single_form(DiseaseId::Diabetes);
        assert_eq!(build(&form).unwrap().mode(), Mode::Single);
    }
}
