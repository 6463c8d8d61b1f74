use thiserror::Error;

use crate::client::ClientError;
use crate::form::Mode;
use crate::schema::DiseaseId;

/// A disease name outside the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown disease: {0}")]
pub struct UnknownDisease(pub String);

/// Rejected form mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("field '{key}' is not part of the {mode} form")]
    UnknownField { key: String, mode: Mode },

    #[error("a disease can only be selected in single mode")]
    NotSingleMode,
}

/// Payload shape does not match the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("expected {expected} features for {disease}, got {actual}")]
    FeatureCount {
        disease: DiseaseId,
        expected: usize,
        actual: usize,
    },

    #[error("no feature data for {0}")]
    MissingDisease(DiseaseId),
}

/// Why a submission attempt ended without a result
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Single mode submitted with no disease chosen; nothing was sent.
    #[error("no disease selected")]
    NoDiseaseSelected,

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("{mode} request failed: {source}")]
    Client {
        mode: Mode,
        #[source]
        source: ClientError,
    },
}

impl SubmitError {
    /// Text shown to the user in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::NoDiseaseSelected => "Please select a disease.".to_string(),
            SubmitError::Payload(e) => format!("Invalid request: {}", e),
            SubmitError::Client {
                mode: Mode::Single,
                source,
            } => format!("Prediction failed: {}", source),
            SubmitError::Client {
                mode: Mode::Multi,
                source,
            } => format!("Multi-prediction failed: {}", source),
        }
    }

    /// True when the attempt never reached the network.
    pub fn is_precondition(&self) -> bool {
        matches!(self, SubmitError::NoDiseaseSelected | SubmitError::Payload(_))
    }
}

/// Check a feature vector against the registry length for its disease
pub fn validate_feature_count(disease: DiseaseId, actual: usize) -> Result<(), PayloadError> {
    let expected = disease.fields().len();
    if actual != expected {
        return Err(PayloadError::FeatureCount {
            disease,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_feature_count_valid() {
        assert!(validate_feature_count(DiseaseId::Diabetes, 8).is_ok());
        assert!(validate_feature_count(DiseaseId::KidneyDisease, 16).is_ok());
    }

    #[test]
    fn test_validate_feature_count_invalid() {
        assert_eq!(
            validate_feature_count(DiseaseId::Diabetes, 7),
            Err(PayloadError::FeatureCount {
                disease: DiseaseId::Diabetes,
                expected: 8,
                actual: 7
            })
        );
        assert!(validate_feature_count(DiseaseId::HeartDisease, 0).is_err());
    }

    #[test]
    fn test_payload_error_display() {
        let err = PayloadError::FeatureCount {
            disease: DiseaseId::HeartDisease,
            expected: 10,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "expected 10 features for Heart Disease, got 3"
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            SubmitError::NoDiseaseSelected.user_message(),
            "Please select a disease."
        );

        let err = SubmitError::Client {
            mode: Mode::Single,
            source: ClientError::Status {
                status: 500,
                detail: None,
            },
        };
        assert_eq!(err.user_message(), "Prediction failed: HTTP error! status: 500");

        let err = SubmitError::Client {
            mode: Mode::Multi,
            source: ClientError::Status {
                status: 400,
                detail: Some("Missing 'data' in request".to_string()),
            },
        };
        assert_eq!(
            err.user_message(),
            "Multi-prediction failed: HTTP error! status: 400 (Missing 'data' in request)"
        );
    }

    #[test]
    fn test_precondition_classification() {
        assert!(SubmitError::NoDiseaseSelected.is_precondition());
        assert!(!SubmitError::Client {
            mode: Mode::Multi,
            source: ClientError::Status {
                status: 502,
                detail: None
            }
        }
        .is_precondition());
    }

    #[test]
    fn test_form_error_display() {
        let err = FormError::UnknownField {
            key: "Glucose".to_string(),
            mode: Mode::Multi,
        };
        assert!(err.to_string().contains("multi"));
    }
}
