//! Riskscreen - multi-disease risk screening client
//!
//! This library provides:
//! - The schema registry of numeric inputs per disease model
//! - Form state for single-disease and multi-disease screening
//! - Request building with zero defaults for missing input
//! - An HTTP client for the remote scoring service
//! - Normalization and risk ranking of the returned predictions
//!
//! # Example
//!
//! ```no_run
//! use riskscreen::{ClientConfig, DiseaseId, PredictionClient, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PredictionClient::new(ClientConfig::default())?;
//!
//! let mut session = Session::new();
//! session.set_selected_disease(Some(DiseaseId::Diabetes))?;
//! session.set_field("Glucose", "148")?;
//! session.set_field("BMI", "33.6")?;
//!
//! session.submit(&client).await;
//! if let Some(err) = session.error() {
//!     println!("{}", err.user_message());
//! } else if let Some(outcome) = session.outcome() {
//!     println!("{:?}", outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod form;
pub mod models;
pub mod normalize;
pub mod request;
pub mod schema;
pub mod session;

// Re-export commonly used types
pub use client::{ClientConfig, ClientError, PredictionClient, RawResponse, Scorer};
pub use error::{FormError, PayloadError, SubmitError, UnknownDisease};
pub use form::{field_key, multi_key, FieldValue, FormState, Mode};
pub use models::{MultiPredictRequest, Prediction, RawPrediction, SinglePredictRequest};
pub use normalize::{classify, format_percent, rank, Assessment, Severity, UNAVAILABLE};
pub use request::{build, RequestPayload};
pub use schema::{fields_for, DiseaseId, FeatureSpec, ValueKind};
pub use session::{Outcome, PendingRequest, Session};
