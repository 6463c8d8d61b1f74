//! HTTP client for the remote scoring service

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    sanitize_non_finite, ErrorResponse, MultiPredictRequest, MultiPredictResponse, RawPrediction,
    SinglePredictRequest,
};
use crate::request::RequestPayload;

/// Hosted scoring service
pub const DEFAULT_BASE_URL: &str = "https://multi-disease-prediction-soaq.onrender.com";

const PREDICT_PATH: &str = "/predict";
const MULTI_PREDICT_PATH: &str = "/multi-predict";

/// Transport and protocol failures
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("invalid response body: {0}")]
    Decode(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(" ({})", d),
        _ => String::new(),
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, without the endpoint path
    pub base_url: String,
    /// Request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            user_agent: concat!("riskscreen/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Raw service answer for either mode
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Single(RawPrediction),
    /// The `results` map, keyed by disease name
    Multi(HashMap<String, Value>),
}

/// Something that can score payloads.
///
/// Implemented by [`PredictionClient`]; tests substitute in-process fakes.
#[allow(async_fn_in_trait)]
pub trait Scorer {
    /// `POST /predict`
    async fn predict(&self, request: &SinglePredictRequest) -> Result<RawPrediction, ClientError>;

    /// `POST /multi-predict`, all diseases in one call
    async fn multi_predict(
        &self,
        request: &MultiPredictRequest,
    ) -> Result<HashMap<String, Value>, ClientError>;

    /// Dispatch a payload to the endpoint matching its mode.
    async fn submit(&self, payload: &RequestPayload) -> Result<RawResponse, ClientError> {
        match payload {
            RequestPayload::Single(req) => self.predict(req).await.map(RawResponse::Single),
            RequestPayload::Multi(req) => self.multi_predict(req).await.map(RawResponse::Multi),
        }
    }
}

/// Scoring service client. One request per call: no retry, no caching.
pub struct PredictionClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl PredictionClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build URL for an endpoint
    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POST a JSON body and parse the JSON answer.
    ///
    /// Non-2xx responses become [`ClientError::Status`], carrying the
    /// service's `error` text when the body has one.
    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, ClientError> {
        let url = self.endpoint_url(path);
        info!("POST {}", url);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .ok()
                .map(|e| e.error);
            warn!("Request to {} failed with status {}", url, status);
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        debug!("Received {} bytes from {}", text.len(), url);
        serde_json::from_str(&sanitize_non_finite(&text))
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

impl Scorer for PredictionClient {
    async fn predict(&self, request: &SinglePredictRequest) -> Result<RawPrediction, ClientError> {
        let value = self.post_json(PREDICT_PATH, request).await?;
        Ok(RawPrediction::from_value(value))
    }

    async fn multi_predict(
        &self,
        request: &MultiPredictRequest,
    ) -> Result<HashMap<String, Value>, ClientError> {
        let value = self.post_json(MULTI_PREDICT_PATH, request).await?;
        let response: MultiPredictResponse =
            serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))?;
        response
            .results
            .ok_or_else(|| ClientError::Decode("response has no 'results' field".to_string()))
    }
}
