//! Submission orchestration.
//!
//! A [`Session`] owns the form together with the last outcome or error and
//! drives one submit cycle: build the payload, dispatch it, normalize the
//! answer. Each attempt takes a ticket from a monotonic counter; an answer
//! that arrives for anything but the newest ticket is dropped, so
//! overlapping submissions can never overwrite a newer state with an older
//! one.

use tracing::{debug, warn};

use crate::client::{ClientError, RawResponse, Scorer};
use crate::error::{FormError, SubmitError};
use crate::form::{FormState, Mode};
use crate::normalize::{assess_multi, assess_single, Assessment};
use crate::request::{build, RequestPayload};
use crate::schema::DiseaseId;

/// Normalized result of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Single(Assessment),
    /// Ranked riskiest first
    Multi(Vec<Assessment>),
}

/// A built request waiting for its answer
#[derive(Debug, Clone)]
pub struct PendingRequest {
    ticket: u64,
    payload: RequestPayload,
}

impl PendingRequest {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn payload(&self) -> &RequestPayload {
        &self.payload
    }
}

/// Form plus the result/error cell shown next to it
#[derive(Debug, Default)]
pub struct Session {
    form: FormState,
    outcome: Option<Outcome>,
    error: Option<SubmitError>,
    latest_ticket: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn error(&self) -> Option<&SubmitError> {
        self.error.as_ref()
    }

    pub fn set_field(&mut self, key: &str, raw: &str) -> Result<(), FormError> {
        self.form.set_field(key, raw)
    }

    pub fn set_selected_disease(&mut self, disease: Option<DiseaseId>) -> Result<(), FormError> {
        self.form.set_selected_disease(disease)
    }

    /// Switch mode. A result or error from the previous mode is cleared and
    /// any request still in flight is treated as stale.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.form.set_mode(mode) {
            self.clear_result();
            self.latest_ticket += 1;
        }
    }

    /// Clear values, result and error. A request still in flight will not
    /// repopulate the result.
    pub fn reset(&mut self) {
        self.form.reset();
        self.clear_result();
        self.latest_ticket += 1;
    }

    /// Start an attempt: clear the previous result, take a ticket and build
    /// the payload. Returns `None` when a precondition failed; the error is
    /// then held by the session and nothing must be sent.
    pub fn begin_submit(&mut self) -> Option<PendingRequest> {
        self.clear_result();
        self.latest_ticket += 1;

        let payload = build(&self.form).and_then(|p| {
            p.validate()?;
            Ok(p)
        });

        match payload {
            Ok(payload) => {
                debug!("Ticket {} built {} payload", self.latest_ticket, payload.mode());
                Some(PendingRequest {
                    ticket: self.latest_ticket,
                    payload,
                })
            }
            Err(e) => {
                debug!("Submission rejected before dispatch: {}", e);
                self.error = Some(e);
                None
            }
        }
    }

    /// Record the answer for a pending request. Returns `false` when the
    /// request was superseded and its answer was dropped.
    pub fn complete(
        &mut self,
        pending: PendingRequest,
        response: Result<RawResponse, ClientError>,
    ) -> bool {
        if pending.ticket != self.latest_ticket {
            warn!(
                "Discarding stale response for ticket {} (latest is {})",
                pending.ticket, self.latest_ticket
            );
            return false;
        }

        match response {
            Ok(RawResponse::Single(raw)) => {
                self.outcome = Some(Outcome::Single(assess_single(&raw)));
            }
            Ok(RawResponse::Multi(results)) => {
                self.outcome = Some(Outcome::Multi(assess_multi(&results)));
            }
            Err(source) => {
                self.error = Some(SubmitError::Client {
                    mode: pending.payload.mode(),
                    source,
                });
            }
        }
        true
    }

    /// Run one full submit cycle against `scorer`.
    ///
    /// Returns the new outcome, or `None` when the attempt failed; the
    /// failure is then available from [`Session::error`].
    pub async fn submit<S: Scorer>(&mut self, scorer: &S) -> Option<&Outcome> {
        let pending = self.begin_submit()?;
        let response = scorer.submit(pending.payload()).await;
        self.complete(pending, response);
        self.outcome.as_ref()
    }

    fn clear_result(&mut self) {
        self.outcome = None;
        self.error = None;
    }
}
