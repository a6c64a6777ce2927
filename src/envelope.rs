//! The uniform JSON envelope every data route answers with.
//!
//! ```json
//! {"status": "success", "total": 2, "timeframe": {"start": "…", "end": "…"}, "data": [ … ]}
//! {"status": "error", "message": "…", "data": []}
//! ```
//!
//! Optional keys are omitted rather than sent as `null`.

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::response::{IntoResponse, Response};
use crate::window::TimeWindow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// Response body shared by every data route.
///
/// Construct through [`Envelope::success`] or [`Envelope::error`]; an error
/// envelope always carries a message and empty `data`, a success envelope
/// never carries a message.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope {
    status: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeframe: Option<TimeWindow>,
    data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self { status: Outcome::Success, total: None, timeframe: None, data, message: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Outcome::Error,
            total: None,
            timeframe: None,
            data: Value::Array(Vec::new()),
            message: Some(message.into()),
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_timeframe(mut self, window: TimeWindow) -> Self {
        self.timeframe = Some(window);
        self
    }

    pub fn outcome(&self) -> Outcome { self.status }
    pub fn total(&self) -> Option<u64> { self.total }
    pub fn timeframe(&self) -> Option<&TimeWindow> { self.timeframe.as_ref() }
    pub fn data(&self) -> &Value { &self.data }
    pub fn message(&self) -> Option<&str> { self.message.as_deref() }

    /// Serializes with the given status code.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        match serde_json::to_vec(&self) {
            Ok(bytes) => Response::builder().status(status).json(bytes),
            Err(e) => {
                tracing::error!("envelope serialization failed: {e}");
                Response::status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        self.into_response_with(StatusCode::OK)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        Envelope::error(self.to_string()).into_response_with(status)
    }
}
