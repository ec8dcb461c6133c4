use std::any::Any;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Every way a webhook request can end without the media being sent.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")]
    MalformedPayload(&'static str),

    #[error("Ignored remoteJid: {0}")]
    IgnoredSender(String),

    #[error("No supported video link found in message.")]
    NoSupportedLink,

    #[error("Downloader API request timed out ({}s).", .0.as_secs())]
    UpstreamTimeout(Duration),

    #[error("Downloader API fetch error: {0}")]
    UpstreamUnreachable(String),

    #[error("Downloader API HTTP error: {0}")]
    UpstreamHttpError(u16),

    #[error("Failed to fetch video. Raw: {0}")]
    UpstreamBadResponse(String),

    #[error("WhatsApp API error: {status} {body}")]
    ForwardError { status: u16, body: String },

    #[error("Server error: {0}")]
    Unhandled(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MalformedPayload(_)
            | RelayError::IgnoredSender(_)
            | RelayError::NoSupportedLink => StatusCode::BAD_REQUEST,
            RelayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::UpstreamUnreachable(_)
            | RelayError::UpstreamHttpError(_)
            | RelayError::UpstreamBadResponse(_)
            | RelayError::ForwardError { .. }
            | RelayError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-side rejections, as opposed to failures talking to upstreams.
    pub fn is_rejection(&self) -> bool {
        self.status_code() == StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("❌ {}", self)).into_response()
    }
}

/// Turns a handler panic into the same 500 an unhandled error gets.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    log::error!("Handler panicked: {}", details);
    RelayError::Unhandled(details).into_response()
}
