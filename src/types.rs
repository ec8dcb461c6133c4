use serde::{Deserialize, Serialize};

use crate::config::Platform;

/// Inbound webhook body. Every level is optional so the extractor, not the
/// JSON decoder, decides what counts as malformed.
#[derive(Debug, Default, Deserialize)]
pub struct InboundPayload {
    #[serde(default)]
    pub data: Option<InboundData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InboundData {
    #[serde(default)]
    pub message: Option<InboundMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub body_message: Option<BodyMessage>,
    #[serde(default)]
    pub message_key: Option<MessageKey>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BodyMessage {
    #[serde(default)]
    pub messages: Option<Messages>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Messages {
    #[serde(default)]
    pub conversation: Option<String>,
    #[serde(default, rename = "extendedTextMessage")]
    pub extended_text_message: Option<ExtendedTextMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtendedTextMessage {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageKey {
    #[serde(default, rename = "remoteJid")]
    pub remote_jid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRequest {
    pub sender_number: String,
    pub source_url: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolution {
    pub media_url: String,
    pub title: String,
}

/// What the downloader API answers with.
#[derive(Debug, Deserialize)]
pub struct DownloaderResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendPayload<'a> {
    pub number: &'a str,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub message: &'a str,
    pub media_url: &'a str,
    pub instance_id: &'a str,
    pub access_token: &'a str,
}

/// Outcome of a successful send call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardReceipt {
    pub status: u16,
    pub body: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
