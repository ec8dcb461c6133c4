use regex::Regex;

use crate::config::{Platform, RelayConfig};
use crate::error::RelayError;
use crate::logging::RequestLog;
use crate::types::{ExtractedRequest, InboundPayload};

struct LinkPattern {
    platform: Platform,
    regex: Regex,
}

/// Validates inbound payloads and pulls out the sender number and media link.
pub struct Extractor {
    ignore_patterns: Vec<String>,
    link_patterns: Vec<LinkPattern>,
    sender_jid: Regex,
}

impl Extractor {
    pub fn new(config: &RelayConfig) -> Result<Self, regex::Error> {
        let link_patterns = config
            .platforms
            .iter()
            .map(|&platform| {
                Ok(LinkPattern {
                    platform,
                    regex: Regex::new(platform.link_pattern())?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            ignore_patterns: config
                .ignore_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            link_patterns,
            sender_jid: Regex::new(r"^([0-9]+)@")?,
        })
    }

    pub fn extract(
        &self,
        payload: &InboundPayload,
        log: &RequestLog,
    ) -> Result<ExtractedRequest, RelayError> {
        let message = payload
            .data
            .as_ref()
            .and_then(|d| d.message.as_ref())
            .ok_or(RelayError::MalformedPayload("Invalid webhook format."))?;

        let remote_jid = message
            .message_key
            .as_ref()
            .and_then(|k| k.remote_jid.as_deref())
            .unwrap_or("");

        if self.is_ignored(remote_jid) {
            return Err(RelayError::IgnoredSender(remote_jid.to_string()));
        }

        let text = message_text(payload).unwrap_or("");
        log.trace(format_args!("messageText: {}, remoteJid: {}", text, remote_jid));

        if text.is_empty() || remote_jid.is_empty() {
            return Err(RelayError::MalformedPayload("Missing messageText or remoteJid"));
        }

        let sender_number = self
            .sender_jid
            .captures(remote_jid)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(RelayError::MalformedPayload("Invalid remoteJid format."))?;

        let (platform, source_url) = self.find_link(text).ok_or(RelayError::NoSupportedLink)?;

        Ok(ExtractedRequest {
            sender_number,
            source_url: source_url.to_string(),
            platform,
        })
    }

    fn is_ignored(&self, remote_jid: &str) -> bool {
        let jid = remote_jid.to_lowercase();
        self.ignore_patterns.iter().any(|p| jid.contains(p.as_str()))
    }

    /// First pattern in platform order that matches anywhere in the text.
    fn find_link<'t>(&self, text: &'t str) -> Option<(Platform, &'t str)> {
        self.link_patterns
            .iter()
            .find_map(|lp| lp.regex.find(text).map(|m| (lp.platform, m.as_str())))
    }
}

/// Conversation text, then generic content, then extended text. Empty strings are skipped.
fn message_text(payload: &InboundPayload) -> Option<&str> {
    let body = payload
        .data
        .as_ref()?
        .message
        .as_ref()?
        .body_message
        .as_ref()?;
    let messages = body.messages.as_ref();

    let conversation = messages.and_then(|m| m.conversation.as_deref());
    let content = body.content.as_deref();
    let extended = messages
        .and_then(|m| m.extended_text_message.as_ref())
        .and_then(|e| e.text.as_deref());

    [conversation, content, extended]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
}

#[cfg(test)]
pub fn payload_json(remote_jid: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "message": {
                "body_message": { "messages": { "conversation": text } },
                "message_key": { "remoteJid": remote_jid }
            }
        }
    })
}
