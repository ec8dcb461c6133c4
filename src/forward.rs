use reqwest::{Client, Url};

use crate::error::RelayError;
use crate::logging::RequestLog;
use crate::types::{ForwardReceipt, MediaResolution, SendPayload};

/// Delivers resolved media to a WhatsApp number through the send API.
pub struct MediaSender {
    client: Client,
    endpoint: Url,
    instance_id: String,
    access_token: String,
}

impl MediaSender {
    pub fn new(client: Client, endpoint: Url, instance_id: String, access_token: String) -> Self {
        Self {
            client,
            endpoint,
            instance_id,
            access_token,
        }
    }

    pub async fn send(
        &self,
        number: &str,
        media: &MediaResolution,
        log: &RequestLog,
    ) -> Result<ForwardReceipt, RelayError> {
        let payload = SendPayload {
            number,
            kind: "media",
            message: &media.title,
            media_url: &media.media_url,
            instance_id: &self.instance_id,
            access_token: &self.access_token,
        };

        log.trace(format_args!("Forwarding {} to {}", media.media_url, number));
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::Unhandled(format!("WhatsApp API request failed: {}", e)))?;

        let status = response.status().as_u16();
        let ok = response.status().is_success();
        let body = response
            .text()
            .await
            .map_err(|e| {
                RelayError::Unhandled(format!("WhatsApp API response unreadable: {}", e))
            })?;

        if !ok {
            return Err(RelayError::ForwardError { status, body });
        }
        Ok(ForwardReceipt { status, body })
    }
}
