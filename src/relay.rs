use anyhow::Context;
use reqwest::Client;

use crate::config::{IgnoredReply, RelayConfig};
use crate::downloader::Downloader;
use crate::error::RelayError;
use crate::extract::Extractor;
use crate::forward::MediaSender;
use crate::logging::RequestLog;
use crate::types::{ForwardReceipt, InboundPayload};

/// The extract, resolve, forward pipeline. Each phase is terminal on failure.
pub struct Relay {
    extractor: Extractor,
    downloader: Downloader,
    sender: MediaSender,
    ignored_reply: IgnoredReply,
    verbose: bool,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            extractor: Extractor::new(config).context("invalid link pattern")?,
            downloader: Downloader::new(
                client.clone(),
                config.downloader_base_url.clone(),
                config.downloader_timeout,
                config.default_title.clone(),
            ),
            sender: MediaSender::new(
                client,
                config.send_endpoint.clone(),
                config.instance_id.clone(),
                config.access_token.clone(),
            ),
            ignored_reply: config.ignored_reply,
            verbose: config.debug_log,
        })
    }

    pub fn ignored_reply(&self) -> IgnoredReply {
        self.ignored_reply
    }

    pub fn request_log(&self) -> RequestLog {
        RequestLog::new(self.verbose)
    }

    pub async fn handle(
        &self,
        payload: &InboundPayload,
        log: &RequestLog,
    ) -> Result<ForwardReceipt, RelayError> {
        let request = self.extractor.extract(payload, log)?;
        log.info(format_args!(
            "Detected {} link {} from {}",
            request.platform, request.source_url, request.sender_number
        ));

        let media = self.downloader.resolve(&request.source_url, log).await?;
        let receipt = self
            .sender
            .send(&request.sender_number, &media, log)
            .await?;

        log.trace(format_args!("WhatsApp API HTTP {}: {}", receipt.status, receipt.body));
        log.info(format_args!("Video sent to {}", request.sender_number));
        Ok(receipt)
    }
}
