use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use reqwest::Url;

pub const DEFAULT_SEND_ENDPOINT: &str = "https://textsnap.in/api/send";
pub const DEFAULT_TIMEOUT_SECS: u64 = 40;
pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_TITLE: &str = "Video";

/// Groups, broadcasts, newsletters, status updates and linked-device ids.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "@g.us",
    "@broadcast",
    "@newsletter",
    "status@broadcast",
    "@lid",
    "-@g.us",
    "g.us",
    "broadcast",
    "newsletter",
    "status",
];

/// Source platforms whose links the relay knows how to pick out of a message.
/// Declaration order is the scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Pinterest,
    Facebook,
    Instagram,
    YoutubeShorts,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Pinterest,
        Platform::Facebook,
        Platform::Instagram,
        Platform::YoutubeShorts,
    ];

    pub fn link_pattern(self) -> &'static str {
        match self {
            Platform::Pinterest => concat!(
                r"(https://pin\.it/[a-zA-Z0-9]+",
                r"|https://(?:[a-z]+\.)?pinterest\.[a-z]+/pin/[0-9]+/?)"
            ),
            Platform::Facebook => r"(?i)https://(?:www\.)?facebook\.[a-z]+/\S+",
            Platform::Instagram => r"(?i)https://(?:www\.)?instagram\.[a-z]+/\S+",
            Platform::YoutubeShorts => r"(?i)https://(?:www\.)?youtube\.com/shorts/[A-Za-z0-9_-]+",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Pinterest => "pinterest",
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::YoutubeShorts => "youtube-shorts",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pinterest" => Ok(Platform::Pinterest),
            "facebook" => Ok(Platform::Facebook),
            "instagram" => Ok(Platform::Instagram),
            "youtube-shorts" | "youtube_shorts" | "youtube" => Ok(Platform::YoutubeShorts),
            other => Err(anyhow!("unknown platform '{}'", other)),
        }
    }
}

/// How to answer a webhook whose sender matched an ignore pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReply {
    /// 400 with the offending sender id in the body.
    Reject,
    /// 200 so the webhook provider stops redelivering.
    Acknowledge,
}

impl FromStr for IgnoredReply {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "400" => Ok(IgnoredReply::Reject),
            "acknowledge" | "ack" | "200" => Ok(IgnoredReply::Acknowledge),
            other => Err(anyhow!("unknown ignored reply mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub downloader_base_url: Url,
    pub downloader_timeout: Duration,
    pub send_endpoint: Url,
    pub instance_id: String,
    pub access_token: String,
    pub ignore_patterns: Vec<String>,
    pub platforms: Vec<Platform>,
    pub ignored_reply: IgnoredReply,
    pub default_title: String,
    pub debug_log: bool,
    pub webhook_token: Option<String>,
}

impl RelayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| anyhow!("{} must be set", key));

        let downloader_base = get("DOWNLOADER_API_BASE")
            .or_else(|| get("PINTEREST_API_BASE"))
            .ok_or_else(|| anyhow!("DOWNLOADER_API_BASE (or PINTEREST_API_BASE) must be set"))?;
        let downloader_base_url = Url::parse(&downloader_base)
            .with_context(|| format!("invalid downloader base url '{}'", downloader_base))?;

        let send_endpoint =
            get("RELAY_SEND_ENDPOINT").unwrap_or_else(|| DEFAULT_SEND_ENDPOINT.to_string());
        let send_endpoint = Url::parse(&send_endpoint)
            .with_context(|| format!("invalid RELAY_SEND_ENDPOINT '{}'", send_endpoint))?;

        let timeout_secs = match get("RELAY_DOWNLOADER_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid RELAY_DOWNLOADER_TIMEOUT_SECS '{}'", v))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("RELAY_DOWNLOADER_TIMEOUT_SECS must be greater than zero");
        }

        let port = match get("RELAY_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid RELAY_PORT '{}'", v))?,
            None => DEFAULT_PORT,
        };

        let platforms = match get("RELAY_PLATFORMS") {
            Some(list) => split_list(&list)
                .map(|p| p.parse::<Platform>())
                .collect::<anyhow::Result<Vec<Platform>>>()
                .context("invalid RELAY_PLATFORMS")?,
            None => Platform::ALL.to_vec(),
        };
        if platforms.is_empty() {
            bail!("RELAY_PLATFORMS must name at least one platform");
        }

        let ignore_patterns = match get("RELAY_IGNORE_PATTERNS") {
            Some(list) => split_list(&list).map(str::to_string).collect(),
            None => DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        };

        let ignored_reply = match get("RELAY_IGNORED_REPLY") {
            Some(v) => v.parse().context("invalid RELAY_IGNORED_REPLY")?,
            None => IgnoredReply::Reject,
        };

        let debug_log = get("RELAY_DEBUG_LOG")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        Ok(RelayConfig {
            port,
            downloader_base_url,
            downloader_timeout: Duration::from_secs(timeout_secs),
            send_endpoint,
            instance_id: require("WHATSAPP_INSTANCE_ID")?,
            access_token: require("WHATSAPP_ACCESS_TOKEN")?,
            ignore_patterns,
            platforms,
            ignored_reply,
            default_title: get("RELAY_DEFAULT_TITLE").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            debug_log,
            webhook_token: get("RELAY_WEBHOOK_TOKEN"),
        })
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
pub fn test_config(downloader_base: &str, send_endpoint: &str) -> RelayConfig {
    RelayConfig {
        port: 0,
        downloader_base_url: Url::parse(downloader_base).unwrap(),
        downloader_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        send_endpoint: Url::parse(send_endpoint).unwrap(),
        instance_id: "instance-1".to_string(),
        access_token: "token-1".to_string(),
        ignore_patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        platforms: Platform::ALL.to_vec(),
        ignored_reply: IgnoredReply::Reject,
        default_title: DEFAULT_TITLE.to_string(),
        debug_log: false,
        webhook_token: None,
    }
}
