//! Telegram Bot API sender.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::chunk::{MAX_MESSAGE_CHARS, split_message};
use crate::error::{NotificationError, NotificationResult};

/// Default Bot API root.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Environment variable holding the bot token.
pub const TOKEN_VAR: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the destination chat.
pub const CHAT_ID_VAR: &str = "CHAT_ID";

/// Anything that can deliver a block of text.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Delivers `text`, splitting it as the channel requires.
    async fn send_text(&self, text: &str) -> NotificationResult<()>;

    /// Returns the sender name for logs.
    fn name(&self) -> &str;
}

/// Telegram sender settings.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Token issued by @BotFather.
    pub bot_token: String,
    /// Destination chat ID.
    pub chat_id: String,
    /// Parse mode (HTML or MarkdownV2).
    pub parse_mode: String,
    /// Bot API root, overridable for tests.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Longest single message in characters.
    pub max_message_chars: usize,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("parse_mode", &self.parse_mode)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("max_message_chars", &self.max_message_chars)
            .finish()
    }
}

impl TelegramConfig {
    /// Creates settings with HTML parse mode and a 15 second timeout.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            parse_mode: "HTML".to_string(),
            api_base: TELEGRAM_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }

    /// Overrides the Bot API root.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Reads `TELEGRAM_TOKEN` and `CHAT_ID` through `lookup`.
    ///
    /// Empty values count as missing.
    ///
    /// # Errors
    /// Returns [`NotificationError::MissingCredential`] naming the first absent variable.
    pub fn from_lookup<F>(lookup: F) -> NotificationResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| NotificationError::MissingCredential(name.to_string()))
        };
        Ok(Self::new(read(TOKEN_VAR)?, read(CHAT_ID_VAR)?))
    }
}

/// Telegram notification sender.
#[derive(Debug)]
pub struct TelegramSender {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramSender {
    /// Creates a sender; the HTTP client uses the configured timeout.
    pub fn new(config: TelegramConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    /// Returns the sender settings.
    pub const fn config(&self) -> &TelegramConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base, self.config.bot_token
        )
    }

    /// Sends one message as-is.
    async fn send_message(&self, text: &str) -> NotificationResult<()> {
        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": self.config.parse_mode,
            "disable_web_page_preview": true,
        });

        debug!(
            chat_id = %self.config.chat_id,
            chars = text.chars().count(),
            "Sending Telegram message"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&params)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 429 {
            warn!("Telegram rate limited");
            return Err(NotificationError::RateLimited(60));
        }

        error!("Failed to send Telegram message: {} - {}", status, body);
        Err(NotificationError::SendFailed(format!("HTTP {status}: {body}")))
    }
}

#[async_trait]
impl NotificationSender for TelegramSender {
    async fn send_text(&self, text: &str) -> NotificationResult<()> {
        let chunks = split_message(text, self.config.max_message_chars);
        if chunks.is_empty() {
            debug!("Nothing to send");
            return Ok(());
        }

        let total = chunks.len();
        for (i, chunk) in chunks.iter().enumerate() {
            debug!(part = i + 1, total, "Sending chunk");
            self.send_message(chunk).await?;
        }

        info!(parts = total, "Telegram notification sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sender_for(server: &MockServer) -> TelegramSender {
        TelegramSender::new(TelegramConfig::new("TOKEN", "42").with_api_base(server.uri()))
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [("TELEGRAM_TOKEN", "t"), ("CHAT_ID", "c")].into();
        let config = TelegramConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.bot_token, "t");
        assert_eq!(config.chat_id, "c");
        assert_eq!(config.parse_mode, "HTML");
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_from_lookup_missing_or_blank() {
        let err = TelegramConfig::from_lookup(|k| (k == "TELEGRAM_TOKEN").then(|| "t".into()))
            .unwrap_err();
        assert!(matches!(err, NotificationError::MissingCredential(ref v) if v == "CHAT_ID"));

        let err = TelegramConfig::from_lookup(|_| Some("  ".into())).unwrap_err();
        assert!(
            matches!(err, NotificationError::MissingCredential(ref v) if v == "TELEGRAM_TOKEN")
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = TelegramConfig::new("secret-token", "1");
        let debug_str = format!("{:?}", TelegramSender::new(config));
        assert!(!debug_str.contains("secret-token"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_send_short_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_partial_json(json!({
                "chat_id": "42",
                "text": "hello",
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        sender_for(&server).send_text("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_long_message_is_chunked() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(3)
            .mount(&server)
            .await;

        let line = "x".repeat(99);
        let text = vec![line.as_str(); 100].join("\n");
        sender_for(&server).send_text(&text).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_text_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        sender_for(&server).send_text("").await.unwrap();
    }

    #[tokio::test]
    async fn test_http_error_is_propagated() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request: chat not found"))
            .mount(&server)
            .await;

        let err = sender_for(&server).send_text("hi").await.unwrap_err();
        assert!(matches!(err, NotificationError::SendFailed(ref m) if m.contains("chat not found")));
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = sender_for(&server).send_text("hi").await.unwrap_err();
        assert!(matches!(err, NotificationError::RateLimited(60)));
    }
}
