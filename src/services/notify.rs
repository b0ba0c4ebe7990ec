//! Owner notifications over the Telegram Bot API.
//!
//! Sends are best-effort with an "at most once, no retry" contract: failures
//! are logged and dropped, never retried, never surfaced to the request that
//! triggered them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::config::NotifierSettings;
use crate::models::AccessType;

/// Outbound send timeout.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram notification dispatcher. Disabled when no bot token is
/// configured; every send then reports undelivered.
#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
    token: Option<SecretString>,
    api_base: String,
}

impl Notifier {
    /// Create a dispatcher from configuration.
    pub fn new(settings: &NotifierSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: settings.bot_token.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Dispatcher that never sends (tests, tokenless deployments).
    pub fn disabled() -> Self {
        Self {
            http: reqwest::Client::new(),
            token: None,
            api_base: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Send one message. Returns whether the channel accepted it.
    pub async fn notify(&self, chat_id: i64, text: &str) -> bool {
        let Some(token) = &self.token else {
            debug!("Notification dropped: no bot token configured");
            return false;
        };

        let url = format!("{}/bot{}/sendMessage", self.api_base, token.expose_secret());
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        match self
            .http
            .post(&url)
            .json(&payload)
            .timeout(SEND_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(
                    "Notification to {} rejected with status {}",
                    chat_id,
                    response.status()
                );
                false
            }
            Err(e) => {
                warn!("Notification to {} failed: {}", chat_id, e);
                false
            }
        }
    }

    /// Fire-and-forget send, spawned off the request path. Call only after
    /// the response-relevant writes have committed.
    pub fn dispatch(&self, chat_id: i64, text: String) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify(chat_id, &text).await;
        });
    }
}

/// Render the owner-facing text for a visit or download event.
pub fn render_access_notification(
    access: AccessType,
    original_filename: &str,
    link: &str,
    when: DateTime<Utc>,
    ip: &str,
    country: &str,
    city: &str,
) -> String {
    let event = match access {
        AccessType::Visit => "Page visited",
        AccessType::Download => "File downloaded",
    };

    let name = urlencoding::decode(original_filename)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| original_filename.to_string());

    let place = [country, city]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    let mut message = format!(
        "{}\n\n{}\n{}\n{}\nIP: {}",
        event,
        name,
        link,
        when.format("%d.%m.%Y %H:%M:%S"),
        ip
    );
    if !place.is_empty() {
        message.push_str(&format!(" ({})", place));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_notifier_reports_undelivered() {
        let notifier = Notifier::disabled();
        assert!(!notifier.is_enabled());
        assert!(!notifier.notify(42, "hello").await);
    }

    #[test]
    fn test_render_decodes_filename() {
        let text = render_access_notification(
            AccessType::Download,
            "annual%20report.pdf",
            "https://droply.example/Ab3dE",
            Utc::now(),
            "203.0.113.7",
            "Germany",
            "Berlin",
        );
        assert!(text.contains("File downloaded"));
        assert!(text.contains("annual report.pdf"));
        assert!(text.contains("https://droply.example/Ab3dE"));
        assert!(text.contains("IP: 203.0.113.7 (Germany, Berlin)"));
    }

    #[test]
    fn test_render_omits_empty_place() {
        let text = render_access_notification(
            AccessType::Visit,
            "a.txt",
            "https://droply.example/Ab3dE",
            Utc::now(),
            "203.0.113.7",
            "",
            "",
        );
        assert!(text.contains("Page visited"));
        assert!(text.ends_with("IP: 203.0.113.7"));
    }

    #[test]
    fn test_render_partial_place() {
        let text = render_access_notification(
            AccessType::Visit,
            "a.txt",
            "https://droply.example/Ab3dE",
            Utc::now(),
            "203.0.113.7",
            "Germany",
            "",
        );
        assert!(text.ends_with("(Germany)"));
    }
}
