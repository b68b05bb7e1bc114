use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{Contact, CrimeStats};

/// Concerns listed in an alert.
pub const MAX_ALERT_CONCERNS: usize = 3;
pub const TEST_MARKER: &str = "🧪 *TEST SUBMISSION* - ";

/// Outbound channel for new-lead alerts.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), AppError>;
}

/// Sends alerts through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramAlertChannel {
    client: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramAlertChannel {
    /// Creates a new `TelegramAlertChannel`.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Bot API base URL (e.g. `https://api.telegram.org`).
    /// * `bot_token` - Bot authentication token.
    /// * `chat_id` - Chat that receives the alerts.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        api_url: String,
        bot_token: String,
        chat_id: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::InternalError(format!("Failed to create Telegram client: {}", e))
        })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.telegram_api_url.clone(),
            config.telegram_bot_token.clone(),
            config.telegram_chat_id.clone(),
            Duration::from_secs(config.http_timeout_secs),
        )
    }
}

#[async_trait]
impl AlertChannel for TelegramAlertChannel {
    async fn notify(&self, message: &str) -> Result<(), AppError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        tracing::info!("Sending Telegram alert to chat {}", self.chat_id);

        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown"
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::NotifyFault(format!("Telegram request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::NotifyFault(format!(
                "Telegram send failed {}: {}",
                status, error_text
            )));
        }

        tracing::info!("✓ Telegram alert delivered");
        Ok(())
    }
}

/// Escapes characters that legacy Telegram Markdown treats as entity delimiters.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds the new-lead alert text for a stored contact.
///
/// # Arguments
///
/// * `contact` - The stored contact (its id is used for the CRM deep link).
/// * `concerns` - Concerns from the submission; only the first three are listed.
/// * `crime` - Crime snapshot, summarized on one line when present.
/// * `crm_base_url` - CRM host for the deep link.
/// * `is_test` - Prefixes the message with a test marker.
pub fn format_lead_alert(
    contact: &Contact,
    concerns: &[String],
    crime: Option<&CrimeStats>,
    crm_base_url: &str,
    is_test: bool,
) -> String {
    let prefix = if is_test { TEST_MARKER } else { "" };

    let concern_lines = if concerns.is_empty() {
        "• No concerns listed".to_string()
    } else {
        concerns
            .iter()
            .take(MAX_ALERT_CONCERNS)
            .map(|c| format!("• {}", escape_markdown(c)))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let crime_line = match crime {
        Some(stats) => format!(
            "\n*Area Crime ({}):* property {:.1}, violent {:.1}, burglary {:.1}",
            stats
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "n/a".to_string()),
            stats.property_crime_rate,
            stats.violent_crime_rate,
            stats.burglary_rate
        ),
        None => String::new(),
    };

    format!(
        "{prefix}🚨 *New Security Assessment Lead*

*Business:* {business}
*Industry:* {industry}
*Contact:* {contact_name}
*Email:* {email}
*Phone:* {phone}

*Location:* {city}, {state}
*Score:* {score}/100{crime_line}

*Top Concerns:*
{concern_lines}

[View in CRM]({crm}/contacts/{id})",
        business = escape_markdown(&contact.company),
        industry = escape_markdown(&contact.vertical),
        contact_name = escape_markdown(&contact.display_name()),
        email = escape_markdown(&contact.email),
        phone = escape_markdown(&contact.phone),
        city = escape_markdown(&contact.city),
        state = escape_markdown(&contact.state),
        score = contact.lead_score,
        crm = crm_base_url.trim_end_matches('/'),
        id = contact.id,
    )
}
