use crate::{MonitorError, Notifier};
use serde::Deserialize;
use tracing::info;

const TWILIO_API_URL: &str = "https://api.twilio.com/2010-04-01";
// WhatsApp messages are capped at 1600 characters.
const MAX_BODY_CHARS: usize = 1600;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WhatsAppConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 form, e.g. `+14155238886`.
    pub from_number: String,
    pub to_number: String,
}

/// WhatsApp delivery through the Twilio Messages API.
pub struct WhatsAppNotifier {
    config: WhatsAppConfig,
    base_url: String,
    http: reqwest::Client,
}

impl WhatsAppNotifier {
    pub fn new(config: WhatsAppConfig) -> Self {
        WhatsAppNotifier {
            config,
            base_url: TWILIO_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn form(&self, subject: &str, body: &str) -> Vec<(&'static str, String)> {
        let text = format!("*{}*\n\n{}", subject, body);
        let text = if text.chars().count() > MAX_BODY_CHARS {
            let mut cut = text.chars().take(MAX_BODY_CHARS - 1).collect::<String>();
            cut.push('…');
            cut
        } else {
            text
        };
        vec![
            ("From", whatsapp_address(&self.config.from_number)),
            ("To", whatsapp_address(&self.config.to_number)),
            ("Body", text),
        ]
    }
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

#[async_trait::async_trait]
impl Notifier for WhatsAppNotifier {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<(), MonitorError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url, self.config.account_sid
        );
        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&self.form(subject, body))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MonitorError::Rejected {
                service: "Twilio",
                status,
                body,
            });
        }

        info!(to = %self.config.to_number, subject, "WhatsApp notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn notifier() -> WhatsAppNotifier {
        WhatsAppNotifier::new(WhatsAppConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "+14155238886".to_string(),
            to_number: "whatsapp:+966500000000".to_string(),
        })
    }

    #[test]
    fn form_fields() {
        assert_eq!(
            notifier().form("News #1 - Caution", "Status: Caution"),
            vec![
                ("From", "whatsapp:+14155238886".to_string()),
                ("To", "whatsapp:+966500000000".to_string()),
                ("Body", "*News #1 - Caution*\n\nStatus: Caution".to_string()),
            ]
        );
    }

    #[test]
    fn long_body_is_cut() {
        let form = notifier().form("s", &"x".repeat(5000));
        assert_eq!(form[2].1.chars().count(), MAX_BODY_CHARS);
        assert!(form[2].1.ends_with('…'));
    }

    #[tokio::test]
    async fn unreachable_api_is_an_error() {
        let notifier = notifier().with_base_url("http://127.0.0.1:9");
        assert!(notifier.send("s", "b").await.is_err());
    }
}
