use crate::notify::{EmailConfig, WhatsAppConfig};
use crate::review::OPENAI_API_URL;
use crate::MonitorError;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// What happens to an article whose content could not be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitPolicy {
    /// Record it as visited so it is never fetched again.
    #[default]
    MarkAlways,
    /// Leave it unvisited so the next run tries again.
    RetryFailed,
}

impl FromStr for VisitPolicy {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mark_always" => Ok(VisitPolicy::MarkAlways),
            "retry_failed" => Ok(VisitPolicy::RetryFailed),
            other => Err(MonitorError::ConfigError(format!(
                "Unknown visit policy: {other}"
            ))),
        }
    }
}

fn default_base_url() -> String {
    "https://www.spa.gov.sa".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("news_monitor.db")
}

fn default_openai_model() -> String {
    "gpt-4.1".to_string()
}

fn default_openai_base_url() -> String {
    OPENAI_API_URL.to_string()
}

fn default_check_interval() -> u64 {
    20
}

fn default_article_delay() -> u64 {
    2
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub target_url: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    pub openai_api_key: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u64,
    #[serde(default = "default_article_delay")]
    pub article_delay_secs: u64,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub whatsapp: Option<WhatsAppConfig>,
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    #[serde(default)]
    pub visit_policy: VisitPolicy,
    #[serde(default)]
    pub notify_on_clean: bool,
    #[serde(default)]
    pub health_port: Option<u16>,
}

impl Config {
    /// Environment first (after reading `.env`), then the JSON file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, MonitorError> {
        // A missing .env is fine.
        let _ = dotenvy::dotenv();

        if env::var("OPENAI_API_KEY").is_ok() && env::var("TARGET_URL").is_ok() {
            let config = Config::from_env()?;
            info!("Configuration loaded from environment variables");
            return Ok(config);
        }

        let path = path.as_ref();
        if !path.is_file() {
            return Err(MonitorError::ConfigError(format!(
                "Configuration file {} not found and OPENAI_API_KEY/TARGET_URL are not set",
                path.display()
            )));
        }
        let config = Config::from_file(path)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, MonitorError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config, MonitorError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(var: F) -> Result<Config, MonitorError> {
        let required = |key: &str| {
            var(key).ok_or_else(|| {
                MonitorError::ConfigError(format!("{key} environment variable is required"))
            })
        };

        let email = match (
            var("EMAIL_USERNAME"),
            var("EMAIL_PASSWORD"),
            var("EMAIL_FROM"),
            var("EMAIL_TO"),
        ) {
            (Some(username), Some(password), Some(from_email), Some(to_email)) => {
                Some(EmailConfig {
                    smtp_server: var("SMTP_SERVER").unwrap_or_else(|| "smtp.gmail.com".into()),
                    smtp_port: parse_or(&var, "SMTP_PORT", 587)?,
                    username,
                    password,
                    from_email,
                    to_email,
                })
            }
            _ => None,
        };

        let whatsapp = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("WHATSAPP_FROM"),
            var("WHATSAPP_TO"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number), Some(to_number)) => {
                Some(WhatsAppConfig {
                    account_sid,
                    auth_token,
                    from_number,
                    to_number,
                })
            }
            _ => None,
        };

        let config = Config {
            target_url: required("TARGET_URL")?,
            base_url: var("BASE_URL").unwrap_or_else(default_base_url),
            database_path: var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_database_path),
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: var("OPENAI_MODEL").unwrap_or_else(default_openai_model),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(default_openai_base_url),
            check_interval_minutes: parse_or(&var, "CHECK_INTERVAL_MINUTES", default_check_interval())?,
            article_delay_secs: parse_or(&var, "ARTICLE_DELAY_SECS", default_article_delay())?,
            email,
            whatsapp,
            rules_path: var("RULES_PATH").map(PathBuf::from),
            visit_policy: match var("VISIT_POLICY") {
                Some(v) => v.parse()?,
                None => VisitPolicy::default(),
            },
            notify_on_clean: parse_or(&var, "NOTIFY_ON_CLEAN", false)?,
            health_port: match var("PORT") {
                Some(v) => Some(parse_value("PORT", &v)?),
                None => None,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), MonitorError> {
        if self.target_url.trim().is_empty() {
            return Err(MonitorError::ConfigError("target_url is empty".into()));
        }
        if self.openai_api_key.trim().is_empty() {
            return Err(MonitorError::ConfigError("openai_api_key is empty".into()));
        }
        if self.check_interval_minutes == 0 {
            return Err(MonitorError::ConfigError(
                "check_interval_minutes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_minutes * 60)
    }

    pub fn article_delay(&self) -> Duration {
        Duration::from_secs(self.article_delay_secs)
    }

    /// Log the effective settings without secrets.
    pub fn log_redacted(&self) {
        info!(
            target_url = %self.target_url,
            database = %self.database_path.display(),
            model = %self.openai_model,
            interval_minutes = self.check_interval_minutes,
            email = self.email.is_some(),
            whatsapp = self.whatsapp.is_some(),
            visit_policy = ?self.visit_policy,
            "Monitor configuration"
        );
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, MonitorError> {
    value
        .trim()
        .parse()
        .map_err(|_| MonitorError::ConfigError(format!("{key} has an invalid value: {value}")))
}

fn parse_or<T: FromStr, F: Fn(&str) -> Option<String>>(
    var: &F,
    key: &str,
    default: T,
) -> Result<T, MonitorError> {
    match var(key) {
        Some(v) => parse_value(key, &v),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_minimal() {
        let config = Config::from_lookup(lookup(&[
            ("TARGET_URL", "https://www.spa.gov.sa/en/news/latest-news"),
            ("OPENAI_API_KEY", "sk-test"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://www.spa.gov.sa");
        assert_eq!(config.database_path, PathBuf::from("news_monitor.db"));
        assert_eq!(config.openai_model, "gpt-4.1");
        assert_eq!(config.check_interval(), Duration::from_secs(20 * 60));
        assert_eq!(config.visit_policy, VisitPolicy::MarkAlways);
        assert_eq!(config.email, None);
        assert_eq!(config.whatsapp, None);
        assert_eq!(config.health_port, None);
    }

    #[test]
    fn env_full() {
        let config = Config::from_lookup(lookup(&[
            ("TARGET_URL", "https://www.spa.gov.sa/en/news/latest-news"),
            ("OPENAI_API_KEY", "sk-test"),
            ("CHECK_INTERVAL_MINUTES", "60"),
            ("EMAIL_USERNAME", "monitor@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("EMAIL_FROM", "monitor@example.com"),
            ("EMAIL_TO", "desk@example.com"),
            ("SMTP_PORT", "465"),
            ("TWILIO_ACCOUNT_SID", "AC1"),
            ("TWILIO_AUTH_TOKEN", "tok"),
            ("WHATSAPP_FROM", "+1415"),
            ("WHATSAPP_TO", "+9665"),
            ("VISIT_POLICY", "retry_failed"),
            ("NOTIFY_ON_CLEAN", "true"),
            ("PORT", "8080"),
        ]))
        .unwrap();

        assert_eq!(config.check_interval_minutes, 60);
        assert_eq!(config.email.as_ref().unwrap().smtp_port, 465);
        assert_eq!(config.email.as_ref().unwrap().smtp_server, "smtp.gmail.com");
        assert_eq!(config.whatsapp.as_ref().unwrap().account_sid, "AC1");
        assert_eq!(config.visit_policy, VisitPolicy::RetryFailed);
        assert!(config.notify_on_clean);
        assert_eq!(config.health_port, Some(8080));
    }

    #[test]
    fn env_errors() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("TARGET_URL", "https://x")])),
            Err(MonitorError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[
                ("TARGET_URL", "https://x"),
                ("OPENAI_API_KEY", "k"),
                ("CHECK_INTERVAL_MINUTES", "soon"),
            ])),
            Err(MonitorError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[
                ("TARGET_URL", "https://x"),
                ("OPENAI_API_KEY", "k"),
                ("VISIT_POLICY", "sometimes"),
            ])),
            Err(MonitorError::ConfigError(_))
        ));
    }

    #[test]
    fn json_file() {
        let path = "config_test.json";
        fs::write(
            path,
            r#"{
                "target_url": "https://www.spa.gov.sa/en/news/latest-news",
                "openai_api_key": "sk-test",
                "check_interval_minutes": 30,
                "email": {
                    "smtp_server": "smtp.example.com",
                    "smtp_port": 587,
                    "username": "u",
                    "password": "p",
                    "from_email": "monitor@example.com",
                    "to_email": "desk@example.com"
                },
                "rules_path": "rules.json",
                "visit_policy": "retry_failed"
            }"#,
        )
        .unwrap();

        let config = Config::from_file(path).unwrap();
        assert_eq!(config.check_interval_minutes, 30);
        assert_eq!(config.article_delay(), Duration::from_secs(2));
        assert_eq!(config.email.unwrap().smtp_server, "smtp.example.com");
        assert_eq!(config.rules_path, Some(PathBuf::from("rules.json")));
        assert_eq!(config.visit_policy, VisitPolicy::RetryFailed);
        assert!(!config.notify_on_clean);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn zero_interval_is_rejected() {
        let path = "config_test_zero.json";
        fs::write(
            path,
            r#"{ "target_url": "https://x", "openai_api_key": "k", "check_interval_minutes": 0 }"#,
        )
        .unwrap();
        assert!(matches!(
            Config::from_file(path),
            Err(MonitorError::ConfigError(_))
        ));
        fs::remove_file(path).unwrap();
    }
}
