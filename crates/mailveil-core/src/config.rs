//! Application configuration.
//!
//! Values are layered: built-in defaults, then the settings file under the
//! platform config directory, then environment variables.

use crate::error::Result;
use mailveil_ai::AiClient;
use mailveil_dispatch::DEFAULT_MAILPIT_URL;
use mailveil_ocr::OcrClient;
use mailveil_redact::{LabelFont, RedactionSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable names.
pub mod env {
    /// Language-model API key.
    pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
    /// OCR API key.
    pub const OCRSPACE_API_KEY: &str = "OCRSPACE_API_KEY";
    /// Resend API key.
    pub const RESEND_API_KEY: &str = "RESEND_API_KEY";
    /// `SendGrid` API key.
    pub const SENDGRID_API_KEY: &str = "SENDGRID_API_KEY";
    /// Sender address for Resend.
    pub const EMAIL_SENDER_RESEND: &str = "EMAIL_SENDER_RESEND";
    /// Sender address for `SendGrid`.
    pub const EMAIL_SENDER_SENDGRID: &str = "EMAIL_SENDER_SENDGRID";
    /// Sender address for Mailpit.
    pub const EMAIL_SENDER_MAILPIT: &str = "EMAIL_SENDER_MAILPIT";
    /// `true` selects the production providers.
    pub const USE_PRODUCTION_EMAIL: &str = "USE_PRODUCTION_EMAIL";
    /// Mailpit base URL.
    pub const MAILPIT_URL: &str = "MAILPIT_URL";
    /// Path to a TrueType font for labels.
    pub const MAILVEIL_FONT: &str = "MAILVEIL_FONT";
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language-model API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groq_api_key: Option<String>,
    /// OCR API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocrspace_api_key: Option<String>,
    /// Resend API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resend_api_key: Option<String>,
    /// `SendGrid` API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sendgrid_api_key: Option<String>,
    /// Sender address for Resend.
    pub sender_resend: String,
    /// Sender address for `SendGrid`.
    pub sender_sendgrid: String,
    /// Sender address for Mailpit.
    pub sender_mailpit: String,
    /// Mailpit base URL.
    pub mailpit_url: String,
    /// Use Resend/SendGrid instead of Mailpit.
    pub use_production_email: bool,
    /// Chat-completions endpoint.
    pub llm_endpoint: String,
    /// Model name.
    pub llm_model: String,
    /// OCR endpoint.
    pub ocr_endpoint: String,
    /// Timeout for each remote call, in seconds.
    pub request_timeout_secs: u64,
    /// TrueType font for redaction labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_font: Option<PathBuf>,
    /// Initial redaction settings for new sessions.
    pub redaction: RedactionSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            ocrspace_api_key: None,
            resend_api_key: None,
            sendgrid_api_key: None,
            sender_resend: String::new(),
            sender_sendgrid: String::new(),
            sender_mailpit: "mailveil@localhost".to_string(),
            mailpit_url: DEFAULT_MAILPIT_URL.to_string(),
            use_production_email: false,
            llm_endpoint: mailveil_ai::DEFAULT_ENDPOINT.to_string(),
            llm_model: mailveil_ai::DEFAULT_MODEL.to_string(),
            ocr_endpoint: mailveil_ocr::DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            label_font: None,
            redaction: RedactionSettings::default(),
        }
    }
}

impl Config {
    /// Path of the settings file.
    #[must_use]
    pub fn settings_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mailveil")
            .join("settings.json")
    }

    /// Loads defaults, the settings file if present, then the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        let path = Self::settings_path();

        let mut config = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Reading settings from {}", path.display());
            let contents = tokio::fs::read_to_string(&path).await?;
            Self::from_json(&contents)?
        } else {
            Self::default()
        };

        config.apply_env_with(|key| std::env::var(key).ok());
        config.warn_missing();
        Ok(config)
    }

    /// Parses a settings file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Saves the settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save(&self) -> Result<()> {
        let path = Self::settings_path();
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents).await?;

        info!("Settings saved to {:?}", path);
        Ok(())
    }

    /// Overrides fields from environment-style lookups. Blank values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for (key, slot) in [
            (env::GROQ_API_KEY, &mut self.groq_api_key),
            (env::OCRSPACE_API_KEY, &mut self.ocrspace_api_key),
            (env::RESEND_API_KEY, &mut self.resend_api_key),
            (env::SENDGRID_API_KEY, &mut self.sendgrid_api_key),
        ] {
            if let Some(value) = get(key) {
                *slot = Some(value);
            }
        }

        for (key, slot) in [
            (env::EMAIL_SENDER_RESEND, &mut self.sender_resend),
            (env::EMAIL_SENDER_SENDGRID, &mut self.sender_sendgrid),
            (env::EMAIL_SENDER_MAILPIT, &mut self.sender_mailpit),
            (env::MAILPIT_URL, &mut self.mailpit_url),
        ] {
            if let Some(value) = get(key) {
                *slot = value;
            }
        }

        if let Some(value) = get(env::USE_PRODUCTION_EMAIL) {
            self.use_production_email = value.trim().eq_ignore_ascii_case("true");
        }
        if let Some(value) = get(env::MAILVEIL_FONT) {
            self.label_font = Some(PathBuf::from(value));
        }
    }

    /// Logs a warning for every missing key the current mode needs.
    pub fn warn_missing(&self) {
        if self.groq_api_key.is_none() {
            warn!("{} not set, text and image classification will be skipped", env::GROQ_API_KEY);
        }
        if self.ocrspace_api_key.is_none() {
            warn!("{} not set, images will be sent unredacted", env::OCRSPACE_API_KEY);
        }
        if self.use_production_email {
            if self.resend_api_key.is_none() {
                warn!("{} not set", env::RESEND_API_KEY);
            }
            if self.sendgrid_api_key.is_none() {
                warn!("{} not set", env::SENDGRID_API_KEY);
            }
        }
    }

    /// Timeout for each remote call.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the language-model client.
    #[must_use]
    pub fn ai_client(&self) -> AiClient {
        AiClient::new(self.groq_api_key.clone())
            .with_endpoint(&self.llm_endpoint)
            .with_model(&self.llm_model)
            .with_timeout(self.request_timeout())
    }

    /// Builds the OCR client.
    #[must_use]
    pub fn ocr_client(&self) -> OcrClient {
        OcrClient::new(self.ocrspace_api_key.clone())
            .with_endpoint(&self.ocr_endpoint)
            .with_timeout(self.request_timeout())
    }

    /// Loads the label font, falling back to the built-in bitmap font.
    #[must_use]
    pub fn label_font(&self) -> LabelFont {
        LabelFont::load(self.label_font.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailveil_redact::RedactionCategory;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.use_production_email);
        assert_eq!(config.mailpit_url, "http://localhost:8025");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.redaction.any_enabled());
    }

    #[test]
    fn test_partial_settings_file() {
        let config = Config::from_json(
            r#"{"use_production_email": true, "redaction": {"ssn": {"enabled": false, "placeholder": "[SSN]"}}}"#,
        )
        .unwrap();
        assert!(config.use_production_email);
        assert!(!config.redaction.is_enabled(RedactionCategory::Ssn));
        assert!(config.redaction.is_enabled(RedactionCategory::Name));
        assert_eq!(config.llm_model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_with(lookup(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("OCRSPACE_API_KEY", "  "),
            ("USE_PRODUCTION_EMAIL", "TRUE"),
            ("EMAIL_SENDER_RESEND", "noreply@example.com"),
            ("MAILVEIL_FONT", "/fonts/a.ttf"),
        ]));

        assert_eq!(config.groq_api_key.as_deref(), Some("gsk_test"));
        assert!(config.ocrspace_api_key.is_none());
        assert!(config.use_production_email);
        assert_eq!(config.sender_resend, "noreply@example.com");
        assert_eq!(config.label_font, Some(PathBuf::from("/fonts/a.ttf")));
    }

    #[test]
    fn test_production_flag_must_be_true() {
        let mut config = Config::default();
        config.apply_env_with(lookup(&[("USE_PRODUCTION_EMAIL", "yes")]));
        assert!(!config.use_production_email);
    }

    #[test]
    fn test_round_trip_keeps_keys_out_when_unset() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("groq_api_key"));
        assert_eq!(Config::from_json(&json).unwrap(), Config::default());
    }

    #[test]
    fn test_settings_path() {
        assert!(Config::settings_path().ends_with("mailveil/settings.json"));
    }
}
