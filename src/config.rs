use serde::Deserialize;

use crate::error::SessionError;

/// Application settings for the recognition service connection.
///
/// Loaded from a config file (TOML/JSON/YAML, whatever the `config` crate
/// resolves). The subscription key may be absent here when the caller keeps
/// credentials elsewhere and injects the token directly into
/// [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Recognition locale, e.g. "en-US"
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Authentication endpoint override. None means the service default.
    #[serde(default)]
    pub auth_uri: Option<String>,

    /// Subscription key for the recognition service
    #[serde(default)]
    pub subscription_key: Option<String>,

    /// Intent parsing credentials, absent when intent is not used
    #[serde(default)]
    pub intent: Option<IntentSettings>,
}

/// Credentials for the language-understanding add-on.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentSettings {
    pub app_id: String,
    pub subscription_id: String,
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, SessionError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| SessionError::Configuration(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| SessionError::Configuration(e.to_string()))
    }
}
