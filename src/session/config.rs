use serde::{Deserialize, Serialize};

use crate::config::{IntentSettings, Settings};
use crate::error::SessionError;

/// Recognition mode for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionMode {
    /// Single utterance, one terminal result
    ShortPhrase,
    /// Continuous recognition until end-of-dictation or silence timeout
    LongDictation,
}

/// Credentials for intent parsing via the language-understanding add-on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
    pub app_id: String,
    pub subscription_id: String,
}

/// Configuration for a recognition session. Immutable once the session
/// starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Short phrase vs long dictation
    pub mode: RecognitionMode,

    /// Recognition locale (e.g. "en-US")
    pub locale: String,

    /// Subscription key presented to the recognition service
    pub subscription_key: String,

    /// Authentication endpoint override. None means the service default.
    pub auth_uri: Option<String>,

    /// Intent credentials, required only by the with-intent session
    /// variants
    pub intent: Option<IntentConfig>,
}

impl SessionConfig {
    pub fn new(mode: RecognitionMode, subscription_key: impl Into<String>) -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            mode,
            locale: "en-US".to_string(),
            subscription_key: subscription_key.into(),
            auth_uri: None,
            intent: None,
        }
    }

    /// Build a session config from loaded [`Settings`].
    ///
    /// Fails when the settings carry no subscription key; pass the token
    /// explicitly via [`SessionConfig::new`] in that case.
    pub fn from_settings(settings: &Settings, mode: RecognitionMode) -> Result<Self, SessionError> {
        let key = settings.subscription_key.clone().ok_or_else(|| {
            SessionError::Configuration("settings carry no subscription key".to_string())
        })?;

        Ok(Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            mode,
            locale: settings.locale.clone(),
            subscription_key: key,
            auth_uri: settings.auth_uri.clone(),
            intent: settings.intent.as_ref().map(IntentConfig::from),
        })
    }

    pub fn with_intent(mut self, app_id: impl Into<String>, subscription_id: impl Into<String>) -> Self {
        self.intent = Some(IntentConfig {
            app_id: app_id.into(),
            subscription_id: subscription_id.into(),
        });
        self
    }
}

impl From<&IntentSettings> for IntentConfig {
    fn from(s: &IntentSettings) -> Self {
        Self {
            app_id: s.app_id.clone(),
            subscription_id: s.subscription_id.clone(),
        }
    }
}
