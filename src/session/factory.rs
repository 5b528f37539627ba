use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use super::config::{RecognitionMode, SessionConfig};
use super::session::{EventReceiver, RecognitionSession};
use crate::error::SessionError;
use crate::service::RecognitionService;

/// Constructs the four session variants: microphone or stream input, with
/// or without intent parsing.
///
/// Pure construction — no I/O happens until [`RecognitionSession::start`].
/// Every constructor returns the session together with the receiver the
/// caller drains for normalized events.
pub struct SessionFactory;

impl SessionFactory {
    /// Session fed by a live capture device.
    pub fn microphone_session(
        config: SessionConfig,
        service: Arc<dyn RecognitionService>,
    ) -> (RecognitionSession, EventReceiver) {
        Self::build(config, service)
    }

    /// Microphone session with intent parsing.
    ///
    /// Intent sessions run short-phrase recognition regardless of the
    /// configured mode; intent parsing applies to a single utterance.
    pub fn microphone_session_with_intent(
        config: SessionConfig,
        service: Arc<dyn RecognitionService>,
    ) -> Result<(RecognitionSession, EventReceiver), SessionError> {
        let config = Self::require_intent(config)?;
        Ok(Self::build(config, service))
    }

    /// Session fed by a finite byte stream (for example a wave file).
    pub fn stream_session(
        config: SessionConfig,
        service: Arc<dyn RecognitionService>,
    ) -> (RecognitionSession, EventReceiver) {
        Self::build(config, service)
    }

    /// Stream session with intent parsing. Short-phrase semantics, as with
    /// the microphone variant.
    pub fn stream_session_with_intent(
        config: SessionConfig,
        service: Arc<dyn RecognitionService>,
    ) -> Result<(RecognitionSession, EventReceiver), SessionError> {
        let config = Self::require_intent(config)?;
        Ok(Self::build(config, service))
    }

    fn require_intent(mut config: SessionConfig) -> Result<SessionConfig, SessionError> {
        match &config.intent {
            Some(intent) if !intent.app_id.is_empty() && !intent.subscription_id.is_empty() => {
                config.mode = RecognitionMode::ShortPhrase;
                Ok(config)
            }
            Some(_) => Err(SessionError::Configuration(
                "intent requested but application id or subscription id is empty".to_string(),
            )),
            None => Err(SessionError::Configuration(
                "intent requested but no intent credentials are configured".to_string(),
            )),
        }
    }

    fn build(
        config: SessionConfig,
        service: Arc<dyn RecognitionService>,
    ) -> (RecognitionSession, EventReceiver) {
        info!(
            "Creating recognition session {} ({:?})",
            config.session_id, config.mode
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = RecognitionSession::new(config, service, events_tx);

        (session, events_rx)
    }
}
