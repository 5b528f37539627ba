use thiserror::Error;

use crate::session::SessionState;

/// Coarse error group reported by the recognition service.
///
/// The service's own error space is much larger; these are the groups a
/// caller can act on (re-authenticate, check the network, check the device,
/// or just retry later).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ServiceErrorCode {
    /// Subscription key rejected or token expired
    Authentication,
    /// Connection to the service failed or dropped
    Connection,
    /// The capture device failed or produced no audio
    AudioDevice,
    /// The service did not answer within its deadline
    ServiceTimeout,
    /// Anything the service reports that does not fit the groups above
    Unknown,
}

impl std::fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceErrorCode::Authentication => "authentication",
            ServiceErrorCode::Connection => "connection",
            ServiceErrorCode::AudioDevice => "audio-device",
            ServiceErrorCode::ServiceTimeout => "service-timeout",
            ServiceErrorCode::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by session construction and the session lifecycle.
///
/// Service-originated failures that arrive while a session is running are
/// not represented here; those flow through the event channel as
/// [`RecognitionEvent::Error`](crate::RecognitionEvent::Error) so the caller
/// sees them in stream order.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Missing or inconsistent settings, detected at construction. Fatal;
    /// never retried.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The session is not in a state that allows the requested operation.
    #[error("operation not allowed while session is {state:?}")]
    State { state: SessionState },

    /// Connection or service failure while talking to the recognition
    /// service.
    #[error("transport failure ({code}): {message}")]
    Transport {
        code: ServiceErrorCode,
        message: String,
    },

    /// The local audio input could not be read.
    #[error("audio input error: {0}")]
    LocalIo(#[from] std::io::Error),
}

impl SessionError {
    pub fn state(state: SessionState) -> Self {
        SessionError::State { state }
    }

    pub fn transport(code: ServiceErrorCode, message: impl Into<String>) -> Self {
        SessionError::Transport {
            code,
            message: message.into(),
        }
    }
}
