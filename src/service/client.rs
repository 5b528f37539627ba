use tokio::sync::mpsc;

use super::messages::ServiceEvent;
use crate::error::SessionError;
use crate::session::SessionConfig;

/// Client for the remote recognition service.
///
/// This crate does not implement the wire protocol; it defines the shape a
/// session needs. `connect` returns the conversation handle together with
/// the raw event receiver, so event delivery is registered before the first
/// audio byte can be sent — no event can be missed.
#[async_trait::async_trait]
pub trait RecognitionService: Send + Sync {
    async fn connect(
        &self,
        config: &SessionConfig,
    ) -> Result<(Box<dyn ServiceConnection>, mpsc::Receiver<ServiceEvent>), SessionError>;
}

/// One open conversation with the recognition service.
///
/// Implementations release the underlying connection on drop; `close` is
/// the explicit path and the one the session uses.
#[async_trait::async_trait]
pub trait ServiceConnection: Send {
    /// Forward one buffer of audio bytes.
    async fn send_audio(&mut self, bytes: &[u8]) -> Result<(), SessionError>;

    /// Tell the service the audio stream is finished so it can flush final
    /// results.
    async fn end_audio(&mut self) -> Result<(), SessionError>;

    /// Close the conversation and release the underlying connection.
    async fn close(&mut self) -> Result<(), SessionError>;
}
