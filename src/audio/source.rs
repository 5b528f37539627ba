use std::io::Read;

use tokio::sync::mpsc;

use super::chunk::AudioChunk;
use crate::error::SessionError;

/// Read size for pull-based sources. One `send_audio` call per buffer.
pub const STREAM_CHUNK_SIZE: usize = 1024;

/// A live capture device (microphone or equivalent).
///
/// Push-based: `start` hands back a channel of captured chunks and the
/// device keeps producing until `stop` is called. The session reports
/// device status to the caller around these two calls.
#[async_trait::async_trait]
pub trait CaptureDevice: Send {
    /// Begin capturing.
    ///
    /// Returns a channel receiver that will receive audio chunks. The
    /// channel closes when capture ends.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioChunk>, SessionError>;

    /// Stop capturing. The chunk channel closes once in-flight buffers are
    /// drained.
    async fn stop(&mut self) -> Result<(), SessionError>;

    /// Check if the device is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Audio input for one recognition session.
///
/// Two shapes: a live device that pushes chunks until told to stop, or a
/// finite byte stream the session pulls through a fixed-size buffer.
pub enum AudioInput {
    /// Live capture; the session remains active until a terminal event or
    /// an explicit stop.
    Microphone(Box<dyn CaptureDevice>),
    /// Finite pull-based stream, exhausted when a read returns zero bytes.
    Stream(Box<dyn Read + Send>),
}

impl AudioInput {
    pub fn microphone(device: impl CaptureDevice + 'static) -> Self {
        AudioInput::Microphone(Box::new(device))
    }

    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        AudioInput::Stream(Box::new(reader))
    }

    pub fn is_live(&self) -> bool {
        matches!(self, AudioInput::Microphone(_))
    }
}

impl std::fmt::Debug for AudioInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioInput::Microphone(device) => {
                f.debug_tuple("Microphone").field(&device.name()).finish()
            }
            AudioInput::Stream(_) => f.debug_tuple("Stream").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn stream_input_is_not_live() {
        let input = AudioInput::stream(Cursor::new(vec![0u8; 16]));
        assert!(!input.is_live());
    }
}
