pub mod audio;
pub mod config;
pub mod error;
pub mod service;
pub mod session;

pub use audio::{AudioChunk, AudioFile, AudioInput, CaptureDevice, STREAM_CHUNK_SIZE};
pub use config::{IntentSettings, Settings};
pub use error::{ServiceErrorCode, SessionError};
pub use service::{
    IntentResponse, PhraseResponse, RecognitionService, RecognitionStatus, RecognizedPhrase,
    ServiceConnection, ServiceEvent,
};
pub use session::{
    EventReceiver, IntentConfig, Phrase, RecognitionEvent, RecognitionMode, RecognitionSession,
    ResultDispatcher, SessionConfig, SessionFactory, SessionState, SessionStats,
};
