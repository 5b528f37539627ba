pub mod client;
pub mod messages;

pub use client::{RecognitionService, ServiceConnection};
pub use messages::{
    IntentResponse, PhraseResponse, RecognitionStatus, RecognizedPhrase, ServiceEvent,
};
