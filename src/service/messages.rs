use serde::{Deserialize, Serialize};

use crate::error::ServiceErrorCode;

/// Session status reported alongside a phrase response.
///
/// In long dictation the service keeps the conversation open across many
/// responses; `EndOfDictation` and `DictationEndSilenceTimeout` are the two
/// statuses that close it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionStatus {
    /// Speech was recognized; results carry the candidate phrases
    Success,
    /// Audio was understood as speech but no phrase matched
    NoMatch,
    /// Nothing but silence since the session opened
    InitialSilenceTimeout,
    /// Audio contained only non-speech noise
    BabbleTimeout,
    /// The service reached the end of a dictation conversation
    EndOfDictation,
    /// Dictation ended because the speaker went silent
    DictationEndSilenceTimeout,
}

impl RecognitionStatus {
    /// Whether this status closes a long-dictation conversation.
    pub fn ends_dictation(self) -> bool {
        matches!(
            self,
            RecognitionStatus::EndOfDictation | RecognitionStatus::DictationEndSilenceTimeout
        )
    }
}

/// One candidate phrase inside a phrase response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedPhrase {
    /// Text with capitalization and punctuation applied
    pub display_text: String,

    /// Raw lexical form, when the service provides it
    #[serde(default)]
    pub lexical_form: Option<String>,

    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
}

/// A final phrase response from the service. May carry several candidate
/// phrases with differing confidence scores; normalization picks the
/// representatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseResponse {
    pub status: RecognitionStatus,
    pub results: Vec<RecognizedPhrase>,
}

/// Structured interpretation of an utterance from the language-understanding
/// add-on. The payload shape is owned by that service; it is passed through
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    pub payload: serde_json::Value,
}

/// Everything the recognition service can deliver over one conversation,
/// as a single tagged stream.
#[derive(Debug, Clone)]
pub enum ServiceEvent {
    /// Interim hypothesis; superseded by later partials or a phrase response
    Partial { text: String },
    /// Final response for an utterance (or for the whole session in
    /// short-phrase mode)
    Phrase(PhraseResponse),
    /// Intent parse of a recognized utterance
    Intent(IntentResponse),
    /// Service-side failure; the conversation may or may not survive it
    Error {
        code: ServiceErrorCode,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dictation_end_statuses_end_dictation() {
        assert!(RecognitionStatus::EndOfDictation.ends_dictation());
        assert!(RecognitionStatus::DictationEndSilenceTimeout.ends_dictation());
        assert!(!RecognitionStatus::Success.ends_dictation());
        assert!(!RecognitionStatus::NoMatch.ends_dictation());
        assert!(!RecognitionStatus::InitialSilenceTimeout.ends_dictation());
        assert!(!RecognitionStatus::BabbleTimeout.ends_dictation());
    }
}
