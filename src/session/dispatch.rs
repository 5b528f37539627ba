use crate::error::ServiceErrorCode;
use crate::service::{RecognizedPhrase, ServiceEvent};

use super::config::RecognitionMode;

/// A normalized candidate phrase delivered to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    pub text: String,
    pub confidence: f32,
}

/// Normalized recognition event delivered to the caller, one tagged union
/// for all five channels the service surface exposes.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// Interim hypothesis for the utterance in progress
    Partial { text: String },

    /// Final result for an utterance. `terminal` marks the point after
    /// which the session will accept no further audio: every final result
    /// in short-phrase mode, end-of-dictation or silence timeout in long
    /// dictation.
    Final {
        phrases: Vec<Phrase>,
        terminal: bool,
    },

    /// The service finished an utterance without producing a phrase.
    /// Informational stand-in for a final result; carries the same
    /// terminality.
    NoMatch { terminal: bool },

    /// Intent parse of a recognized utterance, passed through verbatim
    Intent { payload: serde_json::Value },

    /// Service-side failure. The session stays open; the caller decides
    /// whether to stop and start fresh.
    Error {
        code: ServiceErrorCode,
        message: String,
    },

    /// Capture device started or stopped recording
    MicStatus { recording: bool },
}

impl RecognitionEvent {
    /// Whether the caller should treat the session as finished after this
    /// event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RecognitionEvent::Final { terminal: true, .. }
                | RecognitionEvent::NoMatch { terminal: true }
        )
    }
}

/// Normalizes raw service payloads into [`RecognitionEvent`]s.
///
/// Stateless; a pure function over (event, mode).
pub struct ResultDispatcher;

impl ResultDispatcher {
    pub fn normalize(event: ServiceEvent, mode: RecognitionMode) -> RecognitionEvent {
        match event {
            ServiceEvent::Partial { text } => RecognitionEvent::Partial { text },
            ServiceEvent::Phrase(response) => {
                let terminal = match mode {
                    RecognitionMode::ShortPhrase => true,
                    RecognitionMode::LongDictation => response.status.ends_dictation(),
                };
                if response.results.is_empty() {
                    RecognitionEvent::NoMatch { terminal }
                } else {
                    RecognitionEvent::Final {
                        phrases: Self::select_phrases(&response.results),
                        terminal,
                    }
                }
            }
            ServiceEvent::Intent(intent) => RecognitionEvent::Intent {
                payload: intent.payload,
            },
            ServiceEvent::Error { code, message } => RecognitionEvent::Error { code, message },
        }
    }

    /// Pick one representative phrase per distinct confidence value.
    ///
    /// Candidates are grouped by confidence and the first-encountered
    /// phrase of each group wins; the survivors keep encounter order, not
    /// confidence order. Deliberately not a highest-confidence pick —
    /// callers depend on seeing one candidate per confidence level.
    pub fn select_phrases(results: &[RecognizedPhrase]) -> Vec<Phrase> {
        let mut seen = Vec::new();
        let mut phrases = Vec::new();

        for candidate in results {
            let bits = candidate.confidence.to_bits();
            if seen.contains(&bits) {
                continue;
            }
            seen.push(bits);
            phrases.push(Phrase {
                text: candidate.display_text.clone(),
                confidence: candidate.confidence,
            });
        }

        phrases
    }
}
