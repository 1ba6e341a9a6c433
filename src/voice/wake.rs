//! Transcript-level wake phrase handling
//!
//! Acoustic detection belongs to the wake-trigger collaborator; this module
//! only deals with the text that comes back from transcription — a captured
//! utterance often still carries the wake phrase at the front ("valet what
//! time is it").

use super::WakeTrigger;

/// A normalized wake phrase with transcript matching and stripping
#[derive(Debug, Clone)]
pub struct WakePhrase {
    phrase: String,
}

impl WakePhrase {
    /// Create a wake phrase, normalized to lowercase and trimmed
    #[must_use]
    pub fn new(phrase: &str) -> Self {
        Self {
            phrase: phrase.trim().to_lowercase(),
        }
    }

    /// The normalized phrase
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    /// Whether the transcript contains the wake phrase anywhere
    #[must_use]
    pub fn matches(&self, transcript: &str) -> bool {
        transcript.to_lowercase().contains(&self.phrase)
    }

    /// Strip a leading wake phrase from a transcript
    ///
    /// Only a leading occurrence is removed, along with any separating
    /// whitespace or punctuation; a wake phrase mid-utterance is left
    /// alone ("tell valet hello" stays intact).
    #[must_use]
    pub fn strip_leading(&self, transcript: &str) -> String {
        let trimmed = transcript.trim();

        match self.leading_match_end(trimmed) {
            Some(end) => trimmed[end..]
                .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
                .to_string(),
            None => trimmed.to_string(),
        }
    }

    /// Byte offset just past a leading wake phrase, or `None` without one
    ///
    /// Matches per-char with case folding rather than lowercasing the whole
    /// transcript: lowercasing can change byte lengths ("İ" grows), so an
    /// offset computed on a lowercased copy need not be a valid boundary of
    /// the original.
    fn leading_match_end(&self, text: &str) -> Option<usize> {
        let mut phrase = self.phrase.chars().peekable();

        for (idx, ch) in text.char_indices() {
            if phrase.peek().is_none() {
                return Some(idx);
            }
            for folded in ch.to_lowercase() {
                if phrase.next() != Some(folded) {
                    return None;
                }
            }
        }

        // The phrase consumed the whole transcript (bare wake phrase)
        phrase.peek().is_none().then_some(text.len())
    }
}

/// Substitute trigger for setups without an acoustic detector
///
/// Treats every idle cycle as triggered, so the transcript itself decides:
/// pair it with [`crate::gate::ConversationGate::require_phrase_when_idle`]
/// to keep utterances without the wake phrase from dispatching.
pub struct AlwaysAwake;

impl WakeTrigger for AlwaysAwake {
    fn poll(&mut self) -> bool {
        true
    }
}
