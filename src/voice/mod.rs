//! Voice collaborator seams
//!
//! The core never touches audio hardware or model internals. It talks to
//! four narrow contracts: a wake trigger, a transcriber, a speech sink, and
//! the raw-audio feeds behind them. Concrete HTTP-backed implementations
//! live in [`stt`] and [`tts`]; tests substitute stubs.

mod pipe;
mod stt;
mod tts;
mod wake;

use std::time::Duration;

use async_trait::async_trait;

pub use pipe::{MicFeed, SpeakerOut};
pub use stt::RemoteTranscriber;
pub use tts::Speaker;
pub use wake::{AlwaysAwake, WakePhrase};

use crate::Result;

/// Outcome of one transcription capture attempt
///
/// Capture failures are ordinary values, not errors: each kind gets its own
/// logging and the listener simply retries next cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A non-empty transcript
    Text(String),
    /// No audio arrived within the capture timeout
    Timeout,
    /// Audio arrived but contained no recognizable speech
    NoSpeech,
    /// The recognition backend failed (network, auth, parse)
    RecognitionFailed,
}

/// Parameters for one capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOpts {
    /// How long to wait for speech to start
    pub timeout: Duration,
    /// Maximum utterance length
    pub phrase_limit: Duration,
    /// Language hint for the recognizer ("en", "hi")
    pub language: &'static str,
}

/// Acoustic wake trigger
///
/// `poll` is short-blocking: true when the wake phrase was just detected.
pub trait WakeTrigger: Send {
    /// Check whether the wake phrase was detected since the last poll
    fn poll(&mut self) -> bool;
}

/// Transcription source
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Attempt one bounded capture-and-transcribe cycle
    async fn capture(&self, opts: CaptureOpts) -> CaptureOutcome;
}

/// Speech output sink
///
/// Fire-and-forget from the core's perspective: implementations log their
/// own failures.
#[async_trait]
pub trait SpeechSink: Send + Sync {
    /// Speak the given text
    async fn speak(&self, text: &str);
}

/// Speech sink for voice-disabled runs; replies only reach the log
pub struct MutedSink;

#[async_trait]
impl SpeechSink for MutedSink {
    async fn speak(&self, text: &str) {
        tracing::info!(reply = %text, "voice disabled, reply logged only");
    }
}

/// Supplies one capture window of encoded audio
///
/// Implementations own microphone access and blocking semantics; the core
/// only sees WAV bytes or the absence of any.
#[async_trait]
pub trait AudioFeed: Send + Sync {
    /// Record up to `phrase_limit` of audio, waiting at most `timeout` for
    /// speech to begin. `None` means nothing was captured in time.
    async fn record(&self, timeout: Duration, phrase_limit: Duration) -> Result<Option<Vec<u8>>>;
}

/// Consumes synthesized audio
#[async_trait]
pub trait AudioOut: Send + Sync {
    /// Play the given encoded audio to completion
    async fn play(&self, audio: &[u8]) -> Result<()>;
}
