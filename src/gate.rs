//! Continuous-conversation gate
//!
//! Decides whether incoming audio should be transcribed at all, and how
//! long the session stays hot after an utterance. In `Idle` the wake
//! trigger must fire before a capture is attempted; in `Active` every
//! cycle captures without the wake phrase, until the window expires.
//!
//! The machine is driven with an explicit `now` so the timing rules are
//! testable without real clocks; the listener loop supplies wall time.

use std::time::{Duration, Instant};

use crate::voice::{CaptureOpts, CaptureOutcome, WakePhrase};

/// How long the session stays hot after a successful capture
pub const CONVERSATION_WINDOW: Duration = Duration::from_secs(10);

/// Capture timeout while the session is hot (short, every cycle)
const ACTIVE_TIMEOUT: Duration = Duration::from_secs(1);

/// Utterance length limit while the session is hot
const ACTIVE_PHRASE_LIMIT: Duration = Duration::from_secs(4);

/// Utterance length limit for the wake-triggered first capture
const WAKE_PHRASE_LIMIT: Duration = Duration::from_secs(5);

/// Capture timeout for the wake-triggered first capture
const WAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for the wake trigger
    Idle,
    /// Inside a continuous-conversation window
    Active {
        /// When the window closes absent further captures
        expires_at: Instant,
    },
}

/// What the listener should do this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Poll the wake trigger; capture only if it fires
    AwaitWake {
        /// Options for the capture that follows a positive trigger
        opts: CaptureOpts,
    },
    /// Capture immediately with the hot-window timeout
    Capture {
        /// Options for this cycle's capture
        opts: CaptureOpts,
    },
}

/// The wake/continuous-listening state machine
#[derive(Debug)]
pub struct ConversationGate {
    state: GateState,
    wake: WakePhrase,
    language: &'static str,
    phrase_gated: bool,
}

impl ConversationGate {
    /// Create a gate in the idle state
    #[must_use]
    pub fn new(wake: WakePhrase) -> Self {
        Self {
            state: GateState::Idle,
            wake,
            language: "en",
            phrase_gated: false,
        }
    }

    /// Require the wake phrase in idle captures
    ///
    /// For software wake triggers that fire on every cycle: an idle capture
    /// is only accepted when the transcript contains the wake phrase. Active
    /// captures are unaffected.
    #[must_use]
    pub fn require_phrase_when_idle(mut self) -> Self {
        self.phrase_gated = true;
        self
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> GateState {
        self.state
    }

    /// Update the language hint passed to capture attempts
    pub fn set_language(&mut self, language: &'static str) {
        self.language = language;
    }

    /// Decide what to do this cycle
    ///
    /// Also performs the expiry transition: an `Active` gate whose window
    /// has passed drops back to `Idle` before the directive is issued.
    pub fn tick(&mut self, now: Instant) -> Directive {
        if let GateState::Active { expires_at } = self.state {
            if now >= expires_at {
                tracing::debug!("conversation window expired");
                self.state = GateState::Idle;
            }
        }

        match self.state {
            GateState::Idle => Directive::AwaitWake {
                opts: CaptureOpts {
                    timeout: WAKE_TIMEOUT,
                    phrase_limit: WAKE_PHRASE_LIMIT,
                    language: self.language,
                },
            },
            GateState::Active { .. } => Directive::Capture {
                opts: CaptureOpts {
                    timeout: ACTIVE_TIMEOUT,
                    phrase_limit: ACTIVE_PHRASE_LIMIT,
                    language: self.language,
                },
            },
        }
    }

    /// Feed a capture outcome into the machine
    ///
    /// A successful non-empty transcript (leading wake phrase stripped on
    /// the idle path) is returned as the command to enqueue, and the window
    /// is opened or refreshed to `now + 10s`. Failures leave the state
    /// unchanged.
    pub fn on_capture(&mut self, now: Instant, outcome: &CaptureOutcome) -> Option<String> {
        let text = match outcome {
            CaptureOutcome::Text(text) => text,
            CaptureOutcome::Timeout => {
                tracing::trace!("capture timed out");
                return None;
            }
            CaptureOutcome::NoSpeech => {
                tracing::trace!("no speech in capture");
                return None;
            }
            CaptureOutcome::RecognitionFailed => {
                tracing::debug!("recognition failed");
                return None;
            }
        };

        if self.phrase_gated && self.state == GateState::Idle && !self.wake.matches(text) {
            tracing::trace!("idle capture without wake phrase dropped");
            return None;
        }

        // Only the wake-triggered first capture carries the wake phrase;
        // follow-ups inside the hot window are taken verbatim.
        let command = match self.state {
            GateState::Idle => self.wake.strip_leading(text),
            GateState::Active { .. } => text.trim().to_string(),
        };
        if command.is_empty() {
            return None;
        }

        self.state = GateState::Active {
            expires_at: now + CONVERSATION_WINDOW,
        };
        tracing::debug!(command = %command, "utterance captured, window refreshed");
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ConversationGate {
        ConversationGate::new(WakePhrase::new("valet"))
    }

    fn text(s: &str) -> CaptureOutcome {
        CaptureOutcome::Text(s.to_string())
    }

    #[test]
    fn idle_directive_carries_wake_capture_options() {
        let mut g = gate();
        let expected = Directive::AwaitWake {
            opts: CaptureOpts {
                timeout: WAKE_TIMEOUT,
                phrase_limit: WAKE_PHRASE_LIMIT,
                language: "en",
            },
        };
        assert_eq!(g.tick(Instant::now()), expected);
    }

    #[test]
    fn starts_idle_awaiting_wake() {
        let mut g = gate();
        let now = Instant::now();

        assert_eq!(g.state(), GateState::Idle);
        assert!(matches!(g.tick(now), Directive::AwaitWake { .. }));
    }

    #[test]
    fn successful_capture_opens_ten_second_window() {
        let mut g = gate();
        let t = Instant::now();

        let cmd = g.on_capture(t, &text("valet what time is it"));
        assert_eq!(cmd.as_deref(), Some("what time is it"));
        assert_eq!(
            g.state(),
            GateState::Active {
                expires_at: t + Duration::from_secs(10)
            }
        );
    }

    #[test]
    fn capture_in_window_refreshes_expiry() {
        let mut g = gate();
        let t = Instant::now();

        g.on_capture(t, &text("valet hello"));

        // At T+9s the window is still open and a capture extends it
        let t9 = t + Duration::from_secs(9);
        assert!(matches!(g.tick(t9), Directive::Capture { .. }));
        g.on_capture(t9, &text("combat mode"));

        assert_eq!(
            g.state(),
            GateState::Active {
                expires_at: t + Duration::from_secs(19)
            }
        );
    }

    #[test]
    fn window_expires_back_to_idle() {
        let mut g = gate();
        let t = Instant::now();

        g.on_capture(t, &text("valet hello"));

        let t10 = t + Duration::from_secs(10);
        assert!(matches!(g.tick(t10), Directive::AwaitWake { .. }));
        assert_eq!(g.state(), GateState::Idle);
    }

    #[test]
    fn extended_window_expires_at_new_deadline() {
        let mut g = gate();
        let t = Instant::now();

        g.on_capture(t, &text("valet hello"));
        g.on_capture(t + Duration::from_secs(9), &text("again"));

        // Original deadline passed, extended one not yet
        let t12 = t + Duration::from_secs(12);
        assert!(matches!(g.tick(t12), Directive::Capture { .. }));

        let t19 = t + Duration::from_secs(19);
        assert!(matches!(g.tick(t19), Directive::AwaitWake { .. }));
    }

    #[test]
    fn failed_captures_do_not_change_state() {
        let mut g = gate();
        let t = Instant::now();

        assert_eq!(g.on_capture(t, &CaptureOutcome::Timeout), None);
        assert_eq!(g.state(), GateState::Idle);

        g.on_capture(t, &text("valet hello"));
        let active = g.state();

        assert_eq!(g.on_capture(t, &CaptureOutcome::NoSpeech), None);
        assert_eq!(g.on_capture(t, &CaptureOutcome::RecognitionFailed), None);
        assert_eq!(g.state(), active);
    }

    #[test]
    fn bare_wake_phrase_is_dropped_and_stays_idle() {
        let mut g = gate();
        let t = Instant::now();

        assert_eq!(g.on_capture(t, &text("valet")), None);
        assert_eq!(g.state(), GateState::Idle);
    }

    #[test]
    fn active_capture_does_not_require_wake_phrase() {
        let mut g = gate();
        let t = Instant::now();

        g.on_capture(t, &text("valet hello"));
        let cmd = g.on_capture(t + Duration::from_secs(2), &text("what is my pin"));
        assert_eq!(cmd.as_deref(), Some("what is my pin"));
    }

    #[test]
    fn active_capture_is_taken_verbatim() {
        let mut g = gate();
        let t = Instant::now();

        g.on_capture(t, &text("valet hello"));

        // A follow-up that happens to start with the wake phrase keeps it
        let cmd = g.on_capture(t + Duration::from_secs(1), &text("valet is my assistant"));
        assert_eq!(cmd.as_deref(), Some("valet is my assistant"));
    }

    #[test]
    fn phrase_gated_idle_drops_unaddressed_speech() {
        let mut g = gate().require_phrase_when_idle();
        let t = Instant::now();

        assert_eq!(g.on_capture(t, &text("what time is it")), None);
        assert_eq!(g.state(), GateState::Idle);

        let cmd = g.on_capture(t, &text("valet what time is it"));
        assert_eq!(cmd.as_deref(), Some("what time is it"));

        // Follow-ups inside the window do not need the phrase
        let cmd = g.on_capture(t + Duration::from_secs(2), &text("and in tokyo"));
        assert_eq!(cmd.as_deref(), Some("and in tokyo"));
    }
}
