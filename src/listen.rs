//! Capture loop
//!
//! The producer side of the command queue: drives the conversation gate
//! with the wake trigger and the transcriber, pushes every captured
//! utterance onto the queue, and never blocks on the consumer. Capture
//! failures are benign — log, back off briefly, try again next cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::config::LanguageSetting;
use crate::gate::{ConversationGate, Directive};
use crate::hud::Hud;
use crate::voice::{CaptureOutcome, Transcriber, WakeTrigger};

/// Sleep between idle polls and after failed captures
const BACKOFF: Duration = Duration::from_millis(50);

/// The listening half of the pipeline
pub struct Listener {
    gate: ConversationGate,
    wake: Box<dyn WakeTrigger>,
    transcriber: Arc<dyn Transcriber>,
    queue: mpsc::UnboundedSender<String>,
    hud: Arc<dyn Hud>,
    language: LanguageSetting,
}

impl Listener {
    /// Assemble a listener over its collaborators
    #[must_use]
    pub fn new(
        gate: ConversationGate,
        wake: Box<dyn WakeTrigger>,
        transcriber: Arc<dyn Transcriber>,
        queue: mpsc::UnboundedSender<String>,
        hud: Arc<dyn Hud>,
        language: LanguageSetting,
    ) -> Self {
        Self {
            gate,
            wake,
            transcriber,
            queue,
            hud,
            language,
        }
    }

    /// Run the capture loop until the queue's consumer goes away
    pub async fn run(mut self) {
        tracing::info!("listener started");

        loop {
            self.gate.set_language(self.language.get().stt_code());

            let outcome = match self.gate.tick(Instant::now()) {
                Directive::AwaitWake { opts } => {
                    if !self.wake.poll() {
                        tokio::time::sleep(BACKOFF).await;
                        continue;
                    }
                    tracing::debug!("wake trigger fired");
                    self.transcriber.capture(opts).await
                }
                Directive::Capture { opts } => self.transcriber.capture(opts).await,
            };

            let failed = !matches!(outcome, CaptureOutcome::Text(_));

            if let Some(command) = self.gate.on_capture(Instant::now(), &outcome) {
                self.hud.log(&format!("[VOICE] {command}"));
                if self.queue.send(command).is_err() {
                    tracing::info!("command queue closed, listener stopping");
                    return;
                }
            }

            if failed {
                tokio::time::sleep(BACKOFF).await;
            }
        }
    }
}
