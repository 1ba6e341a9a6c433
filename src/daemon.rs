//! Daemon - the assistant service
//!
//! Orchestrates the capture loop and the command dispatcher around a FIFO
//! queue: the listener produces utterances, a single consumer normalizes
//! and resolves them, and the reply goes out through the speech sink.

use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use crate::ai::AiFallback;
use crate::db::{self, DbPool, MemoryRepo};
use crate::gate::ConversationGate;
use crate::hud::{Hud, LogHud};
use crate::listen::Listener;
use crate::normalize::normalize;
use crate::remind::{ReminderScheduler, ReminderSkill};
use crate::resolve::CommandResolver;
use crate::skills::{ClockSkill, GamingSetupSkill, LanguageSkill, SkillRegistry};
use crate::voice::{
    AlwaysAwake, MicFeed, MutedSink, RemoteTranscriber, Speaker, SpeakerOut, SpeechSink,
    WakePhrase,
};
use crate::{Config, Error, Result};

/// The valet daemon - owns the queue and both ends of it
pub struct Daemon {
    config: Config,
    db: DbPool,
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened
    pub fn new(config: Config) -> Result<Self> {
        let db_path = config.data_dir.join("valet.db");
        let db = db::init(&db_path)?;

        tracing::info!(path = %db_path.display(), "database initialized");

        Ok(Self { config, db })
    }

    fn api_key(&self) -> Result<String> {
        self.config
            .api_keys
            .openai
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is required".to_string()))
    }

    /// Build the resolver over its collaborators
    fn build_resolver(
        &self,
        hud: Arc<dyn Hud>,
        reminders: ReminderScheduler,
    ) -> Result<CommandResolver> {
        let memory = MemoryRepo::new(self.db.clone());

        let mut skills = SkillRegistry::new(self.config.skill_dirs.clone());
        skills.register(Box::new(ClockSkill));
        skills.register(Box::new(GamingSetupSkill));
        skills.register(Box::new(LanguageSkill::new(self.config.language.clone())));
        skills.register(Box::new(ReminderSkill::new(reminders)));

        let ai = AiFallback::new(
            &self.config.llm,
            self.api_key()?,
            self.config.assistant_name.clone(),
            self.config.language.clone(),
        )?;

        Ok(CommandResolver::new(memory, skills, Arc::new(ai), hud))
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if a collaborator cannot be constructed
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            assistant = %self.config.assistant_name,
            wake_word = %self.config.wake_word,
            voice = self.config.voice.enabled,
            "daemon running"
        );

        let hud: Arc<LogHud> = Arc::new(LogHud::new());
        let (remind_tx, mut remind_rx) = mpsc::unbounded_channel::<String>();
        let mut resolver = self.build_resolver(hud.clone(), ReminderScheduler::new(remind_tx))?;

        let speech: Arc<dyn SpeechSink> = if self.config.voice.enabled {
            Arc::new(Speaker::new(
                self.config.llm.api_base.clone(),
                self.api_key()?,
                self.config.voice.tts_model.clone(),
                self.config.voice.tts_voice.clone(),
                self.config.voice.tts_speed,
                Arc::new(SpeakerOut),
            )?)
        } else {
            Arc::new(MutedSink)
        };

        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<String>();

        if self.config.voice.enabled {
            let transcriber = RemoteTranscriber::new(
                self.config.llm.api_base.clone(),
                self.api_key()?,
                self.config.voice.stt_model.clone(),
                Arc::new(MicFeed),
            )?;

            // The software trigger fires every cycle, so the gate itself
            // enforces the wake phrase while idle.
            let gate = ConversationGate::new(WakePhrase::new(&self.config.wake_word))
                .require_phrase_when_idle();

            let listener = Listener::new(
                gate,
                Box::new(AlwaysAwake),
                Arc::new(transcriber),
                queue_tx,
                hud.clone(),
                self.config.language.clone(),
            );
            tokio::spawn(listener.run());
            tracing::info!(wake_word = %self.config.wake_word, "listening for wake phrase");
        } else {
            // Headless mode: read commands line by line from stdin
            tokio::spawn(read_stdin_commands(queue_tx));
            tracing::info!("voice disabled, reading commands from stdin");
        }

        // Set up shutdown signal
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(()).await;
            }
        });

        speech
            .speak(&format!(
                "{} at your service, sir.",
                self.config.assistant_name
            ))
            .await;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                captured = queue_rx.recv() => {
                    let Some(raw) = captured else {
                        tracing::info!("command queue closed");
                        break;
                    };

                    let command = normalize(&raw);
                    if command.is_empty() {
                        tracing::trace!("empty command dropped");
                        continue;
                    }

                    let resolution = resolver.resolve(&command).await;
                    speech.speak(&resolution.reply).await;
                }
                due = remind_rx.recv() => {
                    if let Some(message) = due {
                        let line = format!("Reminder, sir: {message}");
                        hud.log(&line);
                        speech.speak(&line).await;
                    }
                }
            }
        }

        Ok(())
    }
}

/// Push stdin lines onto the command queue until EOF
async fn read_stdin_commands(queue: mpsc::UnboundedSender<String>) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if queue.send(line).is_err() {
            return;
        }
    }

    tracing::debug!("stdin closed");
}
