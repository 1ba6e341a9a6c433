//! Valet - a wake-word voice assistant daemon
//!
//! This library provides the continuous-conversation dispatch engine:
//! - Conversation gating (wake phrase, bounded follow-up window)
//! - Command normalization and layered resolution
//! - Durable key-value fact memory
//! - Pluggable skills ahead of an AI completion fallback
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │          Collaborators (narrow seams)            │
//! │  Wake │ Transcriber │ Speech sink │ HUD │ Skills │
//! └───────────────────┬──────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────┐
//! │                Valet Daemon                      │
//! │  Gate → queue → normalize → resolve → speak      │
//! └───────────────────┬──────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────┐
//! │  Memory (SQLite) │ Skills │ AI fallback (HTTP)   │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod ai;
pub mod config;
pub mod daemon;
pub mod db;
pub mod error;
pub mod gate;
pub mod hud;
pub mod listen;
pub mod normalize;
pub mod remind;
pub mod resolve;
pub mod skills;
pub mod voice;

pub use ai::{AiFallback, CompletionBackend};
pub use config::{Config, Language, LanguageSetting};
pub use daemon::Daemon;
pub use db::{DbConn, DbPool, Fact, MemoryRepo};
pub use error::{Error, Result};
pub use gate::{ConversationGate, Directive, GateState};
pub use hud::{Hud, LogHud};
pub use listen::Listener;
pub use normalize::normalize;
pub use remind::{ReminderScheduler, ReminderSkill};
pub use resolve::{CommandResolver, Mode, Resolution};
pub use skills::{Skill, SkillRegistry};
pub use voice::{CaptureOpts, CaptureOutcome, SpeechSink, Transcriber, WakePhrase, WakeTrigger};
