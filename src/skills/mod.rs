//! Pluggable skill system
//!
//! A skill claims and answers a subset of commands before the AI fallback
//! is consulted. Built-in skills are registered statically; additional
//! pattern-reply skills are discovered from `skill.toml` manifests on disk.
//!
//! Dispatch is first-match-wins in registration order, and a misbehaving
//! skill can never take down the loop: a handler error is logged and
//! treated as "no result".

pub mod builtin;
pub mod manifest;

use std::path::PathBuf;

pub use builtin::{ClockSkill, GamingSetupSkill, LanguageSkill};
pub use manifest::{ManifestSkill, SkillManifest};

use crate::Result;

/// A pluggable command handler
///
/// `handle` returns `Ok(Some(reply))` to claim the command, `Ok(None)` to
/// pass, and `Err` on internal failure (which the registry absorbs).
pub trait Skill: Send + Sync {
    /// Unique skill name
    fn name(&self) -> &str;

    /// Attempt to handle a normalized command
    ///
    /// # Errors
    ///
    /// Returns error on internal failure; the registry logs it and moves on
    fn handle(&self, command: &str) -> Result<Option<String>>;
}

/// Registry of skills, dispatched in registration order
pub struct SkillRegistry {
    skills: Vec<Box<dyn Skill>>,
    manifest_dirs: Vec<PathBuf>,
    loaded: bool,
}

impl SkillRegistry {
    /// Create an empty registry that will scan the given manifest
    /// directories on first load
    #[must_use]
    pub fn new(manifest_dirs: Vec<PathBuf>) -> Self {
        Self {
            skills: Vec::new(),
            manifest_dirs,
            loaded: false,
        }
    }

    /// Register a skill ahead of manifest discovery
    ///
    /// Built-ins registered before [`load`](Self::load) keep their
    /// insertion position at the front of the dispatch order.
    pub fn register(&mut self, skill: Box<dyn Skill>) {
        tracing::debug!(skill = skill.name(), "skill registered");
        self.skills.push(skill);
    }

    /// Discover manifest skills; idempotent
    ///
    /// The first call scans every configured directory in deterministic
    /// (sorted) order and appends discovered skills after the built-ins.
    /// Subsequent calls are no-ops.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        let discovered = manifest::discover(&self.manifest_dirs);
        let count = discovered.len();
        for skill in discovered {
            self.skills.push(Box::new(skill));
        }

        tracing::info!(
            builtin = self.skills.len() - count,
            discovered = count,
            "skills loaded"
        );
    }

    /// Whether [`load`](Self::load) has run
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Names of all registered skills, in dispatch order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name()).collect()
    }

    /// Dispatch a command to the first skill that claims it
    ///
    /// Triggers [`load`](Self::load) if it has not run yet. A handler error
    /// is logged and treated as no-result; dispatch continues to the next
    /// handler.
    pub fn dispatch(&mut self, command: &str) -> Option<String> {
        self.load();

        for skill in &self.skills {
            match skill.handle(command) {
                Ok(Some(reply)) if !reply.is_empty() => {
                    tracing::debug!(skill = skill.name(), command, "skill claimed command");
                    return Some(reply);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(skill = skill.name(), error = %e, "skill handler failed");
                }
            }
        }

        None
    }
}
