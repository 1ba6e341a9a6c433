//! Layered command resolution
//!
//! A normalized command walks a strictly ordered chain and stops at the
//! first stage that produces a result: exact mode keywords, memory write,
//! memory read, memory forget, skill dispatch, AI fallback. The final
//! stage always answers, so no command is ever left unhandled.

use std::fmt;
use std::sync::Arc;

use crate::ai::CompletionBackend;
use crate::db::MemoryRepo;
use crate::hud::Hud;
use crate::skills::SkillRegistry;

/// Display/behavior mode driven by mode keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Default presentation
    #[default]
    Normal,
    /// Combat presentation
    Combat,
    /// Gaming presentation
    Gaming,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Combat => "combat",
            Self::Gaming => "gaming",
        };
        f.write_str(name)
    }
}

/// What the resolver decided for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Text to speak
    pub reply: String,
    /// Mode change side effect, if any
    pub mode: Option<Mode>,
}

impl Resolution {
    fn spoken(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            mode: None,
        }
    }

    fn mode_change(reply: impl Into<String>, mode: Mode) -> Self {
        Self {
            reply: reply.into(),
            mode: Some(mode),
        }
    }
}

/// The layered decision pipeline
///
/// Owns the skill registry outright; memory writes happen only through the
/// recognized `remember`/`forget` command shapes.
pub struct CommandResolver {
    memory: MemoryRepo,
    skills: SkillRegistry,
    ai: Arc<dyn CompletionBackend>,
    hud: Arc<dyn Hud>,
}

impl CommandResolver {
    /// Create a resolver over its four collaborators
    #[must_use]
    pub fn new(
        memory: MemoryRepo,
        skills: SkillRegistry,
        ai: Arc<dyn CompletionBackend>,
        hud: Arc<dyn Hud>,
    ) -> Self {
        Self {
            memory,
            skills,
            ai,
            hud,
        }
    }

    /// Resolve an already-normalized command into a reply and side effects
    ///
    /// Callers must not pass an empty command; normalization guarantees
    /// droppable input is dropped upstream.
    pub async fn resolve(&mut self, command: &str) -> Resolution {
        tracing::info!(command, "resolving command");

        if let Some(resolution) = self.try_modes(command) {
            self.apply(&resolution);
            return resolution;
        }

        if let Some(resolution) = self.try_remember(command) {
            self.apply(&resolution);
            return resolution;
        }

        if let Some(resolution) = self.try_recall(command) {
            self.apply(&resolution);
            return resolution;
        }

        if let Some(resolution) = self.try_forget(command) {
            self.apply(&resolution);
            return resolution;
        }

        if let Some(reply) = self.skills.dispatch(command) {
            let resolution = Resolution::spoken(reply);
            self.apply(&resolution);
            return resolution;
        }

        // Terminal stage: the fallback always answers
        let resolution = Resolution::spoken(self.ai.complete(command).await);
        self.apply(&resolution);
        resolution
    }

    /// Stage 1: exact mode keywords
    fn try_modes(&mut self, command: &str) -> Option<Resolution> {
        match command {
            "combat mode" => Some(Resolution::mode_change(
                "Combat mode engaged, sir.",
                Mode::Combat,
            )),
            "gaming mode" => {
                // Forward for gaming-specific side effects; the fixed
                // acknowledgment is spoken regardless of the outcome.
                if let Some(result) = self.skills.dispatch(command) {
                    tracing::debug!(result = %result, "gaming mode dispatch");
                }
                Some(Resolution::mode_change(
                    "Gaming mode activated, sir.",
                    Mode::Gaming,
                ))
            }
            "normal mode" => Some(Resolution::mode_change(
                "Normal mode restored, sir.",
                Mode::Normal,
            )),
            _ => None,
        }
    }

    /// Stage 2: memory write (`remember <key> is|to <value>`)
    ///
    /// A remember command with no recognizable separator never falls
    /// through to later stages; it gets a clarification prompt instead.
    fn try_remember(&self, command: &str) -> Option<Resolution> {
        let payload = command.strip_prefix("remember ")?.trim();

        let Some((key, value)) = payload
            .split_once(" is ")
            .or_else(|| payload.split_once(" to "))
        else {
            return Some(Resolution::spoken("Please tell me what to remember, sir."));
        };
        let (key, value) = (key.trim(), value.trim());

        if key.is_empty() || value.is_empty() {
            return Some(Resolution::spoken("Please tell me what to remember, sir."));
        }

        match self.memory.remember(key, value) {
            Ok(()) => Some(Resolution::spoken(format!("I will remember {key}, sir."))),
            Err(e) => {
                tracing::error!(error = %e, "failed to store fact");
                Some(Resolution::spoken("I could not store that, sir."))
            }
        }
    }

    /// Stage 3: memory read (`what is <key>` / `who is <key>`)
    ///
    /// A miss does not short-circuit: an unknown fact falls through to the
    /// skill and AI stages, which can still answer it generally.
    fn try_recall(&self, command: &str) -> Option<Resolution> {
        let key = command
            .strip_prefix("what is ")
            .or_else(|| command.strip_prefix("who is "))?
            .trim();

        match self.memory.recall(key) {
            Ok(Some(value)) => Some(Resolution::spoken(format!("{key} is {value}, sir."))),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "fact lookup failed");
                None
            }
        }
    }

    /// Stage 4: memory forget (`forget <key>`) — terminal either way
    fn try_forget(&self, command: &str) -> Option<Resolution> {
        let key = command.strip_prefix("forget ")?.trim();

        let removed = match self.memory.forget(key) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::error!(error = %e, "fact removal failed");
                false
            }
        };

        let reply = if removed {
            format!("I have forgotten {key}, sir.")
        } else {
            format!("I have no memory of {key}, sir.")
        };
        Some(Resolution::spoken(reply))
    }

    /// Push side effects to the HUD collaborator
    fn apply(&self, resolution: &Resolution) {
        if let Some(mode) = resolution.mode {
            self.hud.set_mode(mode);
        }
        self.hud.log(&format!("[CMD] {}", resolution.reply));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::hud::LogHud;
    use crate::skills::Skill;
    use async_trait::async_trait;

    struct StubAi;

    #[async_trait]
    impl CompletionBackend for StubAi {
        async fn complete(&self, prompt: &str) -> String {
            format!("ai:{prompt}")
        }
    }

    struct EchoSkill(&'static str);

    impl Skill for EchoSkill {
        fn name(&self) -> &str {
            "echo"
        }

        fn handle(&self, command: &str) -> crate::Result<Option<String>> {
            if command.starts_with(self.0) {
                Ok(Some(format!("skill:{command}")))
            } else {
                Ok(None)
            }
        }
    }

    fn resolver_with(skills: SkillRegistry) -> (CommandResolver, Arc<LogHud>, MemoryRepo) {
        let memory = MemoryRepo::new(db::init_memory().unwrap());
        let hud = Arc::new(LogHud::new());
        let resolver = CommandResolver::new(memory.clone(), skills, Arc::new(StubAi), hud.clone());
        (resolver, hud, memory)
    }

    fn resolver() -> (CommandResolver, Arc<LogHud>, MemoryRepo) {
        resolver_with(SkillRegistry::new(Vec::new()))
    }

    #[tokio::test]
    async fn combat_mode_sets_mode_and_acks() {
        let (mut resolver, hud, _) = resolver();
        let resolution = resolver.resolve("combat mode").await;

        assert_eq!(resolution.reply, "Combat mode engaged, sir.");
        assert_eq!(resolution.mode, Some(Mode::Combat));
        assert_eq!(hud.mode(), Mode::Combat);
    }

    #[tokio::test]
    async fn gaming_mode_acks_even_when_no_skill_claims_it() {
        let (mut resolver, hud, _) = resolver();
        let resolution = resolver.resolve("gaming mode").await;

        assert_eq!(resolution.reply, "Gaming mode activated, sir.");
        assert_eq!(hud.mode(), Mode::Gaming);
    }

    #[tokio::test]
    async fn remember_with_is_separator_stores_fact() {
        let (mut resolver, _, memory) = resolver();
        let resolution = resolver.resolve("remember my pin is 4321").await;

        assert_eq!(resolution.reply, "I will remember my pin, sir.");
        assert_eq!(memory.recall("my pin").unwrap().as_deref(), Some("4321"));
    }

    #[tokio::test]
    async fn remember_with_to_separator_stores_fact() {
        let (mut resolver, _, memory) = resolver();
        resolver.resolve("remember call mom to friday evening").await;

        assert_eq!(
            memory.recall("call mom").unwrap().as_deref(),
            Some("friday evening")
        );
    }

    #[tokio::test]
    async fn remember_splits_on_first_is_occurrence() {
        let (mut resolver, _, memory) = resolver();
        resolver
            .resolve("remember the wifi is whatever it is today")
            .await;

        assert_eq!(
            memory.recall("the wifi").unwrap().as_deref(),
            Some("whatever it is today")
        );
    }

    #[tokio::test]
    async fn remember_without_separator_asks_for_clarification() {
        let (mut resolver, _, memory) = resolver();
        let resolution = resolver.resolve("remember everything").await;

        assert_eq!(resolution.reply, "Please tell me what to remember, sir.");
        assert!(memory.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn what_is_hit_answers_from_memory() {
        let (mut resolver, _, memory) = resolver();
        memory.remember("my pin", "4321").unwrap();

        let resolution = resolver.resolve("what is my pin").await;
        assert_eq!(resolution.reply, "my pin is 4321, sir.");
    }

    #[tokio::test]
    async fn what_is_miss_falls_through_to_ai() {
        let (mut resolver, _, _) = resolver();
        let resolution = resolver.resolve("what is the capital of france").await;

        assert_eq!(resolution.reply, "ai:what is the capital of france");
    }

    #[tokio::test]
    async fn what_is_miss_falls_through_to_skills_before_ai() {
        let mut skills = SkillRegistry::new(Vec::new());
        skills.register(Box::new(EchoSkill("what is")));
        let (mut resolver, _, _) = resolver_with(skills);

        let resolution = resolver.resolve("what is the weather").await;
        assert_eq!(resolution.reply, "skill:what is the weather");
    }

    #[tokio::test]
    async fn forget_is_terminal_on_hit_and_miss() {
        let (mut resolver, _, memory) = resolver();
        memory.remember("my pin", "4321").unwrap();

        let hit = resolver.resolve("forget my pin").await;
        assert_eq!(hit.reply, "I have forgotten my pin, sir.");

        let miss = resolver.resolve("forget my pin").await;
        assert_eq!(miss.reply, "I have no memory of my pin, sir.");
    }

    #[tokio::test]
    async fn skill_result_short_circuits_ai() {
        let mut skills = SkillRegistry::new(Vec::new());
        skills.register(Box::new(EchoSkill("play")));
        let (mut resolver, _, _) = resolver_with(skills);

        let resolution = resolver.resolve("play some jazz").await;
        assert_eq!(resolution.reply, "skill:play some jazz");
    }

    #[tokio::test]
    async fn unclaimed_command_reaches_ai() {
        let (mut resolver, hud, _) = resolver();
        let resolution = resolver.resolve("tell me a story").await;

        assert_eq!(resolution.reply, "ai:tell me a story");
        assert_eq!(resolution.mode, None);
        assert_eq!(hud.mode(), Mode::Normal);
    }

    #[tokio::test]
    async fn remember_never_reaches_ai() {
        let (mut resolver, _, memory) = resolver();
        let resolution = resolver.resolve("remember my pin is 4321").await;

        assert!(!resolution.reply.starts_with("ai:"));
        assert_eq!(memory.recall("my pin").unwrap().as_deref(), Some("4321"));
    }
}
