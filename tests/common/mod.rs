//! Shared test utilities

use std::sync::Arc;

use async_trait::async_trait;

use valet::{
    CommandResolver, CompletionBackend, DbPool, LogHud, MemoryRepo, SkillRegistry, db,
};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// AI fallback stub returning a fixed reply
pub struct CannedAi(pub &'static str);

#[async_trait]
impl CompletionBackend for CannedAi {
    async fn complete(&self, _prompt: &str) -> String {
        self.0.to_string()
    }
}

/// Build a resolver over an in-memory database and a canned AI reply
#[must_use]
pub fn test_resolver(db: &DbPool, hud: Arc<LogHud>, ai_reply: &'static str) -> CommandResolver {
    test_resolver_with_skills(db, hud, ai_reply, SkillRegistry::new(Vec::new()))
}

/// Same, but with a caller-provided skill registry
#[must_use]
pub fn test_resolver_with_skills(
    db: &DbPool,
    hud: Arc<LogHud>,
    ai_reply: &'static str,
    skills: SkillRegistry,
) -> CommandResolver {
    CommandResolver::new(
        MemoryRepo::new(db.clone()),
        skills,
        Arc::new(CannedAi(ai_reply)),
        hud,
    )
}
