//! End-to-end dispatch pipeline tests
//!
//! Exercise the capture-to-reply path without audio hardware: raw
//! utterances go through wake-phrase stripping, normalization, and the
//! layered resolver over a real (in-memory) fact store.

use std::sync::Arc;

use valet::skills::SkillRegistry;
use valet::voice::WakePhrase;
use valet::{LogHud, Mode, ReminderScheduler, ReminderSkill, normalize};

mod common;

use common::{setup_test_db, test_resolver, test_resolver_with_skills};

#[tokio::test]
async fn remember_then_recall_round_trip() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());
    let mut resolver = test_resolver(&db, hud, "unused");

    let stored = resolver
        .resolve(&normalize("remember wifi password is sunshine123"))
        .await;
    assert!(stored.reply.contains("wifi password"));

    let recalled = resolver.resolve(&normalize("what is wifi password")).await;
    assert_eq!(recalled.reply, "wifi password is sunshine123, sir.");
}

#[tokio::test]
async fn truncated_mode_keyword_switches_mode() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());
    let mut resolver = test_resolver(&db, hud.clone(), "unused");

    // "combat mod" is a transcription artifact of "combat mode"
    let command = normalize("combat mod");
    assert_eq!(command, "combat mode");

    let resolution = resolver.resolve(&command).await;
    assert_eq!(resolution.mode, Some(Mode::Combat));
    assert_eq!(hud.mode(), Mode::Combat);

    resolver.resolve(&normalize("normal mode")).await;
    assert_eq!(hud.mode(), Mode::Normal);
}

#[tokio::test]
async fn unknown_fact_falls_through_to_ai() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());
    let mut resolver = test_resolver(&db, hud, "Paris, sir.");

    let resolution = resolver
        .resolve(&normalize("what is the capital of France"))
        .await;
    assert_eq!(resolution.reply, "Paris, sir.");
}

#[tokio::test]
async fn manifest_skill_answers_before_ai() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());

    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("garage");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(
        dir.join("skill.toml"),
        r#"
name = "garage"
description = "garage door control"

[[patterns]]
exact = "open the garage"
reply = "Opening the garage, sir."
"#,
    )
    .unwrap();

    let skills = SkillRegistry::new(vec![root.path().to_path_buf()]);
    let mut resolver = test_resolver_with_skills(&db, hud, "should not be asked", skills);

    let resolution = resolver.resolve(&normalize("open the garage")).await;
    assert_eq!(resolution.reply, "Opening the garage, sir.");
}

#[tokio::test(start_paused = true)]
async fn reminder_command_schedules_and_comes_due() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());

    let (due_tx, mut due_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut skills = SkillRegistry::new(Vec::new());
    skills.register(Box::new(ReminderSkill::new(ReminderScheduler::new(due_tx))));
    let mut resolver = test_resolver_with_skills(&db, hud, "should not be asked", skills);

    let resolution = resolver
        .resolve(&normalize("remind me to stretch in 10 minutes"))
        .await;
    assert_eq!(resolution.reply, "Reminder set, sir.");

    // Paused time fast-forwards through the timer
    assert_eq!(due_rx.recv().await.as_deref(), Some("stretch"));
}

#[tokio::test]
async fn forget_is_terminal_even_for_unknown_facts() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());
    let mut resolver = test_resolver(&db, hud, "should not be asked");

    let resolution = resolver.resolve(&normalize("forget my anniversary")).await;
    assert_eq!(resolution.reply, "I have no memory of my anniversary, sir.");
}

#[tokio::test]
async fn malformed_remember_asks_for_clarification() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());
    let mut resolver = test_resolver(&db, hud, "should not be asked");

    let resolution = resolver.resolve(&normalize("remember my keys")).await;
    assert_eq!(resolution.reply, "Please tell me what to remember, sir.");
}

#[tokio::test]
async fn full_utterance_from_wake_phrase_to_reply() {
    let db = setup_test_db();
    let hud = Arc::new(LogHud::new());
    let mut resolver = test_resolver(&db, hud, "unused");

    // What the transcriber would hand back for a spoken command
    let wake = WakePhrase::new("valet");
    let command = normalize(&wake.strip_leading("Valet, remember my pin is 4321"));

    let resolution = resolver.resolve(&command).await;
    assert!(resolution.reply.contains("my pin"));

    let recalled = resolver.resolve(&normalize("what is my pin")).await;
    assert_eq!(recalled.reply, "my pin is 4321, sir.");
}
