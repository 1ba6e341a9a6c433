//! Scheduled reminders
//!
//! A reminder is a message delivered back to the daemon after a delay and
//! spoken as "Reminder, sir: {msg}". The scheduler only owns timers and a
//! channel; speaking stays with the dispatcher, like every other reply.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::skills::Skill;
use crate::Result;

/// Hands reminder messages back to the daemon when their timers fire
///
/// Must be used inside a tokio runtime; each reminder is one spawned
/// sleep task.
#[derive(Clone)]
pub struct ReminderScheduler {
    due: mpsc::UnboundedSender<String>,
}

impl ReminderScheduler {
    /// Create a scheduler delivering due reminders on the given channel
    #[must_use]
    pub fn new(due: mpsc::UnboundedSender<String>) -> Self {
        Self { due }
    }

    /// Deliver `message` on the due channel after `delay`
    pub fn schedule(&self, message: String, delay: Duration) {
        tracing::info!(message = %message, delay_secs = delay.as_secs(), "reminder scheduled");

        let due = self.due.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if due.send(message).is_err() {
                tracing::debug!("reminder fired after shutdown");
            }
        });
    }
}

/// Claims `remind me to <message> in <n> <seconds|minutes|hours>`
pub struct ReminderSkill {
    scheduler: ReminderScheduler,
}

impl ReminderSkill {
    /// Create a reminder skill over a scheduler
    #[must_use]
    pub fn new(scheduler: ReminderScheduler) -> Self {
        Self { scheduler }
    }
}

impl Skill for ReminderSkill {
    fn name(&self) -> &str {
        "reminder"
    }

    fn handle(&self, command: &str) -> Result<Option<String>> {
        let Some((message, delay)) = parse_reminder(command) else {
            return Ok(None);
        };

        self.scheduler.schedule(message, delay);
        Ok(Some("Reminder set, sir.".to_string()))
    }
}

/// Parse a reminder command into its message and delay
///
/// The last " in " splits message from delay, so messages containing "in"
/// ("check in with mom in 5 minutes") parse correctly.
fn parse_reminder(command: &str) -> Option<(String, Duration)> {
    let payload = command.strip_prefix("remind me to ")?;
    let (message, tail) = payload.rsplit_once(" in ")?;

    let (amount, unit) = tail.trim().split_once(' ')?;
    let amount: u64 = amount.parse().ok()?;
    let seconds = match unit.trim().trim_end_matches('s') {
        "second" => amount,
        "minute" => amount * 60,
        "hour" => amount * 3600,
        _ => return None,
    };

    let message = message.trim();
    if message.is_empty() {
        return None;
    }

    Some((message.to_string(), Duration::from_secs(seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units_and_amounts() {
        assert_eq!(
            parse_reminder("remind me to stretch in 45 seconds"),
            Some(("stretch".to_string(), Duration::from_secs(45)))
        );
        assert_eq!(
            parse_reminder("remind me to check the oven in 10 minutes"),
            Some(("check the oven".to_string(), Duration::from_secs(600)))
        );
        assert_eq!(
            parse_reminder("remind me to call mom in 2 hours"),
            Some(("call mom".to_string(), Duration::from_secs(7200)))
        );
    }

    #[test]
    fn splits_on_the_last_in() {
        assert_eq!(
            parse_reminder("remind me to check in with mom in 5 minutes"),
            Some(("check in with mom".to_string(), Duration::from_secs(300)))
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(parse_reminder("remind me to stretch"), None);
        assert_eq!(parse_reminder("remind me to in 5 minutes"), None);
        assert_eq!(parse_reminder("remind me to nap in five minutes"), None);
        assert_eq!(parse_reminder("remind me to nap in 5 fortnights"), None);
        assert_eq!(parse_reminder("what time is it"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_reminder_is_delivered_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = ReminderScheduler::new(tx);

        scheduler.schedule("check the oven".to_string(), Duration::from_secs(600));

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg, "check the oven");
    }

    #[tokio::test(start_paused = true)]
    async fn skill_claims_and_schedules() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let skill = ReminderSkill::new(ReminderScheduler::new(tx));

        let reply = skill.handle("remind me to stretch in 1 minute").unwrap();
        assert_eq!(reply.as_deref(), Some("Reminder set, sir."));
        assert_eq!(rx.recv().await.as_deref(), Some("stretch"));

        assert_eq!(skill.handle("combat mode").unwrap(), None);
    }
}
