//! Change notifications published after each board mutation.

use crate::board::{TaskOutcome, VoteOutcome};
use crate::models::UserRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts lagging.
pub const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoardEvent {
    VoteCast {
        anime_id: String,
        total: u64,
        votes_cast: u64,
        timestamp: DateTime<Utc>,
    },

    /// Gate was closed; nothing changed.
    VoteRejected {
        anime_id: String,
        votes_cast: u64,
        timestamp: DateTime<Utc>,
    },

    TaskCompleted {
        task_id: u32,
        task_found: bool,
        tasks_completed: u64,
        timestamp: DateTime<Utc>,
    },
}

impl BoardEvent {
    pub fn from_vote(outcome: &VoteOutcome, user: &UserRecord) -> Self {
        let timestamp = Utc::now();
        match outcome {
            VoteOutcome::Recorded { anime_id, total } => BoardEvent::VoteCast {
                anime_id: anime_id.clone(),
                total: *total,
                votes_cast: user.votes_cast,
                timestamp,
            },
            VoteOutcome::Rejected { anime_id } => BoardEvent::VoteRejected {
                anime_id: anime_id.clone(),
                votes_cast: user.votes_cast,
                timestamp,
            },
        }
    }

    pub fn from_task(outcome: &TaskOutcome, user: &UserRecord) -> Self {
        BoardEvent::TaskCompleted {
            task_id: outcome.task_id,
            task_found: outcome.task_found,
            tasks_completed: user.tasks_completed,
            timestamp: Utc::now(),
        }
    }

    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            BoardEvent::VoteCast { .. } => "VoteCast",
            BoardEvent::VoteRejected { .. } => "VoteRejected",
            BoardEvent::TaskCompleted { .. } => "TaskCompleted",
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BoardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.tx.subscribe()
    }

    /// Returns how many subscribers received the event.
    pub fn emit(&self, event: BoardEvent) -> usize {
        // send only fails when nobody is listening
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Command;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = BoardEvent::from_task(
            &TaskOutcome {
                task_id: 1,
                task_found: true,
                command: Command::OpenUrl("https://example.com/offer1".to_string()),
            },
            &UserRecord {
                votes_cast: 2,
                tasks_completed: 1,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "TaskCompleted");
        assert_eq!(json["tasks_completed"], 1);
        assert_eq!(event.name(), "TaskCompleted");
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_dropped() {
        let bus = EventBus::default();
        let event = BoardEvent::from_vote(
            &VoteOutcome::Rejected {
                anime_id: "1".to_string(),
            },
            &UserRecord::default(),
        );
        assert_eq!(bus.emit(event.clone()), 0);

        let mut rx = bus.subscribe();
        assert_eq!(bus.emit(event.clone()), 1);
        assert_eq!(rx.recv().await.unwrap(), event);
    }
}
