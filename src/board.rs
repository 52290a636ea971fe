use crate::catalog::{TASKS_KEY, USER_KEY, VOTES_KEY, default_tasks};
use crate::errors::StoreError;
use crate::gate;
use crate::models::{Command, Task, UserRecord, VoteTally};
use crate::storage::{self, LocalStorage};

pub const VOTE_RECORDED: &str = "Thanks \u{2014} your vote was recorded!";
pub const VOTE_LIMIT_REACHED: &str =
    "You reached your free voting limit. Complete tasks to unlock more votes.";

/// One of the three persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Votes,
    User,
    Tasks,
}

impl Record {
    pub fn key(self) -> &'static str {
        match self {
            Record::Votes => VOTES_KEY,
            Record::User => USER_KEY,
            Record::Tasks => TASKS_KEY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded { anime_id: String, total: u64 },
    Rejected { anime_id: String },
}

impl VoteOutcome {
    pub fn accepted(&self) -> bool {
        matches!(self, VoteOutcome::Recorded { .. })
    }

    pub fn message(&self) -> &'static str {
        match self {
            VoteOutcome::Recorded { .. } => VOTE_RECORDED,
            VoteOutcome::Rejected { .. } => VOTE_LIMIT_REACHED,
        }
    }

    /// Records touched, in the order they must be written back.
    pub fn changed(&self) -> &'static [Record] {
        match self {
            VoteOutcome::Recorded { .. } => &[Record::Votes, Record::User],
            VoteOutcome::Rejected { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub task_id: u32,
    pub task_found: bool,
    pub command: Command,
}

impl TaskOutcome {
    pub fn changed(&self) -> &'static [Record] {
        &[Record::Tasks, Record::User]
    }
}

/// In-memory copy of everything the widget persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteBoard {
    pub votes: VoteTally,
    pub user: UserRecord,
    pub tasks: Vec<Task>,
}

impl Default for VoteBoard {
    fn default() -> Self {
        Self {
            votes: VoteTally::new(),
            user: UserRecord::default(),
            tasks: default_tasks(),
        }
    }
}

impl VoteBoard {
    pub fn load(storage: &LocalStorage) -> Self {
        let defaults = Self::default();
        Self {
            votes: storage::load(storage, VOTES_KEY, defaults.votes),
            user: storage::load(storage, USER_KEY, defaults.user),
            tasks: storage::load(storage, TASKS_KEY, defaults.tasks),
        }
    }

    pub async fn save(&self, storage: &mut LocalStorage, record: Record) -> Result<(), StoreError> {
        match record {
            Record::Votes => storage::save(storage, record.key(), &self.votes).await,
            Record::User => storage::save(storage, record.key(), &self.user).await,
            Record::Tasks => storage::save(storage, record.key(), &self.tasks).await,
        }
    }

    pub async fn save_all(&self, storage: &mut LocalStorage) -> Result<(), StoreError> {
        for record in [Record::Votes, Record::User, Record::Tasks] {
            self.save(storage, record).await?;
        }
        Ok(())
    }

    pub fn can_vote(&self) -> bool {
        gate::can_vote(&self.user)
    }

    pub fn votes_for(&self, anime_id: &str) -> u64 {
        self.votes.get(anime_id).copied().unwrap_or(0)
    }

    /// Adds one vote for `anime_id` when the gate is open. A rejected vote
    /// leaves the board untouched.
    pub fn cast_vote(&mut self, anime_id: &str) -> VoteOutcome {
        if !self.can_vote() {
            return VoteOutcome::Rejected {
                anime_id: anime_id.to_string(),
            };
        }

        let total = {
            let entry = self.votes.entry(anime_id.to_string()).or_insert(0);
            *entry = entry.saturating_add(1);
            *entry
        };
        self.user.votes_cast = self.user.votes_cast.saturating_add(1);

        VoteOutcome::Recorded {
            anime_id: anime_id.to_string(),
            total,
        }
    }

    /// Marks the task done and counts a completion. The counter moves on
    /// every call, including unknown ids and tasks already done.
    pub fn complete_task(&mut self, id: u32, url: &str) -> TaskOutcome {
        let task = self.tasks.iter_mut().find(|task| task.id == id);
        let task_found = task.is_some();
        if let Some(task) = task {
            task.done = true;
        }
        self.user.tasks_completed = self.user.tasks_completed.saturating_add(1);

        TaskOutcome {
            task_id: id,
            task_found,
            command: Command::OpenUrl(url.to_string()),
        }
    }
}
