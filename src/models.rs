use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anime id to cumulative vote count.
pub type VoteTally = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeEntry {
    pub id: String,
    pub title: String,
    #[serde(rename = "img")]
    pub image_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub votes_cast: u64,
    pub tasks_completed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub done: bool,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub anime_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    pub id: u32,
    pub url: String,
}

/// Fields posted by the task form. The url input is ignored here.
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub id: u32,
}

#[derive(Debug, Deserialize, Default)]
pub struct IndexQuery {
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub votes: VoteTally,
    pub user: UserRecord,
    pub tasks: Vec<Task>,
    pub can_vote: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnimeWithVotes {
    pub id: String,
    pub title: String,
    pub img: String,
    pub votes: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteResponse {
    pub accepted: bool,
    pub message: String,
    pub votes: VoteTally,
    pub user: UserRecord,
    pub can_vote: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteTaskResponse {
    pub command: Command,
    pub task_found: bool,
    pub tasks: Vec<Task>,
    pub user: UserRecord,
    pub can_vote: bool,
}

/// Side effect the page performs on behalf of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Open the url in a new browsing context without waiting on it.
    OpenUrl(String),
}
