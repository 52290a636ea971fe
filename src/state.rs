use crate::board::{TaskOutcome, VoteBoard, VoteOutcome};
use crate::errors::StoreError;
use crate::events::{BoardEvent, EventBus};
use crate::storage::LocalStorage;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::{info, warn};

/// Board plus the storage it writes back to, guarded together so a
/// mutation and its persistence are never interleaved with another request.
#[derive(Debug)]
pub struct Session {
    pub board: VoteBoard,
    pub storage: LocalStorage,
}

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub events: EventBus,
}

impl AppState {
    pub fn new(storage: LocalStorage) -> Self {
        let board = VoteBoard::load(&storage);
        Self {
            session: Arc::new(Mutex::new(Session { board, storage })),
            events: EventBus::default(),
        }
    }

    /// Writes every record back, replacing anything missing or unreadable
    /// with the value the board fell back to.
    pub async fn persist_all(&self) -> Result<(), StoreError> {
        let mut session = self.session.lock().await;
        let Session { board, storage } = &mut *session;
        board.save_all(storage).await
    }

    pub async fn snapshot(&self) -> VoteBoard {
        self.session.lock().await.board.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Returns the outcome with the board as it stood after the vote.
    pub async fn cast_vote(&self, anime_id: &str) -> Result<(VoteOutcome, VoteBoard), StoreError> {
        let mut session = self.session.lock().await;
        let Session { board, storage } = &mut *session;

        let outcome = board.cast_vote(anime_id);
        for record in outcome.changed() {
            board.save(storage, *record).await?;
        }

        match &outcome {
            VoteOutcome::Recorded { total, .. } => {
                info!(anime_id, total, votes_cast = board.user.votes_cast, "vote recorded")
            }
            VoteOutcome::Rejected { .. } => {
                warn!(anime_id, votes_cast = board.user.votes_cast, "vote rejected by limit")
            }
        }

        self.events.emit(BoardEvent::from_vote(&outcome, &board.user));
        Ok((outcome, board.clone()))
    }

    pub async fn complete_task(
        &self,
        id: u32,
        url: &str,
    ) -> Result<(TaskOutcome, VoteBoard), StoreError> {
        let mut session = self.session.lock().await;
        let Session { board, storage } = &mut *session;

        let outcome = board.complete_task(id, url);
        for record in outcome.changed() {
            board.save(storage, *record).await?;
        }

        if outcome.task_found {
            info!(task_id = id, tasks_completed = board.user.tasks_completed, "task completed");
        } else {
            warn!(task_id = id, tasks_completed = board.user.tasks_completed, "completed unknown task id");
        }

        self.events.emit(BoardEvent::from_task(&outcome, &board.user));
        Ok((outcome, board.clone()))
    }
}
