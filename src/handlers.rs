use crate::board::{VoteBoard, VoteOutcome};
use crate::catalog::{anime_catalog, is_known_anime};
use crate::errors::AppError;
use crate::events::BoardEvent;
use crate::models::{
    AnimeWithVotes, Command, CompleteTaskRequest, CompleteTaskResponse, IndexQuery, StateResponse,
    TaskForm, VoteRequest, VoteResponse,
};
use crate::state::AppState;
use crate::ui::{NOTICE_LIMIT, NOTICE_VOTED, render_index};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::HeaderValue,
    response::{
        Html, Redirect,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let board = state.snapshot().await;
    Html(render_index(&anime_catalog(), &board, query.notice.as_deref()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<StateResponse> {
    let board = state.snapshot().await;
    Json(to_state_response(board))
}

pub async fn get_anime(State(state): State<AppState>) -> Json<Vec<AnimeWithVotes>> {
    let board = state.snapshot().await;
    let entries = anime_catalog()
        .into_iter()
        .map(|anime| AnimeWithVotes {
            votes: board.votes_for(&anime.id),
            id: anime.id,
            title: anime.title,
            img: anime.image_url,
        })
        .collect();
    Json(entries)
}

pub async fn vote(
    State(state): State<AppState>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, AppError> {
    let (outcome, board) = apply_vote(&state, &payload.anime_id).await?;
    Ok(Json(VoteResponse {
        accepted: outcome.accepted(),
        message: outcome.message().to_string(),
        can_vote: board.can_vote(),
        votes: board.votes,
        user: board.user,
    }))
}

pub async fn vote_form(
    State(state): State<AppState>,
    Path(anime_id): Path<String>,
) -> Result<Redirect, AppError> {
    let (outcome, _) = apply_vote(&state, &anime_id).await?;
    let notice = if outcome.accepted() { NOTICE_VOTED } else { NOTICE_LIMIT };
    Ok(Redirect::to(&format!("/?notice={notice}")))
}

pub async fn complete_task(
    State(state): State<AppState>,
    Json(payload): Json<CompleteTaskRequest>,
) -> Result<Json<CompleteTaskResponse>, AppError> {
    let (outcome, board) = state.complete_task(payload.id, &payload.url).await?;
    Ok(Json(CompleteTaskResponse {
        command: outcome.command,
        task_found: outcome.task_found,
        can_vote: board.can_vote(),
        tasks: board.tasks,
        user: board.user,
    }))
}

/// Form fallback, submitted into a new tab: the tab lands on the stored
/// url of the task, never on one taken from the request.
pub async fn complete_task_form(
    State(state): State<AppState>,
    Form(payload): Form<TaskForm>,
) -> Result<Redirect, AppError> {
    let board = state.snapshot().await;
    let Some(task) = board.tasks.iter().find(|task| task.id == payload.id) else {
        return Err(AppError::bad_request(format!("no task with id {}", payload.id)));
    };
    if HeaderValue::try_from(task.url.as_str()).is_err() {
        return Err(AppError::bad_request(format!("task {} has an unusable url", task.id)));
    }

    let (outcome, _) = state.complete_task(task.id, &task.url).await?;
    let Command::OpenUrl(url) = outcome.command;
    Ok(Redirect::to(&url))
}

pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.subscribe();
    info!("board event subscriber connected");

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(sse) = to_sse_event(&event) {
                        yield Ok(sse);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "board event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn apply_vote(
    state: &AppState,
    anime_id: &str,
) -> Result<(VoteOutcome, VoteBoard), AppError> {
    let anime_id = anime_id.trim();
    if anime_id.is_empty() {
        return Err(AppError::bad_request("anime_id must not be empty"));
    }
    if !is_known_anime(anime_id) {
        warn!(anime_id, "vote for id outside the catalog");
    }
    Ok(state.cast_vote(anime_id).await?)
}

fn to_sse_event(event: &BoardEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(err) => {
            warn!("failed to encode board event: {err}");
            None
        }
    }
}

fn to_state_response(board: VoteBoard) -> StateResponse {
    StateResponse {
        can_vote: board.can_vote(),
        votes: board.votes,
        user: board.user,
        tasks: board.tasks,
    }
}
