//! Error types for searches and arena runs.

use crate::PlayerId;
use std::any::Any;
use std::fmt;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while choosing an action.
///
/// None of these are retried: each one means the tree and the simulator
/// disagree, or the caller broke a precondition.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("simulator rejected action {action} in state:\n{state}")]
    IllegalAction {
        action: String,
        state: String,
        #[source]
        source: BoxError,
    },

    #[error("action {action} is not an untried action of this node")]
    UnknownAction { action: String },

    #[error("no legal actions for active player {player} in an undecided game")]
    EmptyActionSet { player: PlayerId },
}

impl SearchError {
    pub(crate) fn illegal_action<A, S, E>(action: &A, state: &S, source: E) -> Self
    where
        A: fmt::Debug,
        S: fmt::Display + ?Sized,
        E: std::error::Error + Send + Sync + 'static,
    {
        SearchError::IllegalAction {
            action: format!("{action:?}"),
            state: state.to_string(),
            source: Box::new(source),
        }
    }
}

/// Errors that abort a whole arena run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("game {game} failed")]
    Worker {
        game: usize,
        #[source]
        source: SearchError,
    },

    #[error("game {game} panicked: {message}")]
    WorkerPanic { game: usize, message: String },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl HarnessError {
    /// Wraps the payload of a panic caught while playing `game`.
    pub(crate) fn worker_panic(game: usize, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        HarnessError::WorkerPanic { game, message }
    }
}
