//! Action-selection policies.
//!
//! Everything that picks a move, from the rollout policy inside a search to
//! the players seated in the arena, implements [`Policy`]. Policies are
//! boxed as trait objects by the arena so match-ups can mix variants freely.

use rand::Rng;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::search::Mcts;
use crate::{GameRng, Simulator};

/// The capability of choosing one action among the legal ones.
pub trait Policy<S: Simulator>: Send {
    /// Display name used in reports.
    fn name(&self) -> &str;

    /// Picks one of `legal_actions` for the active player of `state`.
    fn choose_action(
        &mut self,
        state: &S,
        legal_actions: &[S::Action],
        rng: &mut GameRng,
    ) -> Result<S::Action, SearchError>;
}

/// Picks uniformly at random among the legal actions.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPolicy;

impl<S: Simulator> Policy<S> for RandomPolicy {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_action(
        &mut self,
        state: &S,
        legal_actions: &[S::Action],
        rng: &mut GameRng,
    ) -> Result<S::Action, SearchError> {
        if legal_actions.is_empty() {
            return Err(SearchError::EmptyActionSet {
                player: state.active_player(),
            });
        }
        Ok(legal_actions[rng.random_range(0..legal_actions.len())].clone())
    }
}

/// Plays every decision with a fresh UCT search.
#[derive(Debug)]
pub struct MctsAgent<S: Simulator> {
    search: Mcts<S>,
}

impl<S: Simulator> MctsAgent<S> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            search: Mcts::new(config),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        self.search.config()
    }
}

impl<S: Simulator> Policy<S> for MctsAgent<S> {
    fn name(&self) -> &str {
        "MCTS"
    }

    fn choose_action(
        &mut self,
        state: &S,
        legal_actions: &[S::Action],
        rng: &mut GameRng,
    ) -> Result<S::Action, SearchError> {
        self.search
            .request_action(state, state.active_player(), legal_actions, rng)
    }
}
