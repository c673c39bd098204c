//! # Card-game MCTS Agent
//!
//! A Monte Carlo Tree Search agent for turn-based, stochastic two-player card
//! games, together with an arena that plays many independent games in parallel
//! to evaluate agents against each other.
//!
//! The game rules live behind the [`Simulator`] trait. The engine only clones
//! states, enumerates legal actions, applies them and asks whether the game is
//! decided.
//!
//! ## Modules
//! - [`tree`]: arena-allocated search tree and the UCB1 tree policy
//! - [`search`]: the per-decision UCT loop and random rollouts
//! - [`policy`]: the "choose an action" capability and its variants
//! - [`arena`]: the parallel evaluation harness
//! - [`stats`]: per-player statistics merged by the harness
//! - [`games`]: a small card game used by the binaries and tests

use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;

pub mod arena;
pub mod config;
pub mod error;
pub mod games;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

pub use arena::{Arena, ArenaConfig, ArenaReport, GameSetup};
pub use config::SearchConfig;
pub use error::{HarnessError, SearchError};
pub use policy::{MctsAgent, Policy, RandomPolicy};
pub use search::{ChildStats, Mcts, SearchResult};
pub use stats::{MetaStatistics, PlayerStats, SimulationResult};
pub use tree::{Node, NodeId, SearchTree};

/// Seat index of a player. Two-player games use `0` and `1`.
pub type PlayerId = usize;

/// The pseudo-random generator threaded through searches, rollouts and the
/// simulator itself. Seed it with `SeedableRng::seed_from_u64` for
/// reproducible runs.
pub type GameRng = Xoshiro256PlusPlus;

/// The state of a game as seen by the search engine.
///
/// Cloning must produce a fully independent state: nothing applied to a clone
/// may be observable through the original. `Send` is required because every
/// arena worker owns its own states.
pub trait Simulator: Clone + Send + fmt::Display {
    /// A single legal move. Compared by value, never by position in a list,
    /// since regenerating actions on a clone may reorder them.
    type Action: Clone + PartialEq + fmt::Debug + Send;
    /// Raised when an action is not legal in the current state.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns all actions available to the active player. May be empty only
    /// once the game is decided.
    fn legal_actions(&self) -> Vec<Self::Action>;
    /// Applies `action` for the active player.
    ///
    /// Returns `Ok(true)` while the acting player's turn continues and
    /// `Ok(false)` once the turn has ended.
    fn apply_action(&mut self, action: &Self::Action, rng: &mut GameRng) -> Result<bool, Self::Error>;
    /// Starts the next player's turn. Must be called after a turn ended on an
    /// undecided game; the simulator never advances on its own.
    fn advance_turn(&mut self, rng: &mut GameRng);
    /// Returns true once the game has an outcome.
    fn is_decided(&self) -> bool;
    /// Returns the winner of a decided game, `None` for a draw or an
    /// undecided game.
    fn winner(&self) -> Option<PlayerId>;
    /// Returns the player whose turn it is.
    fn active_player(&self) -> PlayerId;
}

/// Final result of a decided game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(PlayerId),
    Draw,
}

impl Outcome {
    /// Reads the outcome of a decided state.
    pub fn of<S: Simulator>(state: &S) -> Self {
        match state.winner() {
            Some(player) => Outcome::Winner(player),
            None => Outcome::Draw,
        }
    }

    /// Reward credited to `player`: 1 for a win, 0 for a loss and
    /// `draw_reward` for a draw.
    pub fn reward_for(self, player: PlayerId, draw_reward: f64) -> f64 {
        match self {
            Outcome::Winner(winner) if winner == player => 1.0,
            Outcome::Winner(_) => 0.0,
            Outcome::Draw => draw_reward,
        }
    }
}

/// Applies `action` and starts the next turn if it ended the current one on
/// an undecided game.
///
/// Returns whether the acting player's turn continues.
pub fn play_action<S: Simulator>(
    state: &mut S,
    action: &S::Action,
    rng: &mut GameRng,
) -> Result<bool, SearchError> {
    let continues = state
        .apply_action(action, rng)
        .map_err(|source| SearchError::illegal_action(action, &*state, source))?;
    if !continues && !state.is_decided() {
        state.advance_turn(rng);
    }
    Ok(continues)
}
