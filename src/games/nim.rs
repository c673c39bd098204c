//! # Nim
//!
//! Players alternately take one to three stones from a single pile. Whoever
//! takes the last stone wins. Every move ends the turn.
//!
//! Nim has no hidden information and no chance, which makes it a convenient
//! fixture for checking what the search converges to: positions with a
//! multiple of four stones are lost for the player to move.

use crate::{GameRng, PlayerId, Simulator};
use std::fmt;
use thiserror::Error;

/// Maximum number of stones taken in one move.
pub const MAX_TAKE: u32 = 3;

/// Takes the given number of stones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Take(pub u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NimError {
    #[error("cannot take {requested} stones with {available} left")]
    InvalidTake { requested: u32, available: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nim {
    stones: u32,
    current_player: PlayerId,
    last_taker: Option<PlayerId>,
}

impl Nim {
    /// Creates a game with `stones` on the pile and player 0 to move.
    pub fn new(stones: u32) -> Self {
        Self {
            stones,
            current_player: 0,
            last_taker: None,
        }
    }

    pub fn stones(&self) -> u32 {
        self.stones
    }
}

impl fmt::Display for Nim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stones, player {} to move", self.stones, self.current_player)
    }
}

impl Simulator for Nim {
    type Action = Take;
    type Error = NimError;

    fn legal_actions(&self) -> Vec<Take> {
        (1..=MAX_TAKE.min(self.stones)).map(Take).collect()
    }

    fn apply_action(&mut self, action: &Take, _rng: &mut GameRng) -> Result<bool, NimError> {
        if action.0 == 0 || action.0 > MAX_TAKE || action.0 > self.stones {
            return Err(NimError::InvalidTake {
                requested: action.0,
                available: self.stones,
            });
        }
        self.stones -= action.0;
        self.last_taker = Some(self.current_player);
        Ok(false)
    }

    fn advance_turn(&mut self, _rng: &mut GameRng) {
        self.current_player = 1 - self.current_player;
    }

    fn is_decided(&self) -> bool {
        self.stones == 0
    }

    fn winner(&self) -> Option<PlayerId> {
        if self.is_decided() {
            self.last_taker
        } else {
            None
        }
    }

    fn active_player(&self) -> PlayerId {
        self.current_player
    }
}
