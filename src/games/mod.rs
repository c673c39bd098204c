//! # Game Implementations Module
//!
//! Simulators the engine is exercised against. Each game implements the
//! [`Simulator`](crate::Simulator) trait.
//!
//! ## Supported Games
//! - **Duel**: a small stochastic card game with multi-action turns, hidden
//!   random draws, minions and fatigue; the game played by the `arena` binary
//! - **Nim**: a deterministic take-away game used to check search quality

pub mod duel;
pub mod nim;
