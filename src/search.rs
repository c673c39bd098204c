//! UCT search implementation.
//!
//! One [`Mcts::search`] call builds a fresh [`SearchTree`] for a single
//! decision and runs a fixed number of iterations, each consisting of:
//! 1. Selection: descend through fully expanded, undecided nodes by UCB1
//! 2. Expansion: materialize one random untried action as a new child
//! 3. Simulation: play the child's state to the end with the rollout policy
//! 4. Backpropagation: credit the outcome to every node back to the root
//!
//! The action returned is the root child with the most visits.

use std::marker::PhantomData;

use tracing::{debug, error, trace};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::policy::{Policy, RandomPolicy};
use crate::tree::SearchTree;
use crate::{play_action, GameRng, Outcome, PlayerId, Simulator};

/// Statistics of one root child after a search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats<A> {
    pub action: A,
    pub visits: u32,
    /// Accumulated reward from the perspective of the searching player.
    pub wins: f64,
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct SearchResult<A> {
    /// Best action to take
    pub action: A,
    /// Number of iterations performed
    pub iterations: u32,
    /// Total nodes in the tree, root included
    pub total_nodes: usize,
    /// Visits of the root node
    pub root_visits: u32,
    /// Root children in expansion order
    pub children: Vec<ChildStats<A>>,
}

/// The search driver. Generic over the rollout policy so tests can substitute
/// scripted playouts; uniform random play by default.
#[derive(Debug)]
pub struct Mcts<S: Simulator, P: Policy<S> = RandomPolicy> {
    config: SearchConfig,
    rollout_policy: P,
    _game: PhantomData<fn() -> S>,
}

impl<S: Simulator> Mcts<S> {
    /// Creates a driver with uniform random rollouts.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_rollout_policy(config, RandomPolicy)
    }
}

impl<S: Simulator, P: Policy<S>> Mcts<S, P> {
    pub fn with_rollout_policy(config: SearchConfig, rollout_policy: P) -> Self {
        Self {
            config,
            rollout_policy,
            _game: PhantomData,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Chooses an action for `player` among `legal_actions`.
    ///
    /// A single legal action is returned directly without searching.
    pub fn request_action(
        &mut self,
        state: &S,
        player: PlayerId,
        legal_actions: &[S::Action],
        rng: &mut GameRng,
    ) -> Result<S::Action, SearchError> {
        debug!(player, actions = legal_actions.len(), "requesting action");
        if let [only] = legal_actions {
            debug!(action = ?only, "single legal action, skipping search");
            return Ok(only.clone());
        }
        self.search(state, player, legal_actions, rng)
            .map(|result| result.action)
    }

    /// Runs the configured number of UCT iterations from `state` and returns
    /// the most visited root action along with the tree statistics.
    pub fn search(
        &mut self,
        state: &S,
        player: PlayerId,
        legal_actions: &[S::Action],
        rng: &mut GameRng,
    ) -> Result<SearchResult<S::Action>, SearchError> {
        let Some(first) = legal_actions.first() else {
            return Err(SearchError::EmptyActionSet { player });
        };

        if state.is_decided() {
            // Nothing left to decide; any action is as good as another.
            debug!(player, "root state already decided");
            return Ok(SearchResult {
                action: first.clone(),
                iterations: 0,
                total_nodes: 1,
                root_visits: 0,
                children: Vec::new(),
            });
        }

        let mut tree = SearchTree::new(state, legal_actions.to_vec(), player);
        for iteration in 0..self.config.iterations {
            if let Err(err) = self.iterate(&mut tree, rng) {
                error!(iteration, player, %err, "search iteration aborted");
                return Err(err);
            }
        }

        let root = tree.get(tree.root());
        let action = tree
            .best_child_by_visits()
            .cloned()
            .ok_or(SearchError::EmptyActionSet { player })?;
        let children = root
            .children()
            .iter()
            .filter_map(|&id| {
                let child = tree.get(id);
                child.action().map(|action| ChildStats {
                    action: action.clone(),
                    visits: child.visits(),
                    wins: child.wins(),
                })
            })
            .collect();

        debug!(
            player,
            ?action,
            nodes = tree.len(),
            root_visits = root.visits(),
            "search finished"
        );

        Ok(SearchResult {
            action,
            iterations: self.config.iterations,
            total_nodes: tree.len(),
            root_visits: root.visits(),
            children,
        })
    }

    /// Runs one select/expand/simulate/backpropagate pass.
    fn iterate(&mut self, tree: &mut SearchTree<S>, rng: &mut GameRng) -> Result<(), SearchError> {
        let mut node = tree.root();
        while tree.get(node).is_fully_expanded() && !tree.get(node).is_terminal() {
            match tree.select_child(node, self.config.exploration) {
                Some(child) => node = child,
                None => break,
            }
        }

        if !tree.get(node).is_terminal() {
            if let Some(action) = tree.random_untried_action(node, rng) {
                node = tree.expand(node, &action, rng)?;
            }
        }

        let outcome = self.rollout(tree.get(node).state(), rng)?;
        tree.backpropagate(node, outcome, self.config.draw_reward);

        trace!(node = node.index(), ?outcome, "iteration complete");
        Ok(())
    }

    /// Plays a clone of `state` to the end with the rollout policy.
    ///
    /// A decided state is read directly without cloning.
    pub fn rollout(&mut self, state: &S, rng: &mut GameRng) -> Result<Outcome, SearchError> {
        if state.is_decided() {
            return Ok(Outcome::of(state));
        }

        let mut simulation = state.clone();
        while !simulation.is_decided() {
            let legal_actions = simulation.legal_actions();
            if legal_actions.is_empty() {
                return Err(SearchError::EmptyActionSet {
                    player: simulation.active_player(),
                });
            }
            let action = self
                .rollout_policy
                .choose_action(&simulation, &legal_actions, rng)?;
            play_action(&mut simulation, &action, rng)?;
        }
        Ok(Outcome::of(&simulation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::duel::Duel;
    use crate::games::nim::{Nim, Take};
    use rand::SeedableRng;

    fn search_nim(stones: u32, iterations: u32, seed: u64) -> SearchResult<Take> {
        let state = Nim::new(stones);
        let mut rng = GameRng::seed_from_u64(seed);
        let mut mcts = Mcts::new(SearchConfig::default().with_iterations(iterations));
        mcts.search(&state, 0, &state.legal_actions(), &mut rng)
            .unwrap()
    }

    #[test]
    fn test_root_child_visits_sum_to_iterations() {
        let result = search_nim(10, 300, 1);
        let total: u32 = result.children.iter().map(|c| c.visits).sum();
        assert_eq!(total, 300);
        assert_eq!(result.root_visits, 300);
        assert_eq!(result.iterations, 300);
        assert_eq!(result.children.len(), 3);
    }

    #[test]
    fn test_finds_winning_nim_move() {
        // Leaving a multiple of four stones wins.
        assert_eq!(search_nim(5, 1000, 3).action, Take(1));
        assert_eq!(search_nim(6, 1000, 3).action, Take(2));
        assert_eq!(search_nim(7, 1000, 3).action, Take(3));
    }

    #[test]
    fn test_takes_last_stones_immediately() {
        assert_eq!(search_nim(3, 200, 9).action, Take(3));
    }

    #[test]
    fn test_same_seed_same_result() {
        let first = search_nim(13, 400, 42);
        let second = search_nim(13, 400, 42);
        assert_eq!(first.action, second.action);
        assert_eq!(first.children, second.children);
    }

    #[test]
    fn test_single_action_skips_search() {
        let state = Nim::new(1);
        let mut rng = GameRng::seed_from_u64(0);
        let before = rng.clone();
        let mut mcts = Mcts::new(SearchConfig::default());
        let action = mcts.request_action(&state, 0, &[Take(1)], &mut rng).unwrap();
        assert_eq!(action, Take(1));
        // No iteration consumed any randomness.
        assert_eq!(rng, before);
    }

    #[test]
    fn test_empty_action_set_fails() {
        let state = Nim::new(4);
        let mut rng = GameRng::seed_from_u64(0);
        let mut mcts = Mcts::new(SearchConfig::default());
        let err = mcts.request_action(&state, 0, &[], &mut rng).unwrap_err();
        assert!(matches!(err, SearchError::EmptyActionSet { player: 0 }));
    }

    #[test]
    fn test_rollout_of_decided_state_reads_outcome() {
        let mut state = Nim::new(2);
        let mut rng = GameRng::seed_from_u64(0);
        state.apply_action(&Take(2), &mut rng).unwrap();
        let before = rng.clone();
        let mut mcts = Mcts::new(SearchConfig::default());
        assert_eq!(mcts.rollout(&state, &mut rng).unwrap(), Outcome::Winner(0));
        assert_eq!(rng, before);
    }

    #[test]
    fn test_rollout_plays_duel_to_the_end() {
        let mut rng = GameRng::seed_from_u64(17);
        let state = Duel::new(&mut rng);
        let mut mcts = Mcts::new(SearchConfig::default());
        let outcome = mcts.rollout(&state, &mut rng).unwrap();
        assert!(matches!(outcome, Outcome::Winner(_) | Outcome::Draw));
        // The root state itself is untouched.
        assert_eq!(state.turn(), 1);
    }

    #[test]
    fn test_duel_search_returns_legal_action() {
        let mut rng = GameRng::seed_from_u64(23);
        let state = Duel::new(&mut rng);
        let legal = state.legal_actions();
        let mut mcts = Mcts::new(SearchConfig::default().with_iterations(100));
        let result = mcts.search(&state, 0, &legal, &mut rng).unwrap();
        assert!(legal.contains(&result.action));
        assert!(result.total_nodes > 1);
        let total: u32 = result.children.iter().map(|c| c.visits).sum();
        assert_eq!(total, 100);
    }
}
