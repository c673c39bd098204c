//! Search tree with arena allocation.
//!
//! Nodes live in a contiguous `Vec` and refer to each other by [`NodeId`].
//! Children are owned through the arena; the parent link is a plain index
//! used only to walk back up during backpropagation. A tree is built for a
//! single decision and dropped, together with every cloned state it owns, as
//! soon as the action has been extracted.

use crate::error::SearchError;
use crate::{GameRng, Outcome, PlayerId, Simulator};
use rand::Rng;

/// Index of a node inside its [`SearchTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the search tree.
///
/// Statistics are kept from the perspective of [`Node::player`]: the player
/// who chose the incoming action (the active player, for the root).
#[derive(Debug, Clone)]
pub struct Node<S: Simulator> {
    /// State reached after `action`. Owned exclusively by this node.
    state: S,
    /// Action that produced this node from its parent; `None` for the root.
    action: Option<S::Action>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Legal actions of `state` not yet expanded into children.
    untried: Vec<S::Action>,
    visits: u32,
    wins: f64,
    player: PlayerId,
}

impl<S: Simulator> Node<S> {
    fn new(
        state: S,
        action: Option<S::Action>,
        parent: Option<NodeId>,
        untried: Vec<S::Action>,
        player: PlayerId,
    ) -> Self {
        Self {
            state,
            action,
            parent,
            children: Vec::new(),
            untried,
            visits: 0,
            wins: 0.0,
            player,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn action(&self) -> Option<&S::Action> {
        self.action.as_ref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn untried_actions(&self) -> &[S::Action] {
        &self.untried
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn wins(&self) -> f64 {
        self.wins
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// True once every legal action has a child.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// True if the node's state has a decided outcome.
    pub fn is_terminal(&self) -> bool {
        self.state.is_decided()
    }

    /// Calculates the UCB1 score of this node as a child of a parent visited
    /// `parent_visits` times.
    ///
    /// An unvisited node scores infinity so it is always tried first.
    pub fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = f64::from(self.visits);
        self.wins / visits + exploration * (f64::from(parent_visits).ln() / visits).sqrt()
    }

    fn update(&mut self, reward: f64) {
        self.visits += 1;
        self.wins += reward;
    }
}

/// Search tree for one decision.
#[derive(Debug)]
pub struct SearchTree<S: Simulator> {
    nodes: Vec<Node<S>>,
}

impl<S: Simulator> SearchTree<S> {
    /// Creates a tree whose root owns a clone of `state`.
    ///
    /// `legal_actions` seeds the root's untried actions and `player` is the
    /// player about to move.
    pub fn new(state: &S, legal_actions: Vec<S::Action>, player: PlayerId) -> Self {
        let root = Node::new(state.clone(), None, None, legal_actions, player);
        Self { nodes: vec![root] }
    }

    /// The root is always the first node of the arena.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0]
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Picks one untried action of `id` uniformly at random.
    pub fn random_untried_action(&self, id: NodeId, rng: &mut GameRng) -> Option<S::Action> {
        let untried = &self.get(id).untried;
        if untried.is_empty() {
            return None;
        }
        Some(untried[rng.random_range(0..untried.len())].clone())
    }

    /// Materializes `action` as a new child of `id`.
    ///
    /// The action is applied to a clone of the node's state. If the simulator
    /// rejects it, the node is left untouched and the error is returned.
    pub fn expand(
        &mut self,
        id: NodeId,
        action: &S::Action,
        rng: &mut GameRng,
    ) -> Result<NodeId, SearchError> {
        let node = &self.nodes[id.0];
        let position = node
            .untried
            .iter()
            .position(|candidate| candidate == action)
            .ok_or_else(|| SearchError::UnknownAction {
                action: format!("{action:?}"),
            })?;

        let mover = node.state.active_player();
        let mut state = node.state.clone();
        crate::play_action(&mut state, action, rng)?;

        let untried = if state.is_decided() {
            Vec::new()
        } else {
            state.legal_actions()
        };

        let child_id = NodeId(self.nodes.len());
        let parent = &mut self.nodes[id.0];
        let action = parent.untried.remove(position);
        parent.children.push(child_id);
        self.nodes
            .push(Node::new(state, Some(action), Some(id), untried, mover));

        Ok(child_id)
    }

    /// Selects the child of `id` with the highest UCB1 score.
    ///
    /// Equal scores keep the earliest child. Returns `None` if the node has
    /// no children.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(id);
        let mut best = None;
        let mut best_score = f64::NEG_INFINITY;
        for &child_id in &node.children {
            let score = self.get(child_id).ucb1(node.visits, exploration);
            if best.is_none() || score > best_score {
                best = Some(child_id);
                best_score = score;
            }
        }
        best
    }

    /// Walks from `leaf` to the root, crediting every node with the reward
    /// of `outcome` from its own player's perspective.
    pub fn backpropagate(&mut self, leaf: NodeId, outcome: Outcome, draw_reward: f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = &mut self.nodes[id.0];
            node.update(outcome.reward_for(node.player, draw_reward));
            current = node.parent;
        }
    }

    /// Returns the most visited child of `id`, the first one on ties.
    pub fn most_visited_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best = None;
        let mut best_visits = 0;
        for &child_id in &self.get(id).children {
            let visits = self.get(child_id).visits;
            if best.is_none() || visits > best_visits {
                best = Some(child_id);
                best_visits = visits;
            }
        }
        best
    }

    /// Incoming action of the root's most visited child.
    pub fn best_child_by_visits(&self) -> Option<&S::Action> {
        self.most_visited_child(self.root())
            .and_then(|id| self.get(id).action())
    }
}
