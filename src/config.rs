//! Search configuration parameters.

/// Number of select/expand/simulate/backpropagate passes per decision.
pub const DEFAULT_ITERATIONS: u32 = 500;

/// Configuration for one UCT search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Iterations run per decision. Higher values trade latency for
    /// decision quality. Always at least 1.
    pub iterations: u32,

    /// Exploration constant `C` of UCB1. `√2` suits rewards in `[0, 1]`.
    pub exploration: f64,

    /// Reward credited to both players when a rollout ends in a draw.
    pub draw_reward: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            exploration: std::f64::consts::SQRT_2,
            draw_reward: 0.5,
        }
    }
}

impl SearchConfig {
    /// Builder pattern: set the iteration budget.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// Builder pattern: set the exploration constant.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Builder pattern: set the draw reward, clamped to `[0, 1]`.
    pub fn with_draw_reward(mut self, draw_reward: f64) -> Self {
        self.draw_reward = draw_reward.clamp(0.0, 1.0);
        self
    }
}
