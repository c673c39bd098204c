//! Per-player statistics collected by the arena.

use std::fmt;
use std::time::Duration;

use crate::{Outcome, PlayerId};

/// Default score credited to both players of a drawn game.
pub const DRAW_SCORE: f64 = 0.5;

/// Statistics of one seat, for one game or merged over many.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStats {
    pub games_played: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub games_drawn: u32,
    /// Actions chosen by this player's policy
    pub actions_played: u64,
    /// Turns this player ended, including the one that decided the game
    pub turns_played: u64,
    /// Sum of 1 per win, 0 per loss and the draw score per draw
    pub total_reward: f64,
    /// Wall time spent inside the player's policy
    pub decision_time: Duration,
}

impl PlayerStats {
    /// Records the final outcome of a game played in seat `player`.
    pub fn record_outcome(&mut self, player: PlayerId, outcome: Outcome, draw_score: f64) {
        self.games_played += 1;
        match outcome {
            Outcome::Winner(winner) if winner == player => self.games_won += 1,
            Outcome::Winner(_) => self.games_lost += 1,
            Outcome::Draw => self.games_drawn += 1,
        }
        self.total_reward += outcome.reward_for(player, draw_score);
    }

    pub fn merge(&mut self, other: &PlayerStats) {
        self.games_played += other.games_played;
        self.games_won += other.games_won;
        self.games_lost += other.games_lost;
        self.games_drawn += other.games_drawn;
        self.actions_played += other.actions_played;
        self.turns_played += other.turns_played;
        self.total_reward += other.total_reward;
        self.decision_time += other.decision_time;
    }

    /// Derived averages. All zero when no game was played.
    pub fn meta_statistics(&self) -> MetaStatistics {
        if self.games_played == 0 {
            return MetaStatistics::default();
        }
        let games = f64::from(self.games_played);
        let mean_decision_time = if self.actions_played == 0 {
            Duration::ZERO
        } else {
            let nanos = self.decision_time.as_nanos() / u128::from(self.actions_played);
            Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
        };
        MetaStatistics {
            win_rate: f64::from(self.games_won) / games,
            loss_rate: f64::from(self.games_lost) / games,
            draw_rate: f64::from(self.games_drawn) / games,
            mean_reward: self.total_reward / games,
            actions_per_game: self.actions_played as f64 / games,
            turns_per_game: self.turns_played as f64 / games,
            mean_decision_time,
        }
    }
}

impl fmt::Display for PlayerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Games played: {}", self.games_played)?;
        writeln!(f, "Games won: {}", self.games_won)?;
        writeln!(f, "Games lost: {}", self.games_lost)?;
        writeln!(f, "Games drawn: {}", self.games_drawn)?;
        writeln!(f, "Actions played: {}", self.actions_played)?;
        writeln!(f, "Turns played: {}", self.turns_played)?;
        write!(f, "Decision time: {:.3}s", self.decision_time.as_secs_f64())
    }
}

/// Averages computed once all games have finished.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetaStatistics {
    pub win_rate: f64,
    pub loss_rate: f64,
    pub draw_rate: f64,
    pub mean_reward: f64,
    pub actions_per_game: f64,
    pub turns_per_game: f64,
    pub mean_decision_time: Duration,
}

impl fmt::Display for MetaStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Win rate: {:.1}%", self.win_rate * 100.0)?;
        writeln!(f, "Draw rate: {:.1}%", self.draw_rate * 100.0)?;
        writeln!(f, "Mean reward: {:.3}", self.mean_reward)?;
        writeln!(f, "Actions per game: {:.1}", self.actions_per_game)?;
        writeln!(f, "Turns per game: {:.1}", self.turns_per_game)?;
        write!(
            f,
            "Mean decision time: {:.2}ms",
            self.mean_decision_time.as_secs_f64() * 1000.0
        )
    }
}

/// Merged statistics of both seats over an arena run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResult {
    pub names: [String; 2],
    pub players: [PlayerStats; 2],
}

impl SimulationResult {
    pub fn new(names: [String; 2]) -> Self {
        Self {
            names,
            players: Default::default(),
        }
    }

    /// Merges the statistics of one finished game.
    pub fn merge(&mut self, game: &[PlayerStats; 2]) {
        for (total, stats) in self.players.iter_mut().zip(game) {
            total.merge(stats);
        }
    }

    pub fn games_played(&self) -> u32 {
        self.players[0].games_played
    }

    pub fn meta_statistics(&self) -> [MetaStatistics; 2] {
        [
            self.players[0].meta_statistics(),
            self.players[1].meta_statistics(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_outcome() {
        let mut stats = PlayerStats::default();
        stats.record_outcome(0, Outcome::Winner(0), DRAW_SCORE);
        stats.record_outcome(0, Outcome::Winner(1), DRAW_SCORE);
        stats.record_outcome(0, Outcome::Draw, DRAW_SCORE);
        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.games_lost, 1);
        assert_eq!(stats.games_drawn, 1);
        assert!((stats.total_reward - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_record_outcome_uses_given_draw_score() {
        let mut stats = PlayerStats::default();
        stats.record_outcome(1, Outcome::Draw, 0.25);
        stats.record_outcome(1, Outcome::Draw, 0.25);
        assert_eq!(stats.games_drawn, 2);
        assert!((stats.total_reward - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_merge_adds_every_field() {
        let mut total = PlayerStats::default();
        let game = PlayerStats {
            games_played: 1,
            games_won: 1,
            actions_played: 12,
            turns_played: 4,
            total_reward: 1.0,
            decision_time: Duration::from_millis(30),
            ..Default::default()
        };
        total.merge(&game);
        total.merge(&game);
        assert_eq!(total.games_played, 2);
        assert_eq!(total.games_won, 2);
        assert_eq!(total.actions_played, 24);
        assert_eq!(total.turns_played, 8);
        assert_eq!(total.decision_time, Duration::from_millis(60));
    }

    #[test]
    fn test_meta_statistics() {
        let mut stats = PlayerStats::default();
        stats.record_outcome(1, Outcome::Winner(1), DRAW_SCORE);
        stats.record_outcome(1, Outcome::Winner(1), DRAW_SCORE);
        stats.record_outcome(1, Outcome::Winner(0), DRAW_SCORE);
        stats.record_outcome(1, Outcome::Draw, DRAW_SCORE);
        stats.actions_played = 40;
        stats.decision_time = Duration::from_millis(80);

        let meta = stats.meta_statistics();
        assert!((meta.win_rate - 0.5).abs() < 1e-12);
        assert!((meta.loss_rate - 0.25).abs() < 1e-12);
        assert!((meta.draw_rate - 0.25).abs() < 1e-12);
        assert!((meta.mean_reward - 0.625).abs() < 1e-12);
        assert!((meta.actions_per_game - 10.0).abs() < 1e-12);
        assert_eq!(meta.mean_decision_time, Duration::from_millis(2));
    }

    #[test]
    fn test_meta_statistics_without_games() {
        assert_eq!(PlayerStats::default().meta_statistics(), MetaStatistics::default());
    }

    #[test]
    fn test_simulation_result_merges_per_seat() {
        let mut result = SimulationResult::new(["A".to_string(), "B".to_string()]);
        let mut game = [PlayerStats::default(), PlayerStats::default()];
        game[0].record_outcome(0, Outcome::Winner(0), DRAW_SCORE);
        game[1].record_outcome(1, Outcome::Winner(0), DRAW_SCORE);
        result.merge(&game);
        result.merge(&game);
        assert_eq!(result.games_played(), 2);
        assert_eq!(result.players[0].games_won, 2);
        assert_eq!(result.players[1].games_lost, 2);
    }
}
