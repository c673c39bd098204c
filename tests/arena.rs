use mcts::games::duel::DuelSetup;
use mcts::games::nim::{Nim, Take, MAX_TAKE};
use mcts::{
    Arena, ArenaConfig, GameRng, GameSetup, HarnessError, PlayerId, Policy, RandomPolicy,
    SearchError, Simulator,
};
use std::convert::Infallible;
use std::fmt;

/// Always leaves a multiple of four stones when it can.
struct Perfect;

impl Policy<Nim> for Perfect {
    fn name(&self) -> &str {
        "Perfect"
    }

    fn choose_action(
        &mut self,
        state: &Nim,
        legal_actions: &[Take],
        _rng: &mut GameRng,
    ) -> Result<Take, SearchError> {
        let winning = Take(state.stones() % (MAX_TAKE + 1));
        if legal_actions.contains(&winning) {
            return Ok(winning);
        }
        legal_actions
            .first()
            .copied()
            .ok_or(SearchError::EmptyActionSet { player: 0 })
    }
}

/// Asks for more stones than the rules allow.
struct Cheater;

impl Policy<Nim> for Cheater {
    fn name(&self) -> &str {
        "Cheater"
    }

    fn choose_action(
        &mut self,
        _state: &Nim,
        _legal_actions: &[Take],
        _rng: &mut GameRng,
    ) -> Result<Take, SearchError> {
        Ok(Take(MAX_TAKE + 1))
    }
}

/// Panics on its first decision.
struct Faulty;

impl Policy<Nim> for Faulty {
    fn name(&self) -> &str {
        "Faulty"
    }

    fn choose_action(
        &mut self,
        _state: &Nim,
        _legal_actions: &[Take],
        _rng: &mut GameRng,
    ) -> Result<Take, SearchError> {
        panic!("policy lost track of the pile");
    }
}

/// A game that ends in a draw as soon as the first player passes.
#[derive(Clone, Debug, Default)]
struct Truce {
    over: bool,
}

impl fmt::Display for Truce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "truce over={}", self.over)
    }
}

impl Simulator for Truce {
    type Action = ();
    type Error = Infallible;

    fn legal_actions(&self) -> Vec<()> {
        if self.over {
            Vec::new()
        } else {
            vec![()]
        }
    }

    fn apply_action(&mut self, _action: &(), _rng: &mut GameRng) -> Result<bool, Infallible> {
        self.over = true;
        Ok(false)
    }

    fn advance_turn(&mut self, _rng: &mut GameRng) {}

    fn is_decided(&self) -> bool {
        self.over
    }

    fn winner(&self) -> Option<PlayerId> {
        None
    }

    fn active_player(&self) -> PlayerId {
        0
    }
}

struct TruceSetup {
    draw_score: f64,
}

impl GameSetup for TruceSetup {
    type Game = Truce;

    fn player_names(&self) -> [String; 2] {
        ["Random".to_string(), "Random".to_string()]
    }

    fn new_game(&self, _rng: &mut GameRng) -> Truce {
        Truce::default()
    }

    fn new_players(&self) -> [Box<dyn Policy<Truce>>; 2] {
        [Box::new(RandomPolicy), Box::new(RandomPolicy)]
    }

    fn draw_score(&self) -> f64 {
        self.draw_score
    }
}

struct FaultyVsRandom;

impl GameSetup for FaultyVsRandom {
    type Game = Nim;

    fn player_names(&self) -> [String; 2] {
        ["Faulty".to_string(), "Random".to_string()]
    }

    fn new_game(&self, _rng: &mut GameRng) -> Nim {
        Nim::new(7)
    }

    fn new_players(&self) -> [Box<dyn Policy<Nim>>; 2] {
        [Box::new(Faulty), Box::new(RandomPolicy)]
    }
}

struct PerfectVsRandom;

impl GameSetup for PerfectVsRandom {
    type Game = Nim;

    fn player_names(&self) -> [String; 2] {
        ["Perfect".to_string(), "Random".to_string()]
    }

    fn new_game(&self, _rng: &mut GameRng) -> Nim {
        Nim::new(9)
    }

    fn new_players(&self) -> [Box<dyn Policy<Nim>>; 2] {
        [Box::new(Perfect), Box::new(RandomPolicy)]
    }
}

struct RandomVsCheater;

impl GameSetup for RandomVsCheater {
    type Game = Nim;

    fn player_names(&self) -> [String; 2] {
        ["Random".to_string(), "Cheater".to_string()]
    }

    fn new_game(&self, _rng: &mut GameRng) -> Nim {
        Nim::new(12)
    }

    fn new_players(&self) -> [Box<dyn Policy<Nim>>; 2] {
        [Box::new(RandomPolicy), Box::new(Cheater)]
    }
}

fn config(games: usize, threads: usize) -> ArenaConfig {
    ArenaConfig {
        games,
        threads,
        seed: 11,
        show_progress: false,
    }
}

#[test]
fn test_every_win_is_credited_to_the_stronger_player() {
    let report = Arena::new(config(4, 2)).run(&PerfectVsRandom).unwrap();

    assert_eq!(report.games_completed, 4);
    let [perfect, random] = &report.result.players;
    assert_eq!(perfect.games_played, 4);
    assert_eq!(perfect.games_won, 4);
    assert_eq!(random.games_won, 0);
    assert_eq!(random.games_lost, 4);
    assert_eq!(report.meta[0].win_rate, 1.0);
    assert_eq!(report.meta[1].win_rate, 0.0);
    assert_eq!(report.result.names[0], "Perfect");
}

#[test]
fn test_single_thread_matches_many_threads() {
    let serial = Arena::new(config(10, 1)).run(&PerfectVsRandom).unwrap();
    let parallel = Arena::new(config(10, 4)).run(&PerfectVsRandom).unwrap();
    assert_eq!(
        serial.result.players[1].actions_played,
        parallel.result.players[1].actions_played
    );
    assert_eq!(
        serial.result.players[0].turns_played,
        parallel.result.players[0].turns_played
    );
}

#[test]
fn test_failing_game_aborts_the_run() {
    let err = Arena::new(config(4, 2)).run(&RandomVsCheater).unwrap_err();
    match err {
        HarnessError::Worker { source, .. } => {
            assert!(matches!(source, SearchError::IllegalAction { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_panicking_policy_aborts_the_run() {
    let err = Arena::new(config(4, 2)).run(&FaultyVsRandom).unwrap_err();
    match err {
        HarnessError::WorkerPanic { game, message } => {
            assert!(game < 4);
            assert_eq!(message, "policy lost track of the pile");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_draws_are_scored_with_the_setup_draw_score() {
    let report = Arena::new(config(3, 2))
        .run(&TruceSetup { draw_score: 0.25 })
        .unwrap();
    for (stats, meta) in report.result.players.iter().zip(&report.meta) {
        assert_eq!(stats.games_drawn, 3);
        assert!((stats.total_reward - 0.75).abs() < 1e-12);
        assert!((meta.mean_reward - 0.25).abs() < 1e-12);
    }
}

#[test]
fn test_duel_run_completes() {
    let report = Arena::new(config(2, 2)).run(&DuelSetup::new(20)).unwrap();
    assert_eq!(report.games_completed, 2);
    for stats in &report.result.players {
        assert_eq!(stats.games_played, 2);
        assert!(stats.actions_played > 0);
    }
    let [first, second] = &report.result.players;
    assert_eq!(first.games_won, second.games_lost);
    assert_eq!(first.games_drawn, second.games_drawn);
}
