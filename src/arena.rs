//! # Parallel Evaluation Arena
//!
//! Plays many independent games concurrently and merges per-player
//! statistics. Each game is one unit of work on a fixed-size rayon pool and
//! runs start to finish on a single worker, with its own states, policies and
//! search trees. The only shared state is the run context: the statistics
//! accumulator and the completed-game counter, both behind one mutex.
//!
//! A game that fails aborts the whole run. Silently dropping it would bias
//! the sample without warning.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, error, info};

use crate::error::{HarnessError, SearchError};
use crate::policy::Policy;
use crate::stats::{MetaStatistics, PlayerStats, SimulationResult, DRAW_SCORE};
use crate::{play_action, GameRng, Outcome, Simulator};

/// Minimum time between two progress redraws.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Describes the match-up played in every game of a run.
pub trait GameSetup: Sync {
    type Game: Simulator;

    /// Names of the players in seats 0 and 1.
    fn player_names(&self) -> [String; 2];

    /// Creates the initial state of a new game.
    fn new_game(&self, rng: &mut GameRng) -> Self::Game;

    /// Creates fresh policies for seats 0 and 1. Called once per game.
    fn new_players(&self) -> [Box<dyn Policy<Self::Game>>; 2];

    /// Reward credited to both seats of a drawn game.
    fn draw_score(&self) -> f64 {
        DRAW_SCORE
    }
}

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Number of games to play.
    pub games: usize,
    /// Worker threads; 0 uses every available core.
    pub threads: usize,
    /// Game `i` is seeded with `seed + i`.
    pub seed: u64,
    /// Whether to draw a progress bar on stderr.
    pub show_progress: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: 5,
            threads: 0,
            seed: 0,
            show_progress: true,
        }
    }
}

/// Aggregated outcome of a finished run.
#[derive(Debug, Clone)]
pub struct ArenaReport {
    pub result: SimulationResult,
    pub meta: [MetaStatistics; 2],
    pub games_completed: usize,
    pub elapsed: Duration,
}

struct Accumulator {
    result: SimulationResult,
    completed: usize,
    last_update: Instant,
}

/// State shared by all workers of one run.
struct RunContext {
    accumulator: Mutex<Accumulator>,
    progress: ProgressBar,
    total: usize,
}

impl RunContext {
    fn new(names: [String; 2], total: usize, show_progress: bool) -> Self {
        let progress = if show_progress {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} Games completed: {pos} of {len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");
            bar.set_style(style);
            bar
        } else {
            ProgressBar::hidden()
        };
        Self {
            accumulator: Mutex::new(Accumulator {
                result: SimulationResult::new(names),
                completed: 0,
                last_update: Instant::now(),
            }),
            progress,
            total,
        }
    }

    fn on_game_complete(&self, game: usize, stats: &[PlayerStats; 2]) {
        let mut accumulator = self.accumulator.lock();
        accumulator.result.merge(stats);
        accumulator.completed += 1;
        let completed = accumulator.completed;
        debug!(game, completed, "game complete");

        let now = Instant::now();
        if completed == self.total || now.duration_since(accumulator.last_update) > PROGRESS_INTERVAL {
            accumulator.last_update = now;
            self.progress.set_position(completed as u64);
        }
    }
}

/// Runs match-ups on a pool of worker threads.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    config: ArenaConfig,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Plays every game of the run and returns the merged statistics.
    ///
    /// Blocks until all games are done. The first failing game aborts the run.
    pub fn run<G: GameSetup>(&self, setup: &G) -> Result<ArenaReport, HarnessError> {
        let threads = if self.config.threads == 0 {
            num_cpus::get()
        } else {
            self.config.threads
        };
        let games = self.config.games;
        let names = setup.player_names();
        info!(
            threads,
            games,
            player1 = %names[0],
            player2 = %names[1],
            "Starting simulation"
        );

        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        let context = RunContext::new(names, games, self.config.show_progress);
        let seed = self.config.seed;
        let start = Instant::now();

        let outcome = pool.install(|| {
            (0..games).into_par_iter().try_for_each(|game| {
                let mut rng = GameRng::seed_from_u64(seed.wrapping_add(game as u64));
                let stats = panic::catch_unwind(AssertUnwindSafe(|| play_game(setup, &mut rng)))
                    .map_err(|payload| HarnessError::worker_panic(game, payload))?
                    .map_err(|source| HarnessError::Worker { game, source })?;
                context.on_game_complete(game, &stats);
                Ok(())
            })
        });

        if let Err(err) = outcome {
            context.progress.abandon();
            error!(%err, "simulation aborted");
            return Err(err);
        }
        context.progress.finish();

        let accumulator = context.accumulator.into_inner();
        let meta = accumulator.result.meta_statistics();
        let elapsed = start.elapsed();
        info!(
            games = accumulator.completed,
            elapsed_secs = elapsed.as_secs_f64(),
            "Simulation finished"
        );

        Ok(ArenaReport {
            result: accumulator.result,
            meta,
            games_completed: accumulator.completed,
            elapsed,
        })
    }
}

/// Plays one game to completion with fresh players and returns the
/// statistics of both seats.
pub fn play_game<G: GameSetup>(
    setup: &G,
    rng: &mut GameRng,
) -> Result<[PlayerStats; 2], SearchError> {
    let mut state = setup.new_game(rng);
    let mut players = setup.new_players();
    let mut stats: [PlayerStats; 2] = Default::default();

    while !state.is_decided() {
        let player = state.active_player();
        let legal_actions = state.legal_actions();

        let started = Instant::now();
        let action = players[player].choose_action(&state, &legal_actions, rng)?;
        stats[player].decision_time += started.elapsed();
        stats[player].actions_played += 1;

        if !play_action(&mut state, &action, rng)? {
            stats[player].turns_played += 1;
        }
    }

    let outcome = Outcome::of(&state);
    let draw_score = setup.draw_score();
    for (player, seat) in stats.iter_mut().enumerate() {
        seat.record_outcome(player, outcome, draw_score);
    }
    Ok(stats)
}
