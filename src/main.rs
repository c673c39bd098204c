//! # Arena
//!
//! Plays a number of duels between the MCTS agent (seat 1) and the aggro
//! heuristic (seat 2) on all available cores, then prints the merged
//! statistics of both players.
//!
//! ## Usage
//! `arena [GAMES] [ITERATIONS]`. Games are clamped to 2..=1000 and iterations
//! to 100..=1000. Run with `cargo run --release` for best performance.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use colored::Colorize;
use mcts::games::duel::DuelSetup;
use mcts::{Arena, ArenaConfig, ArenaReport};
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of games to play (clamped to 2..=1000)
    #[arg(default_value_t = 5)]
    games: i64,

    /// MCTS iterations per decision (clamped to 100..=1000)
    #[arg(default_value_t = 400)]
    iterations: i64,

    /// Seed of the first game; game i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Worker threads (0 uses every core)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Do not draw the progress bar
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_progress: bool,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn usage() -> ! {
    println!("{}", Args::command().render_usage());
    std::process::exit(0);
}

fn run(args: &Args) -> Result<()> {
    let games = args.games.clamp(2, 1000) as usize;
    let iterations = args.iterations.clamp(100, 1000) as u32;

    let arena = Arena::new(ArenaConfig {
        games,
        threads: args.threads,
        seed: args.seed,
        show_progress: !args.no_progress,
    });
    let report = arena
        .run(&DuelSetup::new(iterations))
        .context("arena run failed")?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &ArenaReport) {
    println!();
    println!(
        "{}",
        format!(
            "Game statistics ({} games in {:.1}s)",
            report.games_completed,
            report.elapsed.as_secs_f64()
        )
        .bold()
    );
    for (seat, (name, stats)) in report
        .result
        .names
        .iter()
        .zip(&report.result.players)
        .enumerate()
    {
        println!();
        println!(
            "{}",
            format!("--- Player {} ({}) ---", seat + 1, name).cyan().bold()
        );
        println!("{stats}");
        println!("{}", report.meta[seat]);
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = err.print();
                std::process::exit(0);
            }
            _ => usage(),
        },
    };

    init_tracing(&args.log_level);

    std::process::exit(exit_code(run(&args)));
}

/// Reports a failed run and maps it to the process status.
fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("{err:#}");
            eprintln!("{} {err:#}", "error:".red().bold());
            -1
        }
    }
}
