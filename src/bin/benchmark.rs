use clap::Parser;
use mcts::games::duel::Duel;
use mcts::{GameRng, Mcts, SearchConfig, SearchResult, Simulator};
use rand::SeedableRng;
use std::fmt::Debug;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Iterations per search (default: 5000)
    #[arg(long, default_value_t = 5000)]
    iterations: u32,

    /// Number of searches to average over (default: 5)
    #[arg(long, default_value_t = 5)]
    repeats: u32,

    /// Seed for the dealt position and the search (default: 42)
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("Card MCTS Arena - Benchmark Tool");
    println!("================================");
    println!("Game: Duel (opening position)");
    println!("Iterations: {}", args.iterations);
    println!("Repeats: {}", args.repeats);
    println!("--------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    let mut rng = GameRng::seed_from_u64(args.seed);
    let state = Duel::new(&mut rng);
    let legal_actions = state.legal_actions();
    println!("{state}");

    let mut mcts = Mcts::new(SearchConfig::default().with_iterations(args.iterations));
    for repeat in 1..=args.repeats {
        let start = Instant::now();
        let result = mcts.search(&state, state.active_player(), &legal_actions, &mut rng)?;
        let duration = start.elapsed();
        print_stats(&format!("Search {repeat}"), &result, duration);
    }
    Ok(())
}

fn print_stats<A: Debug>(name: &str, stats: &SearchResult<A>, duration: Duration) {
    let secs = duration.as_secs_f64();
    let nps = stats.total_nodes as f64 / secs;
    let sps = stats.root_visits as f64 / secs;

    println!("{} Results:", name);
    println!("  Best Action: {:?}", stats.action);
    println!("  Total Nodes: {}", stats.total_nodes);
    println!("  Time: {:.3}s", secs);
    println!("  NPS: {:.0} nodes/sec", nps);
    println!("  SPS: {:.0} sims/sec", sps);
    println!("  Root Visits: {}", stats.root_visits);
    for child in &stats.children {
        println!(
            "    {:?}: {} visits, {:.1}% wins",
            child.action,
            child.visits,
            100.0 * child.wins / f64::from(child.visits.max(1))
        );
    }
}
