use clap::Parser;
use rush_hour_solver::heuristics::Heuristic;
use rush_hour_solver::solver::{solve, Algorithm, SolverConfig};
use rush_hour_solver::utils::{read_puzzle_file, scramble, Puzzle};
use std::collections::HashMap;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file
    puzzle_file: PathBuf,

    /// Number of scrambled variants to evaluate besides the puzzle itself
    #[clap(long, default_value_t = 10)]
    scrambles: usize,

    /// Random moves applied per scramble
    #[clap(long, default_value_t = 30)]
    depth: usize,

    /// Seed of the first scramble; scramble `i` uses `seed + i`
    #[clap(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Default)]
struct Totals {
    solved: usize,
    steps: usize,
    nodes: u64,
    elapsed: Duration,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rush_hour_solver=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn configurations() -> Vec<SolverConfig> {
    let mut configs = Vec::new();
    for algorithm in Algorithm::ALL {
        if !algorithm.requires_heuristic() {
            configs.extend(SolverConfig::new(algorithm, None));
            continue;
        }
        for heuristic in Heuristic::ALL {
            configs.extend(SolverConfig::new(algorithm, Some(heuristic)));
        }
    }
    configs
}

fn label(config: &SolverConfig) -> String {
    match config.heuristic() {
        Some(heuristic) => format!("{} / {}", config.algorithm(), heuristic),
        None => config.algorithm().to_string(),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let puzzle = read_puzzle_file(&args.puzzle_file)?;
    let mut cases: Vec<(String, Puzzle)> = vec![("original".to_string(), puzzle.clone())];
    for i in 0..args.scrambles {
        let seed = args.seed + i as u64;
        cases.push((format!("seed {}", seed), scramble(&puzzle, args.depth, seed)?));
    }

    let configs = configurations();
    let mut totals: HashMap<String, Totals> = HashMap::new();
    let mut longer_than_ucs = Vec::new();

    println!("Evaluating {} strategies on {} boards...", configs.len(), cases.len());

    for (name, case) in &cases {
        println!("\nBoard: {}", name);
        let mut ucs_steps = None;

        for config in &configs {
            let started = Instant::now();
            let solution = solve(case.initial_state()?, config)?;
            let elapsed = started.elapsed();

            println!(
                "  {:<28} Steps: {:<4} Nodes: {:<8} Time: {:.2} ms",
                label(config),
                solution.steps(),
                solution.nodes_explored,
                elapsed.as_secs_f64() * 1000.0
            );

            let entry = totals.entry(label(config)).or_default();
            entry.elapsed += elapsed;
            if !solution.is_solved() {
                continue;
            }
            entry.solved += 1;
            entry.steps += solution.steps();
            entry.nodes += solution.nodes_explored;

            match config.algorithm() {
                Algorithm::Ucs => ucs_steps = Some(solution.steps()),
                Algorithm::AStar | Algorithm::IdaStar => {
                    if let Some(optimal) = ucs_steps.filter(|&optimal| solution.steps() > optimal) {
                        warn!(board = %name, strategy = %label(config), steps = solution.steps(), optimal, "path longer than UCS");
                        longer_than_ucs.push((name.clone(), label(config), solution.steps(), optimal));
                    }
                }
                Algorithm::Greedy => {}
            }
        }
    }

    println!("\n--- Averages over solved boards ---");
    for config in &configs {
        let name = label(config);
        let Some(total) = totals.get(&name) else {
            continue;
        };
        if total.solved == 0 {
            println!("{:<28} no solved boards", name);
            continue;
        }
        println!(
            "{:<28} Steps: {:<8.2} Nodes: {:<10.1} Time: {:.2} ms",
            name,
            total.steps as f64 / total.solved as f64,
            total.nodes as f64 / total.solved as f64,
            total.elapsed.as_secs_f64() * 1000.0 / cases.len() as f64
        );
    }

    println!("\n--- Paths longer than UCS ---");
    if longer_than_ucs.is_empty() {
        println!("None: every A* and IDA* path matched the UCS optimum.");
    }
    for (board, strategy, steps, optimal) in &longer_than_ucs {
        println!("{:<12} {:<28} {} steps (UCS: {})", board, strategy, steps, optimal);
    }
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
