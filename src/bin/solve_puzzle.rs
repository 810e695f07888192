use clap::Parser;
use rush_hour_solver::heuristics::Heuristic;
use rush_hour_solver::solver::{Algorithm, SolverConfig};
use rush_hour_solver::state::State;
use rush_hour_solver::utils::{read_puzzle_file, write_transcript};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file
    puzzle_file: PathBuf,

    /// Search algorithm: UCS, GREEDY, ASTAR or IDA_STAR
    #[clap(short, long, default_value = "ASTAR")]
    algorithm: Algorithm,

    /// Heuristic for informed search: DISTANCE, BLOCKER_COUNT or COMBINED
    #[clap(short = 'H', long, default_value = "COMBINED")]
    heuristic: Heuristic,

    /// Also write the transcript to this file
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Print boards without ANSI colours
    #[clap(long)]
    plain: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rush_hour_solver=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let puzzle = read_puzzle_file(&args.puzzle_file)?;
    let config = SolverConfig::new(args.algorithm, Some(args.heuristic))?;
    let render = |state: &State| {
        if args.plain {
            state.board().to_string()
        } else {
            state.board().to_string_with_highlight(state.moved_piece())
        }
    };

    let initial = puzzle.initial_state()?;
    println!("Loaded puzzle from {}\n", args.puzzle_file.display());
    println!("Initial board:\n{}\n", render(&initial));
    match config.heuristic() {
        Some(heuristic) => println!("Solving with {} ({})...\n", config.algorithm(), heuristic),
        None => println!("Solving with {}...\n", config.algorithm()),
    }

    let started = Instant::now();
    let solution = rush_hour_solver::solve(initial, &config)?;
    let elapsed = started.elapsed();

    if solution.is_solved() {
        for (step, state) in solution.path.iter().enumerate().skip(1) {
            println!("Step {}: {}\n{}\n", step, state.label(), render(state));
        }
        println!("Steps: {}", solution.steps());
    } else {
        println!("No solution found.");
    }
    println!("Nodes explored: {}", solution.nodes_explored);
    println!("Elapsed: {:.3} ms", elapsed.as_secs_f64() * 1000.0);

    if let Some(path) = &args.output {
        write_transcript(path, &solution)?;
        println!("Transcript written to {}", path.display());
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
