mod bits;
mod board;
mod error;
mod frozen;
mod heuristic;
mod logging;
mod search;
mod state;
mod zobrist;

use std::fs;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use board::{Board, Direction};
use error::SolverError;
use search::{DEFAULT_MAX_NODES, SolveLimits, SolveOutcome, solve};

#[derive(Parser)]
#[command(name = "sokolite")]
#[command(about = "A Sokoban solver", long_about = None)]
struct Args {
    /// Path to the puzzle file (standard Sokoban notation)
    #[arg(value_name = "FILE")]
    puzzle_file: String,

    /// Give up after exploring this many frontier nodes
    #[arg(long, value_name = "N")]
    max_nodes: Option<u64>,

    /// Give up after this many milliseconds of wall-clock time
    #[arg(long, value_name = "N")]
    deadline_ms: Option<u64>,

    /// Multiplier on the Manhattan-distance term of the heuristic, for
    /// experimentation (default: heuristic::DEFAULT_MANHATTAN_WEIGHT)
    #[arg(long, value_name = "N")]
    heuristic_weight: Option<u32>,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn direction_char(dir: Direction) -> char {
    dir.to_char()
}

fn run(args: &Args) -> Result<SolveOutcome, SolverError> {
    let text = fs::read_to_string(&args.puzzle_file)?;
    let board = Board::from_text(&text)?;

    let deadline = args.deadline_ms.map(|ms| Instant::now() + Duration::from_millis(ms));
    let limits = SolveLimits {
        max_nodes: Some(args.max_nodes.unwrap_or(DEFAULT_MAX_NODES)),
        deadline,
        poll: None,
        heuristic_weight: args.heuristic_weight,
    };

    Ok(solve(&board, &limits))
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(SolveOutcome::Solved(path)) => {
            let moves: String = path.into_iter().map(direction_char).collect();
            println!("{}", moves);
            ExitCode::SUCCESS
        }
        Ok(SolveOutcome::NoSolution) | Ok(SolveOutcome::Cancelled) => {
            println!();
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
