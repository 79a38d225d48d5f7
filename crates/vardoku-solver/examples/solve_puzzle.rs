//! Solves a variant puzzle read from a file or standard input.
//!
//! The puzzle is one row per line, `.` for an empty cell. The grid is square
//! and its size follows from the box dimensions.
//!
//! # Usage
//!
//! ```sh
//! cargo run --example solve_puzzle -- puzzle.txt
//! ```
//!
//! Add variant rules and count solutions (stops at the given limit):
//!
//! ```sh
//! cargo run --example solve_puzzle -- --anti-knight --diagonals --count 2 puzzle.txt
//! ```
//!
//! Use `RUST_LOG=debug` to follow propagation passes and bifurcation rounds.

use std::{fs, io, path::PathBuf, process, sync::Arc};

use clap::Parser;
use vardoku_core::{Bounds, ValueDomain};
use vardoku_solver::{Cancellation, ClueSource, ClueSpecs, Grid, SolveResult, Solver, SolverConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Puzzle file. Reads standard input when omitted.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Box width in cells.
    #[arg(long, value_name = "CELLS", default_value_t = 3)]
    box_width: u8,

    /// Box height in cells.
    #[arg(long, value_name = "CELLS", default_value_t = 3)]
    box_height: u8,

    /// Both main diagonals are houses.
    #[arg(long)]
    diagonals: bool,

    /// Cells a knight's move apart differ.
    #[arg(long)]
    anti_knight: bool,

    /// Cells a king's move apart differ.
    #[arg(long)]
    anti_king: bool,

    /// Orthogonal neighbours may not sum to this value. Repeatable.
    #[arg(long = "no-sum", value_name = "SUM")]
    no_sums: Vec<u8>,

    /// Evaluate clues and hypotheses on all cores.
    #[arg(long)]
    parallel: bool,

    /// Maximum nesting of bifurcation hypotheses.
    #[arg(long, value_name = "DEPTH", default_value_t = 1)]
    depth: usize,

    /// Count solutions up to this limit instead of solving logically.
    #[arg(long, value_name = "LIMIT")]
    count: Option<usize>,
}

fn main() {
    better_panic::install();
    env_logger::init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };

    let size = args
        .box_width
        .checked_mul(args.box_height)
        .ok_or("box dimensions are too large")?;
    let bounds = Bounds::try_new(size, size)?;
    let mut specs = ClueSpecs::new();
    specs.classic(bounds, args.box_width, args.box_height);
    if args.diagonals {
        specs.diagonals(bounds);
    }
    if args.anti_knight {
        specs.anti_knight(bounds);
    }
    if args.anti_king {
        specs.anti_king(bounds);
    }
    if !args.no_sums.is_empty() {
        specs.negative_sums(bounds, &args.no_sums);
    }

    let values = ValueDomain::digits(1..=u32::from(size))?;
    let source = Arc::new(ClueSource::build(specs, bounds, values)?);
    let grid = Grid::parse(Arc::clone(&source), &text)?;
    log::info!("loaded {}x{} puzzle with {} clues", size, size, source.len());

    let solver = Solver::new(SolverConfig {
        parallel: args.parallel,
        max_bifurcation_depth: args.depth,
        ..SolverConfig::default()
    });
    let cancel = Cancellation::new();

    if let Some(limit) = args.count {
        let count = solver.count_solutions(&grid, limit, &cancel)?;
        println!("Solutions: {count}{}", if count == limit { "+" } else { "" });
        return Ok(());
    }

    let result = solver.solve(&grid, &cancel)?;
    print_result(&source, &result);
    Ok(())
}

fn print_result(source: &ClueSource, result: &SolveResult) {
    let status = if result.success {
        "solved"
    } else if result.is_contradiction() {
        "contradiction"
    } else {
        "stalled"
    };
    println!("Status: {status}");
    println!();
    println!("Grid:");
    for line in result.grid.to_text().lines() {
        println!("  {line}");
    }
    println!();

    if result.is_contradiction() {
        println!("Contradictions:");
        for (pos, reasons) in &result.contradictions {
            println!("  {pos}:");
            for reason in reasons.iter() {
                println!("    {}", reason.describe(source));
            }
        }
        println!();
    }

    println!("Stats:");
    println!("  passes: {}", result.stats.passes);
    println!("  bifurcation rounds: {}", result.stats.bifurcation_rounds);
    println!("  hypotheses: {}", result.stats.hypotheses);
    println!("  eliminations: {}", result.stats.eliminations);
    println!("  completed grids seen: {}", result.completed.len());
}
