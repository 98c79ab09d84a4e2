//! Polyomino Packing Solver
//!
//! Reads a puzzle file of polyomino shapes and `WxH: counts` regions, and
//! reports which regions can hold their required pieces. Pieces may be
//! rotated and reflected freely.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use polypack::grid::format_orientations;
use polypack::puzzle::Puzzle;
use polypack::{area_fits, solve_all, Coverage, MemoMode, Outcome, Region, SolverConfig};

/// Decides which regions of a puzzle file can be packed with their pieces.
#[derive(Parser)]
#[command(name = "polypack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search every region for a packing.
    Solve(SolveArgs),
    /// Count regions whose pieces fit by area alone.
    Check {
        /// Puzzle file.
        file: PathBuf,
    },
    /// Print the distinct orientations of every shape.
    Orientations {
        /// Puzzle file.
        file: PathBuf,
    },
}

#[derive(Args)]
struct SolveArgs {
    /// Puzzle file.
    file: PathBuf,

    /// Allow cells to stay empty once every required piece is placed.
    #[arg(short, long)]
    partial: bool,

    /// Print the packing found for each feasible region.
    #[arg(short, long)]
    show: bool,

    /// Seed for the state fingerprint tables.
    #[arg(long, default_value_t = polypack::config::DEFAULT_SEED)]
    seed: u64,

    /// Give up on a region after this many search states.
    #[arg(long)]
    max_nodes: Option<u64>,

    /// Give up on a region after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Store full states in the memo table to rule out fingerprint collisions.
    #[arg(long)]
    verify_memo: bool,

    /// Solve a second time requiring every piece to touch the region's edge.
    #[arg(short, long)]
    border: bool,
}

impl SolveArgs {
    fn config(&self) -> SolverConfig {
        let mut config = SolverConfig::default().with_seed(self.seed);
        if self.partial {
            config = config.with_coverage(Coverage::Partial);
        }
        if self.verify_memo {
            config = config.with_memo(MemoMode::Verified);
        }
        if let Some(max_nodes) = self.max_nodes {
            config = config.with_max_nodes(max_nodes);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Solve(args) => run_solve(&args),
        Command::Check { file } => run_check(file),
        Command::Orientations { file } => run_orientations(file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Solves every region and prints a per-region report.
fn run_solve(args: &SolveArgs) -> polypack::Result<()> {
    let puzzle = Puzzle::from_file(&args.file)?;
    println!(
        "Loaded {} shapes and {} regions",
        puzzle.shapes.len(),
        puzzle.regions.len()
    );

    let config = args.config();
    let outcomes = solve_all(&puzzle.shapes, &puzzle.regions, &config)?;
    print!(
        "{}",
        format_report(&puzzle.regions, &outcomes, args.show, "Regions that fit")
    );

    if args.border {
        let config = config.with_border_contact(true);
        let outcomes = solve_all(&puzzle.shapes, &puzzle.regions, &config)?;
        println!();
        println!("With border constraint:");
        print!(
            "{}",
            format_report(
                &puzzle.regions,
                &outcomes,
                args.show,
                "Regions that fit with border constraint"
            )
        );
    }
    Ok(())
}

/// Prints how many regions pass the area check.
fn run_check(file: PathBuf) -> polypack::Result<()> {
    let puzzle = Puzzle::from_file(&file)?;
    let fitting = puzzle
        .regions
        .iter()
        .filter(|region| area_fits(&puzzle.shapes, region))
        .count();
    println!("Regions that fit by area: {fitting}");
    Ok(())
}

/// Prints each shape's orientations side by side.
fn run_orientations(file: PathBuf) -> polypack::Result<()> {
    let puzzle = Puzzle::from_file(&file)?;
    for shape in &puzzle.shapes {
        let orientations = shape.orientations();
        println!("Shape {} ({} orientations):", shape.id, orientations.len());
        print!("{}", format_orientations(&orientations));
        println!();
    }
    Ok(())
}

/// Formats one line per region plus a final `<tally>: K` line.
fn format_report(regions: &[Region], outcomes: &[Outcome], show: bool, tally: &str) -> String {
    let mut output = String::new();
    let total = regions.len();

    for (i, (region, outcome)) in regions.iter().zip(outcomes).enumerate() {
        let verdict = match outcome {
            Outcome::Feasible(_) => "FITS".to_string(),
            Outcome::Infeasible => "NO FIT".to_string(),
            Outcome::Inconclusive(reason) => format!("UNKNOWN ({reason})"),
        };
        output.push_str(&format!(
            "Region {}/{}: {}x{}... {}\n",
            i + 1,
            total,
            region.width,
            region.height,
            verdict
        ));
        if let (true, Some(packing)) = (show, outcome.packing()) {
            output.push_str(&packing.render());
        }
    }

    let fitting = outcomes.iter().filter(|outcome| outcome.is_feasible()).count();
    output.push_str(&format!("{tally}: {fitting}\n"));
    output
}
