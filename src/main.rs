//! Color-count polyomino puzzle CLI.
//!
//! Generates puzzles with the core engine, re-solves them to demonstrate the
//! solver, and tiles grids from shape multisets. All I/O lives here; the
//! library performs none.

use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;

use chromino::{
    fit_all_pieces, generate, generate_with, grid::format_placements, solve_exact_counts,
    GeneratorConfig, Puzzle, PuzzleError, ShapeLibrary,
};

/// Generates and solves color-count polyomino puzzles.
#[derive(Parser)]
#[command(name = "chromino")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a puzzle and print it.
    Generate(GenerateArgs),
    /// Generate a puzzle, then recover it with the exact-count solver.
    Solve(GenerateArgs),
    /// Tile a grid with a multiset of shapes.
    Fit(FitArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value_t = 5)]
    rows: usize,

    #[arg(long, default_value_t = 5)]
    cols: usize,

    /// Color palette, comma separated.
    #[arg(long, value_delimiter = ',', default_values_t = [String::from("green"), String::from("blue")])]
    colors: Vec<String>,

    /// Scatter blocked cells into the layout.
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    blockers: bool,

    /// Scatter color-locked cells into the layout.
    #[arg(long, action = ArgAction::Set, default_value_t = false)]
    locks: bool,

    /// Restrict the shape pool to these ids, comma separated.
    #[arg(long, value_delimiter = ',')]
    shapes: Vec<String>,

    /// Seed for reproducible generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Generation time budget in milliseconds.
    #[arg(long, default_value_t = 4000)]
    deadline_ms: u64,
}

#[derive(Args)]
struct FitArgs {
    #[arg(long, default_value_t = 4)]
    rows: usize,

    #[arg(long, default_value_t = 4)]
    cols: usize,

    /// Shape multiset as id=count pairs, comma separated, e.g. square-4=4.
    #[arg(long, value_delimiter = ',', required = true)]
    shapes: Vec<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let library = ShapeLibrary::default_set();

    let outcome = match cli.command {
        Command::Generate(args) => run_generate(&library, &args).map(|puzzle| {
            println!("{}", puzzle.render());
        }),
        Command::Solve(args) => run_solve(&library, &args),
        Command::Fit(args) => run_fit(&library, &args),
    };

    if let Err(error) = outcome {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn build_config(args: &GenerateArgs) -> GeneratorConfig {
    GeneratorConfig {
        rows: args.rows,
        cols: args.cols,
        colors: args.colors.clone(),
        blockers: args.blockers,
        locks: args.locks,
        shape_pool: args.shapes.clone(),
        deadline: Duration::from_millis(args.deadline_ms),
    }
}

fn run_generate(library: &ShapeLibrary, args: &GenerateArgs) -> Result<Puzzle, PuzzleError> {
    let config = build_config(args);
    match args.seed {
        Some(seed) => generate_with(library, &config, &mut StdRng::seed_from_u64(seed)),
        None => generate(library, &config),
    }
}

/// Generates a puzzle and feeds its own shape multiset back into the
/// exact-count solver.
fn run_solve(library: &ShapeLibrary, args: &GenerateArgs) -> Result<(), PuzzleError> {
    let puzzle = run_generate(library, args)?;
    println!("{}", puzzle.render());

    let multisets: Vec<FxHashMap<String, usize>> = puzzle
        .shapes
        .iter()
        .map(|placements| {
            let mut counts = FxHashMap::default();
            for placed in placements {
                let id = library.shapes()[placed.shape].id.clone();
                *counts.entry(id).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let solutions = solve_exact_counts(&puzzle.grid, &puzzle.requirements, library, &multisets)?;
    println!("recovered {} solution(s) from the shape multiset", solutions.len());
    for (color, counts) in puzzle.colors.iter().zip(&multisets) {
        let mut parts: Vec<String> = counts
            .iter()
            .map(|(id, count)| format!("{id} x{count}"))
            .collect();
        parts.sort();
        println!("  {color}: {}", parts.join(", "));
    }
    Ok(())
}

fn run_fit(library: &ShapeLibrary, args: &FitArgs) -> Result<(), PuzzleError> {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for pair in &args.shapes {
        let Some((id, count)) = pair.split_once('=') else {
            return Err(PuzzleError::InvalidConfig {
                reason: format!("expected id=count, got '{pair}'"),
            });
        };
        let count: usize = count.parse().map_err(|_| PuzzleError::InvalidConfig {
            reason: format!("invalid count in '{pair}'"),
        })?;
        *counts.entry(id.to_string()).or_insert(0) += count;
    }

    let solutions = fit_all_pieces(args.rows, args.cols, &[], library, &counts)?;
    for tiling in &solutions {
        println!("{}", format_placements(args.rows, args.cols, tiling));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_command_round_trips() {
        let library = ShapeLibrary::default_set();
        let args = GenerateArgs {
            rows: 4,
            cols: 4,
            colors: vec!["green".to_string()],
            blockers: false,
            locks: false,
            shapes: vec!["square-4".to_string()],
            seed: Some(99),
            deadline_ms: 4000,
        };
        assert!(run_solve(&library, &args).is_ok());
    }

    #[test]
    fn test_fit_formats_a_tiling() {
        let library = ShapeLibrary::default_set();
        let counts: FxHashMap<String, usize> =
            [("square-4".to_string(), 4)].into_iter().collect();
        let solutions = fit_all_pieces(4, 4, &[], &library, &counts).unwrap();
        let rendered = format_placements(4, 4, &solutions[0]);

        insta::assert_snapshot!(rendered, @r"
        1122
        1122
        3344
        3344
        ");
    }
}
