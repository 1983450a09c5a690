//! Color-count polyomino puzzle engine.
//!
//! Two tightly coupled subsystems over a shared shape library: a backtracking
//! solver for puzzles constrained by per-row and per-column color counts, and
//! a generator that constructs puzzles guaranteed solvable because they carry
//! their own solution as a witness.
//!
//! The core performs no I/O; the CLI binary is a thin host adapter.

pub mod error;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod shapes;
pub mod solver;

pub use error::PuzzleError;
pub use generator::{generate, generate_with, GeneratorConfig, Puzzle};
pub use grid::{Cell, CellState, Color, Grid, Requirements};
pub use shapes::{PlacedShape, Shape, ShapeDef, ShapeLibrary};
pub use solver::{
    fit_all_pieces, solve_counts, solve_exact_counts, validate, ColorSolution, Solution,
};
