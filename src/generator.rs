//! Multi-phase puzzle generator.
//!
//! A single attempt allocates per-color cell budgets, draws random shapes and
//! rotations, scatters blockers and locks under a coin-flipped layout
//! strategy, and lays the shapes onto the grid. The outer loop retries
//! attempts until one succeeds or the wall-clock deadline passes, so every
//! returned puzzle carries its own solution as a witness.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::error::PuzzleError;
use crate::geometry;
use crate::grid::{Cell, CellState, Color, Grid, Requirements, MAX_COLORS};
use crate::shapes::{PlacedShape, ShapeLibrary};

/// Placement retries per attempt before falling back to a cleared grid.
const PLACEMENT_RETRIES: usize = 5;

/// Attempt multiplier for random scatter loops.
const SCATTER_ATTEMPT_FACTOR: usize = 10;

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub cols: usize,
    /// Palette names; color `k` of the output refers to `colors[k]`.
    pub colors: Vec<String>,
    /// Scatter blocked cells into the layout.
    pub blockers: bool,
    /// Scatter pre-colored locked cells into the layout.
    pub locks: bool,
    /// Shape ids drawn from during generation; empty means the whole library.
    pub shape_pool: Vec<String>,
    /// Wall-clock budget for the outer retry loop.
    pub deadline: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            colors: vec!["green".to_string(), "blue".to_string()],
            blockers: true,
            locks: false,
            shape_pool: Vec::new(),
            deadline: Duration::from_millis(4000),
        }
    }
}

/// A fully specified puzzle instance, witnessed by its own solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Finalized grid: the solution overlay (filled cells) plus blockers and
    /// locks. Never mutated after generation.
    pub grid: Grid,
    /// Palette names, as configured.
    pub colors: Vec<String>,
    /// Per color, the placements laid down by the generator.
    pub shapes: Vec<Vec<PlacedShape>>,
    pub blockers: Vec<Cell>,
    /// Per color, the locked cells.
    pub locks: Vec<Vec<Cell>>,
    /// Row/column counts derived from the finalized grid.
    pub requirements: Requirements,
    /// Per color, the cells covered by that color's placements.
    pub solution: Vec<Vec<Cell>>,
}

impl Puzzle {
    /// Renders the grid with per-row requirements alongside and per-color
    /// column requirements below.
    pub fn render(&self) -> String {
        let mut output = String::new();
        let grid_text = self.grid.render();
        for (r, line) in grid_text.lines().enumerate() {
            output.push_str(line);
            let counts: Vec<String> = self.requirements.rows[r]
                .iter()
                .map(u8::to_string)
                .collect();
            output.push_str("  ");
            output.push_str(&counts.join(","));
            output.push('\n');
        }
        output.push('\n');
        for (k, name) in self.colors.iter().enumerate() {
            let counts: Vec<String> = self
                .requirements
                .cols
                .iter()
                .map(|col| col[k].to_string())
                .collect();
            output.push_str(&format!("{name} cols: {}\n", counts.join(" ")));
        }
        let legend: Vec<String> = self
            .colors
            .iter()
            .enumerate()
            .map(|(k, name)| format!("{}={name}", char::from(b'A' + k as u8)))
            .collect();
        output.push_str(&format!("colors: {}\n", legend.join(" ")));
        output
    }
}

/// Blocker/lock layout policy for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Blockers mirrored to the four 180-degree rotation positions.
    Symmetrical,
    /// Uniform random cells.
    Chaotic,
}

/// Generates a puzzle with the thread-local RNG.
pub fn generate(library: &ShapeLibrary, config: &GeneratorConfig) -> Result<Puzzle, PuzzleError> {
    generate_with(library, config, &mut rand::thread_rng())
}

/// Generates a puzzle from an injected random source, so callers can seed
/// for reproducibility.
pub fn generate_with<R: Rng>(
    library: &ShapeLibrary,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Puzzle, PuzzleError> {
    let pool = check_config(library, config)?;
    let deadline = Instant::now() + config.deadline;

    loop {
        match attempt(library, config, &pool, rng) {
            Ok(puzzle) => return Ok(puzzle),
            Err(error @ (PuzzleError::NoShapesFit | PuzzleError::NoPlacement)) => {
                log::debug!("generation attempt failed: {error}");
            }
            Err(error) => return Err(error),
        }
        if Instant::now() >= deadline {
            return Err(PuzzleError::DeadlineExceeded {
                budget_ms: config.deadline.as_millis() as u64,
            });
        }
    }
}

fn check_config(
    library: &ShapeLibrary,
    config: &GeneratorConfig,
) -> Result<Vec<usize>, PuzzleError> {
    // validates dimensions and the cell-count bound
    Grid::new(config.rows, config.cols)?;

    if config.colors.is_empty() || config.colors.len() > MAX_COLORS {
        return Err(PuzzleError::invalid_config(format!(
            "palette must have 1 to {MAX_COLORS} colors, got {}",
            config.colors.len()
        )));
    }
    let mut names = FxHashSet::default();
    for name in &config.colors {
        if !names.insert(name.as_str()) {
            return Err(PuzzleError::invalid_config(format!(
                "duplicate color name '{name}'"
            )));
        }
    }

    let mut pool = Vec::new();
    if config.shape_pool.is_empty() {
        pool.extend(0..library.len());
    } else {
        let mut seen = FxHashSet::default();
        for id in &config.shape_pool {
            let Some(position) = library.position(id) else {
                return Err(PuzzleError::invalid_config(format!(
                    "unknown shape id '{id}' in the shape pool"
                )));
            };
            if seen.insert(position) {
                pool.push(position);
            }
        }
    }
    if pool.is_empty() {
        return Err(PuzzleError::invalid_config("the shape pool is empty"));
    }
    Ok(pool)
}

/// One pass of the seven-phase pipeline.
fn attempt<R: Rng>(
    library: &ShapeLibrary,
    config: &GeneratorConfig,
    pool: &[usize],
    rng: &mut R,
) -> Result<Puzzle, PuzzleError> {
    let rows = config.rows;
    let cols = config.cols;
    let num_colors = config.colors.len();
    let total_cells = rows * cols;

    // Phase 1: budget allocation
    let reserve = if config.blockers || config.locks {
        2 * (rows + cols) / 3
    } else {
        0
    };
    let budget_per_color = total_cells.saturating_sub(reserve) / num_colors;

    // Phase 2: shape selection
    let mut color_shapes: Vec<Vec<(usize, usize)>> = Vec::with_capacity(num_colors);
    let mut remainders = vec![0usize; num_colors];
    for color in 0..num_colors {
        let mut remaining = budget_per_color;
        let mut list = Vec::new();
        loop {
            let fitting: Vec<usize> = pool
                .iter()
                .copied()
                .filter(|&position| library.shapes()[position].cell_count <= remaining)
                .collect();
            let Some(&position) = fitting.choose(rng) else {
                break;
            };
            let shape = &library.shapes()[position];
            let rotation = rng.gen_range(0..shape.rotations.len());
            list.push((position, rotation));
            remaining -= shape.cell_count;
        }
        if list.is_empty() {
            return Err(PuzzleError::NoShapesFit);
        }
        remainders[color] = remaining;
        color_shapes.push(list);
    }

    // Phase 3: blocker/lock budget
    let total_remainder: usize = remainders.iter().sum::<usize>() + reserve;
    let (blocker_budget, lock_budget) = match (config.blockers, config.locks) {
        (true, true) => (total_remainder / 2, total_remainder - total_remainder / 2),
        (true, false) => (total_remainder, 0),
        (false, true) => (0, total_remainder),
        (false, false) => (0, 0),
    };

    // Phase 4: lock distribution across colors
    let mut lock_dist = vec![lock_budget / num_colors; num_colors];
    for _ in 0..lock_budget % num_colors {
        lock_dist[rng.gen_range(0..num_colors)] += 1;
    }

    // Phase 5: layout strategy
    let strategy = if rng.gen_bool(0.5) {
        Strategy::Symmetrical
    } else {
        Strategy::Chaotic
    };

    // Phase 6: placement and validation
    for _ in 0..PLACEMENT_RETRIES {
        let mut grid = Grid::new(rows, cols)?;
        place_blockers(&mut grid, blocker_budget, strategy, rng);
        place_locks(&mut grid, &lock_dist, rng);
        if let Ok(placements) = place_shapes(&mut grid, library, &color_shapes, rng) {
            return Ok(finalize(grid, placements, config));
        }
    }

    // fallback: lay the shapes on a cleared grid, then scatter the budgets
    // over whatever stayed empty
    let mut grid = Grid::new(rows, cols)?;
    let placements = place_shapes(&mut grid, library, &color_shapes, rng)?;
    let mut empties = grid.empty_cells();
    empties.shuffle(rng);
    let mut leftovers = empties.into_iter();

    let mut placed_blockers = 0;
    for _ in 0..blocker_budget {
        match leftovers.next() {
            Some(cell) => {
                grid.set(cell, CellState::Blocked);
                placed_blockers += 1;
            }
            None => break,
        }
    }
    if placed_blockers < blocker_budget {
        log::warn!("blocker budget deficit: placed {placed_blockers} of {blocker_budget}");
    }
    for (color, &count) in lock_dist.iter().enumerate() {
        let mut placed = 0;
        for _ in 0..count {
            match leftovers.next() {
                Some(cell) => {
                    grid.set(cell, CellState::Locked(Color(color as u8)));
                    placed += 1;
                }
                None => break,
            }
        }
        if placed < count {
            log::warn!(
                "lock budget deficit for '{}': placed {placed} of {count}",
                config.colors[color]
            );
        }
    }

    Ok(finalize(grid, placements, config))
}

/// Scatters blockers onto empty cells. The symmetrical strategy picks a cell
/// in the upper-left quadrant and mirrors it to the four 180-degree rotation
/// positions; the chaotic strategy draws uniform cells under an attempt cap.
fn place_blockers<R: Rng>(grid: &mut Grid, count: usize, strategy: Strategy, rng: &mut R) {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut placed = 0;

    match strategy {
        Strategy::Symmetrical => {
            while placed < count {
                let r = rng.gen_range(0..(rows + 1) / 2);
                let c = rng.gen_range(0..(cols + 1) / 2);
                let mirrors = [
                    (r, c),
                    (r, cols - 1 - c),
                    (rows - 1 - r, c),
                    (rows - 1 - r, cols - 1 - c),
                ];
                for cell in mirrors {
                    if placed >= count {
                        break;
                    }
                    if grid.state(cell) == CellState::Empty {
                        grid.set(cell, CellState::Blocked);
                        placed += 1;
                    }
                }
            }
        }
        Strategy::Chaotic => {
            let mut attempts = 0;
            while placed < count && attempts < SCATTER_ATTEMPT_FACTOR * count {
                attempts += 1;
                let cell = (rng.gen_range(0..rows), rng.gen_range(0..cols));
                if grid.state(cell) == CellState::Empty {
                    grid.set(cell, CellState::Blocked);
                    placed += 1;
                }
            }
            if placed < count {
                log::debug!("chaotic blocker scatter placed {placed} of {count}");
            }
        }
    }
}

/// Scatters each color's locks onto single random empty cells. Both layout
/// strategies place locks one at a time, under the same attempt cap.
fn place_locks<R: Rng>(grid: &mut Grid, lock_dist: &[usize], rng: &mut R) {
    let rows = grid.rows();
    let cols = grid.cols();

    for (color, &count) in lock_dist.iter().enumerate() {
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < SCATTER_ATTEMPT_FACTOR * count {
            attempts += 1;
            let cell = (rng.gen_range(0..rows), rng.gen_range(0..cols));
            if grid.state(cell) == CellState::Empty {
                grid.set(cell, CellState::Locked(Color(color as u8)));
                placed += 1;
            }
        }
        if placed < count {
            log::debug!("lock scatter for color {color} placed {placed} of {count}");
        }
    }
}

/// Lays every selected shape onto the grid, color by color. Each shape picks
/// a uniformly random anchor among those whose cells are all empty; a shape
/// with no valid anchor fails the whole subroutine.
fn place_shapes<R: Rng>(
    grid: &mut Grid,
    library: &ShapeLibrary,
    color_shapes: &[Vec<(usize, usize)>],
    rng: &mut R,
) -> Result<Vec<Vec<PlacedShape>>, PuzzleError> {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut all_placements = Vec::with_capacity(color_shapes.len());

    for (color, list) in color_shapes.iter().enumerate() {
        let mut placements = Vec::with_capacity(list.len());
        for &(position, rotation) in list {
            let cells = &library.shapes()[position].rotations[rotation];
            let (height, width) = geometry::bounds(cells);

            let mut anchors = Vec::new();
            if height <= rows && width <= cols {
                for r0 in 0..=rows - height {
                    for c0 in 0..=cols - width {
                        let all_empty = cells.iter().all(|&(dr, dc)| {
                            grid.state((r0 + dr as usize, c0 + dc as usize))
                                == CellState::Empty
                        });
                        if all_empty {
                            anchors.push((r0, c0));
                        }
                    }
                }
            }

            let Some(&anchor) = anchors.choose(rng) else {
                return Err(PuzzleError::NoPlacement);
            };
            let placed = PlacedShape::at(position, rotation, cells, anchor);
            for &cell in placed.cells() {
                grid.set(cell, CellState::Filled(Color(color as u8)));
            }
            placements.push(placed);
        }
        all_placements.push(placements);
    }

    Ok(all_placements)
}

/// Phase 7: reads blockers, locks, the solution, and the row/column
/// requirements off the finalized grid.
fn finalize(grid: Grid, placements: Vec<Vec<PlacedShape>>, config: &GeneratorConfig) -> Puzzle {
    let num_colors = config.colors.len();

    let mut blockers = Vec::new();
    let mut locks = vec![Vec::new(); num_colors];
    for cell in grid.iter_cells() {
        match grid.state(cell) {
            CellState::Blocked => blockers.push(cell),
            CellState::Locked(k) => locks[k.index()].push(cell),
            _ => {}
        }
    }

    let solution: Vec<Vec<Cell>> = placements
        .iter()
        .map(|color_placements| {
            let mut cells: Vec<Cell> = color_placements
                .iter()
                .flat_map(|placed| placed.cells().to_vec())
                .collect();
            cells.sort_unstable();
            cells
        })
        .collect();

    let requirements = Requirements::derive(&grid, num_colors);
    log::debug!(
        "generated {}x{} puzzle: {} blockers, {} locks",
        grid.rows(),
        grid.cols(),
        blockers.len(),
        locks.iter().map(Vec::len).sum::<usize>()
    );

    Puzzle {
        grid,
        colors: config.colors.clone(),
        shapes: placements,
        blockers,
        locks,
        requirements,
        solution,
    }
}
