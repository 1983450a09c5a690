//! Backtracking solver for row/column color-count puzzles.
//!
//! Key representation choices:
//! - One `u128` bitmask per cell set, so overlap checks are a single AND
//! - Placements precomputed per shape rotation and anchor, sorted by their
//!   minimum cell position for a fixed exploration order
//! - Fixed-size cell arrays inside [`PlacedShape`] to avoid heap allocation
//!   in the hot loop
//! - Colors solved sequentially, each color's cells feeding the next color's
//!   forbidden mask

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::PuzzleError;
use crate::geometry;
use crate::grid::{mask_to_cells, Cell, CellState, Color, Grid, Requirements, MAX_COLORS};
use crate::shapes::{PlacedShape, ShapeLibrary};

/// Hard cap on solutions recorded by one per-color search.
pub const MAX_COLOR_SOLUTIONS: usize = 100;

/// Hard cap on whole-puzzle solutions across the color cross-product.
pub const MAX_PUZZLE_SOLUTIONS: usize = 50;

/// Hard bound on the fit-all search; the backtrack stops at its first
/// complete assignment well before reaching it.
pub const MAX_FIT_SOLUTIONS: usize = 50;

/// A pre-validated placement: a shape rotation at an anchor, with its
/// occupancy bitmask.
#[derive(Clone, Copy)]
struct Candidate {
    placed: PlacedShape,
    mask: u128,
}

/// One color's share of a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSolution {
    pub placements: Vec<PlacedShape>,
    /// Cells covered by the placements, in row-major order.
    pub cells: Vec<Cell>,
    pub(crate) mask: u128,
}

/// A whole-puzzle solution: one entry per color, in palette order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub colors: Vec<ColorSolution>,
}

/// Finds whole-puzzle solutions where any number of each enabled shape may
/// be used.
///
/// The input grid constrains the search through its blocked and locked cells
/// only; filled cells (e.g. the witness overlay on a generated puzzle) are
/// treated as empty.
pub fn solve_counts(
    grid: &Grid,
    requirements: &Requirements,
    library: &ShapeLibrary,
    enabled_shapes: &[String],
) -> Result<Vec<Solution>, PuzzleError> {
    let positions = resolve_shapes(library, enabled_shapes.iter().map(String::as_str))?;
    solve_with(grid, requirements, library, &positions, None)
}

/// Finds whole-puzzle solutions consuming at most the supplied shape multiset
/// per color (`shape_counts[k]` maps shape id to instance count for color
/// `k`). Every instance is used at most once; unused instances are allowed.
pub fn solve_exact_counts(
    grid: &Grid,
    requirements: &Requirements,
    library: &ShapeLibrary,
    shape_counts: &[FxHashMap<String, usize>],
) -> Result<Vec<Solution>, PuzzleError> {
    let num_colors = requirements.num_colors();
    if shape_counts.len() != num_colors {
        return Err(PuzzleError::invalid_config(format!(
            "expected {num_colors} shape multisets, got {}",
            shape_counts.len()
        )));
    }

    let mut positions = Vec::new();
    let mut seen = FxHashSet::default();
    let mut per_color = vec![vec![0usize; library.len()]; num_colors];
    for (color, counts) in shape_counts.iter().enumerate() {
        // map iteration order is not deterministic; sort the ids
        let mut ids: Vec<&str> = counts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        for id in ids {
            let Some(position) = library.position(id) else {
                return Err(PuzzleError::invalid_config(format!(
                    "unknown shape id '{id}'"
                )));
            };
            let count = counts[id];
            per_color[color][position] = count;
            if count > 0 && seen.insert(position) {
                positions.push(position);
            }
        }
    }

    solve_with(grid, requirements, library, &positions, Some(per_color))
}

/// Places every instance of the multiset on the grid with no overlap,
/// ignoring requirements. First-solution-first: the backtrack stops at its
/// first complete assignment, with [`MAX_FIT_SOLUTIONS`] as the hard bound.
pub fn fit_all_pieces(
    rows: usize,
    cols: usize,
    blocked_cells: &[Cell],
    library: &ShapeLibrary,
    shape_counts: &FxHashMap<String, usize>,
) -> Result<Vec<Vec<PlacedShape>>, PuzzleError> {
    let mut grid = Grid::new(rows, cols)?;
    for &(r, c) in blocked_cells {
        if r >= rows || c >= cols {
            return Err(PuzzleError::invalid_config(format!(
                "blocked cell ({r}, {c}) is outside the {rows}x{cols} grid"
            )));
        }
        grid.set((r, c), CellState::Blocked);
    }

    // fixed instance order: ids sorted, each repeated by its count
    let mut ids: Vec<&str> = shape_counts.keys().map(String::as_str).collect();
    ids.sort_unstable();
    let mut positions = Vec::new();
    let mut instances = Vec::new();
    for id in ids {
        let Some(position) = library.position(id) else {
            return Err(PuzzleError::invalid_config(format!(
                "unknown shape id '{id}'"
            )));
        };
        let count = shape_counts[id];
        if count > 0 {
            positions.push(position);
            instances.extend(std::iter::repeat(position).take(count));
        }
    }

    let candidates = enumerate_candidates(&grid, library, &positions, grid.blocked_mask());
    if candidates.is_empty() && !instances.is_empty() {
        return Err(PuzzleError::NoPlacement);
    }

    let mut by_shape: Vec<Vec<usize>> = vec![Vec::new(); library.len()];
    for (i, candidate) in candidates.iter().enumerate() {
        by_shape[candidate.placed.shape].push(i);
    }

    let mut search = FitSearch {
        candidates: &candidates,
        by_shape: &by_shape,
        instances: &instances,
        used: 0,
        stack: Vec::new(),
        solutions: Vec::new(),
    };
    search.run(0);

    if search.solutions.is_empty() {
        return Err(PuzzleError::NoSolution);
    }
    Ok(search.solutions)
}

/// Per-color row/column differences (actual minus required) and cross-color
/// cell overlaps. Purely descriptive; the search never consults it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub row_diffs: Vec<Vec<i32>>,
    pub col_diffs: Vec<Vec<i32>>,
    /// Cells claimed by more than one color.
    pub overlaps: Vec<Cell>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.overlaps.is_empty()
            && self.row_diffs.iter().flatten().all(|&diff| diff == 0)
            && self.col_diffs.iter().flatten().all(|&diff| diff == 0)
    }
}

/// Compares a solution against the requirements. Locked cells count toward
/// their color, exactly as [`Requirements::derive`] counts them.
pub fn validate(grid: &Grid, solution: &Solution, requirements: &Requirements) -> ValidationReport {
    let num_colors = requirements.num_colors();
    let mut row_actual = vec![vec![0i32; num_colors]; grid.rows()];
    let mut col_actual = vec![vec![0i32; num_colors]; grid.cols()];

    for cell in grid.iter_cells() {
        if let CellState::Locked(k) = grid.state(cell) {
            if k.index() < num_colors {
                row_actual[cell.0][k.index()] += 1;
                col_actual[cell.1][k.index()] += 1;
            }
        }
    }

    let mut claims: FxHashMap<Cell, usize> = FxHashMap::default();
    let mut overlaps = Vec::new();
    for (color, color_solution) in solution.colors.iter().enumerate().take(num_colors) {
        for &cell in &color_solution.cells {
            row_actual[cell.0][color] += 1;
            col_actual[cell.1][color] += 1;
            let seen = claims.entry(cell).or_insert(0);
            *seen += 1;
            if *seen == 2 {
                overlaps.push(cell);
            }
        }
    }
    overlaps.sort_unstable();

    let diff = |actual: Vec<Vec<i32>>, required: &[Vec<u8>]| {
        actual
            .into_iter()
            .zip(required)
            .map(|(have, want)| {
                have.into_iter()
                    .zip(want)
                    .map(|(a, &w)| a - i32::from(w))
                    .collect()
            })
            .collect()
    };

    ValidationReport {
        row_diffs: diff(row_actual, &requirements.rows),
        col_diffs: diff(col_actual, &requirements.cols),
        overlaps,
    }
}

fn resolve_shapes<'a>(
    library: &ShapeLibrary,
    ids: impl Iterator<Item = &'a str>,
) -> Result<Vec<usize>, PuzzleError> {
    let mut seen = FxHashSet::default();
    let mut positions = Vec::new();
    for id in ids {
        let Some(position) = library.position(id) else {
            return Err(PuzzleError::invalid_config(format!(
                "unknown shape id '{id}'"
            )));
        };
        if seen.insert(position) {
            positions.push(position);
        }
    }
    Ok(positions)
}

/// Enumerates every pre-valid placement: each shape, each rotation, each
/// anchor whose bounding box fits the grid and whose cells avoid `blocked`.
/// The result is sorted by minimum cell position `r * C + c`, which is the
/// lowest set bit of the mask.
fn enumerate_candidates(
    grid: &Grid,
    library: &ShapeLibrary,
    shape_positions: &[usize],
    blocked: u128,
) -> Vec<Candidate> {
    let rows = grid.rows();
    let cols = grid.cols();
    let mut candidates = Vec::new();

    for &position in shape_positions {
        let shape = &library.shapes()[position];
        for (rotation, cells) in shape.rotations.iter().enumerate() {
            let (height, width) = geometry::bounds(cells);
            if height > rows || width > cols {
                continue;
            }
            for r0 in 0..=rows - height {
                for c0 in 0..=cols - width {
                    let placed = PlacedShape::at(position, rotation, cells, (r0, c0));
                    let mut mask = 0u128;
                    for &cell in placed.cells() {
                        mask |= grid.bit(cell);
                    }
                    if mask & blocked != 0 {
                        continue;
                    }
                    candidates.push(Candidate { placed, mask });
                }
            }
        }
    }

    candidates.sort_by_key(|candidate| candidate.mask.trailing_zeros());
    candidates
}

fn check_inputs(grid: &Grid, requirements: &Requirements) -> Result<usize, PuzzleError> {
    if requirements.rows.len() != grid.rows() || requirements.cols.len() != grid.cols() {
        return Err(PuzzleError::invalid_config(
            "requirement vectors do not match the grid dimensions",
        ));
    }
    let num_colors = requirements.num_colors();
    if num_colors == 0 || num_colors > MAX_COLORS {
        return Err(PuzzleError::invalid_config(format!(
            "palette must have 1 to {MAX_COLORS} colors, got {num_colors}"
        )));
    }
    if requirements
        .rows
        .iter()
        .chain(&requirements.cols)
        .any(|counts| counts.len() != num_colors)
    {
        return Err(PuzzleError::invalid_config(
            "ragged requirement vectors: every row and column needs one count per color",
        ));
    }
    for cell in grid.iter_cells() {
        if let CellState::Locked(k) | CellState::Filled(k) = grid.state(cell) {
            if k.index() >= num_colors {
                return Err(PuzzleError::invalid_config(format!(
                    "grid cell color {} is outside the {num_colors}-color palette",
                    k.0
                )));
            }
        }
    }
    Ok(num_colors)
}

fn solve_with(
    grid: &Grid,
    requirements: &Requirements,
    library: &ShapeLibrary,
    shape_positions: &[usize],
    per_color_remaining: Option<Vec<Vec<usize>>>,
) -> Result<Vec<Solution>, PuzzleError> {
    let num_colors = check_inputs(grid, requirements)?;
    if requirements.is_all_zero() {
        return Err(PuzzleError::NoRequirements);
    }

    let blocked = grid.blocked_mask();
    let candidates = enumerate_candidates(grid, library, shape_positions, blocked);
    if candidates.is_empty() {
        return Err(PuzzleError::NoPlacement);
    }

    let base_forbidden = blocked | grid.locked_mask();
    let mut solutions = Vec::new();
    let mut partial = Vec::with_capacity(num_colors);
    compose(
        grid,
        requirements,
        &candidates,
        per_color_remaining.as_deref(),
        base_forbidden,
        0,
        num_colors,
        &mut partial,
        &mut solutions,
    );

    if solutions.is_empty() {
        return Err(PuzzleError::NoSolution);
    }
    Ok(solutions)
}

/// Depth-first cross-product over colors. Returns true once the whole-puzzle
/// cap is reached.
#[allow(clippy::too_many_arguments)]
fn compose(
    grid: &Grid,
    requirements: &Requirements,
    candidates: &[Candidate],
    per_color_remaining: Option<&[Vec<usize>]>,
    forbidden: u128,
    color: usize,
    num_colors: usize,
    partial: &mut Vec<ColorSolution>,
    solutions: &mut Vec<Solution>,
) -> bool {
    if color == num_colors {
        solutions.push(Solution {
            colors: partial.clone(),
        });
        return solutions.len() >= MAX_PUZZLE_SOLUTIONS;
    }

    let remaining = per_color_remaining.map(|per| per[color].clone());
    let color_solutions =
        ColorSearch::new(grid, requirements, color, candidates, forbidden, remaining).run();

    for color_solution in color_solutions {
        let mask = color_solution.mask;
        partial.push(color_solution);
        let stop = compose(
            grid,
            requirements,
            candidates,
            per_color_remaining,
            forbidden | mask,
            color + 1,
            num_colors,
            partial,
            solutions,
        );
        partial.pop();
        if stop {
            return true;
        }
    }
    false
}

/// Backtracking state for one color.
struct ColorSearch<'a> {
    candidates: &'a [Candidate],
    cols: usize,
    row_req: Vec<u8>,
    col_req: Vec<u8>,
    row_counts: Vec<u8>,
    col_counts: Vec<u8>,
    forbidden: u128,
    used: u128,
    stack: Vec<usize>,
    /// Remaining uses per library shape position; `None` in free-count mode.
    remaining: Option<Vec<usize>>,
    solutions: Vec<ColorSolution>,
}

impl<'a> ColorSearch<'a> {
    fn new(
        grid: &Grid,
        requirements: &Requirements,
        color: usize,
        candidates: &'a [Candidate],
        forbidden: u128,
        remaining: Option<Vec<usize>>,
    ) -> Self {
        let mut row_counts = vec![0u8; grid.rows()];
        let mut col_counts = vec![0u8; grid.cols()];
        // locked cells of this color are pre-placed and seed the tallies
        for (r, c) in grid.locked_cells(Color(color as u8)) {
            row_counts[r] += 1;
            col_counts[c] += 1;
        }

        Self {
            candidates,
            cols: grid.cols(),
            row_req: requirements.rows.iter().map(|counts| counts[color]).collect(),
            col_req: requirements.cols.iter().map(|counts| counts[color]).collect(),
            row_counts,
            col_counts,
            forbidden,
            used: 0,
            stack: Vec::new(),
            remaining,
            solutions: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<ColorSolution> {
        self.search(0);
        self.solutions
    }

    /// Returns true once the per-color cap is reached.
    fn search(&mut self, start: usize) -> bool {
        if self.row_counts == self.row_req && self.col_counts == self.col_req {
            self.record();
            if self.solutions.len() >= MAX_COLOR_SOLUTIONS {
                return true;
            }
            // do not return: alternative stacks may match as well
        }
        if self.overshot() {
            return false;
        }

        for i in start..self.candidates.len() {
            let candidate = self.candidates[i];
            if candidate.mask & (self.used | self.forbidden) != 0 {
                continue;
            }
            if let Some(remaining) = &self.remaining {
                if remaining[candidate.placed.shape] == 0 {
                    continue;
                }
            }
            self.place(&candidate, i);
            let stop = self.search(i + 1);
            self.unplace(&candidate);
            if stop {
                return true;
            }
        }
        false
    }

    fn overshot(&self) -> bool {
        self.row_counts
            .iter()
            .zip(&self.row_req)
            .any(|(have, want)| have > want)
            || self
                .col_counts
                .iter()
                .zip(&self.col_req)
                .any(|(have, want)| have > want)
    }

    fn place(&mut self, candidate: &Candidate, index: usize) {
        self.used |= candidate.mask;
        for &(r, c) in candidate.placed.cells() {
            self.row_counts[r] += 1;
            self.col_counts[c] += 1;
        }
        if let Some(remaining) = &mut self.remaining {
            remaining[candidate.placed.shape] -= 1;
        }
        self.stack.push(index);
    }

    fn unplace(&mut self, candidate: &Candidate) {
        self.used ^= candidate.mask;
        for &(r, c) in candidate.placed.cells() {
            self.row_counts[r] -= 1;
            self.col_counts[c] -= 1;
        }
        if let Some(remaining) = &mut self.remaining {
            remaining[candidate.placed.shape] += 1;
        }
        self.stack.pop();
    }

    fn record(&mut self) {
        let placements = self
            .stack
            .iter()
            .map(|&i| self.candidates[i].placed)
            .collect();
        self.solutions.push(ColorSolution {
            placements,
            cells: mask_to_cells(self.used, self.cols),
            mask: self.used,
        });
    }
}

/// Backtracking state for the fit-all search.
struct FitSearch<'a> {
    candidates: &'a [Candidate],
    by_shape: &'a [Vec<usize>],
    instances: &'a [usize],
    used: u128,
    stack: Vec<usize>,
    solutions: Vec<Vec<PlacedShape>>,
}

impl<'a> FitSearch<'a> {
    /// Returns true once the search should stop.
    fn run(&mut self, instance: usize) -> bool {
        if instance == self.instances.len() {
            self.solutions.push(
                self.stack
                    .iter()
                    .map(|&i| self.candidates[i].placed)
                    .collect(),
            );
            // first success wins, well before the MAX_FIT_SOLUTIONS backstop
            return true;
        }

        let shape = self.instances[instance];
        let slot_count = self.by_shape[shape].len();
        for slot in 0..slot_count {
            let i = self.by_shape[shape][slot];
            let candidate = self.candidates[i];
            if candidate.mask & self.used != 0 {
                continue;
            }
            self.used |= candidate.mask;
            self.stack.push(i);
            let stop = self.run(instance + 1);
            self.stack.pop();
            self.used ^= candidate.mask;
            if stop {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> ShapeLibrary {
        ShapeLibrary::default_set()
    }

    fn counts(pairs: &[(&str, usize)]) -> FxHashMap<String, usize> {
        pairs
            .iter()
            .map(|&(id, count)| (id.to_string(), count))
            .collect()
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// 1x4 grid, green on the left half and blue on the right, dominoes only.
    fn two_color_strip() -> (Grid, Requirements) {
        let grid = Grid::new(1, 4).unwrap();
        let requirements = Requirements {
            rows: vec![vec![2, 2]],
            cols: vec![vec![1, 0], vec![1, 0], vec![0, 1], vec![0, 1]],
        };
        (grid, requirements)
    }

    #[test]
    fn test_single_square_exact_cover() {
        let library = library();
        let grid = Grid::new(2, 2).unwrap();
        let requirements = Requirements {
            rows: vec![vec![2], vec![2]],
            cols: vec![vec![2], vec![2]],
        };

        let solutions =
            solve_counts(&grid, &requirements, &library, &ids(&["square-4"])).unwrap();
        assert_eq!(solutions.len(), 1);
        let green = &solutions[0].colors[0];
        assert_eq!(green.placements.len(), 1);
        assert_eq!(green.cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(validate(&grid, &solutions[0], &requirements).is_clean());
    }

    #[test]
    fn test_two_colors_compose_sequentially() {
        let library = library();
        let (grid, requirements) = two_color_strip();

        let solutions =
            solve_counts(&grid, &requirements, &library, &ids(&["domino-2"])).unwrap();
        assert_eq!(solutions.len(), 1);
        let solution = &solutions[0];
        assert_eq!(solution.colors[0].cells, vec![(0, 0), (0, 1)]);
        assert_eq!(solution.colors[1].cells, vec![(0, 2), (0, 3)]);
        assert!(validate(&grid, solution, &requirements).is_clean());
    }

    #[test]
    fn test_zero_requirement_color_is_vacuous() {
        let library = library();
        let grid = Grid::new(2, 2).unwrap();
        let requirements = Requirements {
            rows: vec![vec![2, 0], vec![2, 0]],
            cols: vec![vec![2, 0], vec![2, 0]],
        };

        let solutions =
            solve_counts(&grid, &requirements, &library, &ids(&["square-4"])).unwrap();
        assert_eq!(solutions.len(), 1);
        assert!(solutions[0].colors[1].placements.is_empty());
        assert!(solutions[0].colors[1].cells.is_empty());
    }

    #[test]
    fn test_all_zero_requirements_rejected() {
        let library = library();
        let grid = Grid::new(3, 3).unwrap();
        let requirements = Requirements::zeros(3, 3, 1);
        assert_eq!(
            solve_counts(&grid, &requirements, &library, &ids(&["line-3"])),
            Err(PuzzleError::NoRequirements)
        );
    }

    #[test]
    fn test_fully_blocked_grid_has_no_placements() {
        let library = library();
        let mut grid = Grid::new(2, 2).unwrap();
        for cell in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            grid.set(cell, CellState::Blocked);
        }
        let requirements = Requirements {
            rows: vec![vec![1], vec![1]],
            cols: vec![vec![1], vec![1]],
        };
        assert_eq!(
            solve_counts(&grid, &requirements, &library, &ids(&["domino-2"])),
            Err(PuzzleError::NoPlacement)
        );
    }

    #[test]
    fn test_shape_larger_than_grid_has_no_placements() {
        let library = library();
        let grid = Grid::new(2, 2).unwrap();
        let requirements = Requirements {
            rows: vec![vec![2], vec![2]],
            cols: vec![vec![2], vec![2]],
        };
        assert_eq!(
            solve_counts(&grid, &requirements, &library, &ids(&["cross-5"])),
            Err(PuzzleError::NoPlacement)
        );
    }

    #[test]
    fn test_impossible_counts_exhaust() {
        let library = library();
        let grid = Grid::new(3, 3).unwrap();
        let requirements = Requirements {
            rows: vec![vec![3]; 3],
            cols: vec![vec![3]; 3],
        };
        assert_eq!(
            solve_counts(&grid, &requirements, &library, &ids(&["square-4"])),
            Err(PuzzleError::NoSolution)
        );
    }

    #[test]
    fn test_single_row_grid_only_fits_horizontal_rotations() {
        let library = library();
        let grid = Grid::new(1, 3).unwrap();
        let requirements = Requirements {
            rows: vec![vec![3]],
            cols: vec![vec![1]; 3],
        };
        let solutions = solve_counts(&grid, &requirements, &library, &ids(&["line-3"])).unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].colors[0].cells, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn test_whole_puzzle_cap_holds() {
        let library = library();
        let grid = Grid::new(4, 4).unwrap();
        let requirements = Requirements {
            rows: vec![vec![2]; 4],
            cols: vec![vec![2]; 4],
        };
        let solutions =
            solve_counts(&grid, &requirements, &library, &ids(&["domino-2"])).unwrap();
        assert!(!solutions.is_empty());
        assert!(solutions.len() <= MAX_PUZZLE_SOLUTIONS);
        for solution in &solutions {
            assert!(validate(&grid, solution, &requirements).is_clean());
        }
    }

    #[test]
    fn test_locked_cells_seed_counts_and_forbid_overlap() {
        let library = library();
        let mut grid = Grid::new(1, 4).unwrap();
        grid.set((0, 3), CellState::Locked(Color(0)));
        let requirements = Requirements {
            rows: vec![vec![3]],
            cols: vec![vec![1], vec![1], vec![0], vec![1]],
        };

        let solutions =
            solve_counts(&grid, &requirements, &library, &ids(&["domino-2"])).unwrap();
        assert_eq!(solutions.len(), 1);
        // the lock supplies column 3; the domino covers columns 0-1
        assert_eq!(solutions[0].colors[0].cells, vec![(0, 0), (0, 1)]);
        assert!(validate(&grid, &solutions[0], &requirements).is_clean());
    }

    #[test]
    fn test_exact_counts_limit_shape_uses() {
        let library = library();
        let grid = Grid::new(1, 4).unwrap();
        let requirements = Requirements {
            rows: vec![vec![4]],
            cols: vec![vec![1]; 4],
        };

        let enough = solve_exact_counts(
            &grid,
            &requirements,
            &library,
            &[counts(&[("domino-2", 2)])],
        )
        .unwrap();
        assert_eq!(enough.len(), 1);
        assert_eq!(enough[0].colors[0].placements.len(), 2);

        let starved = solve_exact_counts(
            &grid,
            &requirements,
            &library,
            &[counts(&[("domino-2", 1)])],
        );
        assert_eq!(starved, Err(PuzzleError::NoSolution));
    }

    #[test]
    fn test_exact_counts_reject_mismatched_multisets() {
        let library = library();
        let (grid, requirements) = two_color_strip();
        let result = solve_exact_counts(
            &grid,
            &requirements,
            &library,
            &[counts(&[("domino-2", 2)])],
        );
        assert!(matches!(result, Err(PuzzleError::InvalidConfig { .. })));
    }

    #[test]
    fn test_fit_all_squares_tile_the_grid() {
        let library = library();
        let solutions =
            fit_all_pieces(4, 4, &[], &library, &counts(&[("square-4", 4)])).unwrap();
        assert_eq!(solutions.len(), 1);
        let tiling = &solutions[0];
        assert_eq!(tiling.len(), 4);
        let mut covered: Vec<Cell> = tiling.iter().flat_map(|p| p.cells().to_vec()).collect();
        covered.sort_unstable();
        covered.dedup();
        assert_eq!(covered.len(), 16, "squares must tile all 16 cells");
    }

    #[test]
    fn test_fit_all_respects_blockers() {
        let library = library();
        let result = fit_all_pieces(2, 2, &[(0, 0)], &library, &counts(&[("square-4", 1)]));
        assert_eq!(result, Err(PuzzleError::NoSolution));
    }

    #[test]
    fn test_fit_all_without_any_anchor() {
        let library = library();
        let result = fit_all_pieces(2, 2, &[], &library, &counts(&[("line-3", 1)]));
        assert_eq!(result, Err(PuzzleError::NoPlacement));
    }

    #[test]
    fn test_validate_reports_overlap_and_diffs() {
        let library = library();
        let (grid, requirements) = two_color_strip();
        let solutions =
            solve_counts(&grid, &requirements, &library, &ids(&["domino-2"])).unwrap();

        // corrupt the solution: point both colors at the same cells
        let mut bogus = solutions[0].clone();
        bogus.colors[1] = bogus.colors[0].clone();
        let report = validate(&grid, &bogus, &requirements);
        assert!(!report.is_clean());
        assert_eq!(report.overlaps, vec![(0, 0), (0, 1)]);
        assert_eq!(report.col_diffs[3], vec![0, -1]);
    }

    #[test]
    fn test_unknown_shape_id_rejected() {
        let library = library();
        let grid = Grid::new(2, 2).unwrap();
        let requirements = Requirements {
            rows: vec![vec![2], vec![2]],
            cols: vec![vec![2], vec![2]],
        };
        assert!(matches!(
            solve_counts(&grid, &requirements, &library, &ids(&["mystery-9"])),
            Err(PuzzleError::InvalidConfig { .. })
        ));
    }
}
