//! Shape definitions and the indexed shape library.
//!
//! Each shape is a set of unit cells normalized to start at the origin. The
//! library precomputes every unique rotation at build time so the solver and
//! generator never rotate during search.

use rustc_hash::FxHashMap;

use crate::error::PuzzleError;
use crate::geometry::{self, Coord};
use crate::grid::Cell;

/// Maximum number of cells in any single shape.
pub const MAX_SHAPE_CELLS: usize = 8;

/// The built-in shape palette.
///
/// Each entry is `(id, name, base cells)`; cells are listed with the minimum
/// row and column at zero.
pub const DEFAULT_SHAPES: &[(&str, &str, &[Coord])] = &[
    // two in a row
    ("domino-2", "Domino", &[(0, 0), (0, 1)]),
    // three in a row
    ("line-3", "Triple Line", &[(0, 0), (0, 1), (0, 2)]),
    // right angle of three
    ("corner-3", "Corner", &[(0, 0), (0, 1), (1, 0)]),
    // four in a row
    ("line-4", "Quad Line", &[(0, 0), (0, 1), (0, 2), (0, 3)]),
    // two by two block
    ("square-4", "Square", &[(0, 0), (0, 1), (1, 0), (1, 1)]),
    // vertical edge with a foot
    ("l-4", "Ell", &[(0, 0), (1, 0), (2, 0), (2, 1)]),
    // offset pair of dominoes
    ("s-4", "Ess", &[(0, 1), (0, 2), (1, 0), (1, 1)]),
    // row of three with a stem
    ("t-4", "Tee", &[(0, 0), (0, 1), (0, 2), (1, 1)]),
    // plus sign
    ("cross-5", "Cross", &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)]),
];

/// A shape definition as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDef {
    /// Stable string identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Base cells; normalized during the build.
    pub cells: Vec<Coord>,
}

/// A library entry: the canonical base form plus its unique rotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub id: String,
    pub name: String,
    /// `rotations[0]` is the normalized base form. All entries are normalized
    /// and pairwise distinct as cell sets.
    pub rotations: Vec<Vec<Coord>>,
    /// Cell count, identical across every rotation.
    pub cell_count: usize,
}

impl Shape {
    /// Bounding box `(height, width)` of one rotation.
    pub fn bounds(&self, rotation: usize) -> (usize, usize) {
        geometry::bounds(&self.rotations[rotation])
    }
}

/// Indexed collection of shapes with rotations precomputed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeLibrary {
    shapes: Vec<Shape>,
    index: FxHashMap<String, usize>,
}

impl ShapeLibrary {
    /// Builds a library from definitions, rejecting duplicate ids and shapes
    /// that are empty or larger than [`MAX_SHAPE_CELLS`].
    pub fn build(definitions: &[ShapeDef]) -> Result<Self, PuzzleError> {
        let mut shapes = Vec::with_capacity(definitions.len());
        let mut index = FxHashMap::default();

        for def in definitions {
            if def.cells.is_empty() || def.cells.len() > MAX_SHAPE_CELLS {
                return Err(PuzzleError::invalid_config(format!(
                    "shape '{}' must have 1 to {MAX_SHAPE_CELLS} cells, got {}",
                    def.id,
                    def.cells.len()
                )));
            }

            let base = geometry::normalize_to_origin(def.cells.clone());
            if base.windows(2).any(|pair| pair[0] == pair[1]) {
                return Err(PuzzleError::invalid_config(format!(
                    "shape '{}' repeats a cell",
                    def.id
                )));
            }

            if index.insert(def.id.clone(), shapes.len()).is_some() {
                return Err(PuzzleError::DuplicateShapeId {
                    id: def.id.clone(),
                });
            }

            let cell_count = base.len();
            shapes.push(Shape {
                id: def.id.clone(),
                name: def.name.clone(),
                rotations: geometry::unique_rotations(&base),
                cell_count,
            });
        }

        Ok(Self { shapes, index })
    }

    /// Builds the library of [`DEFAULT_SHAPES`].
    pub fn default_set() -> Self {
        let definitions: Vec<ShapeDef> = DEFAULT_SHAPES
            .iter()
            .map(|&(id, name, cells)| ShapeDef {
                id: id.to_string(),
                name: name.to_string(),
                cells: cells.to_vec(),
            })
            .collect();
        // the built-in table is static and known valid
        Self::build(&definitions).expect("built-in shape table is valid")
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.index.get(id).map(|&idx| &self.shapes[idx])
    }

    /// Library position of an id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All entries in definition order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// All ids in definition order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().map(|shape| shape.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// A shape rotation placed at a specific grid anchor.
///
/// Uses a fixed-size array to avoid heap allocation in the solver's hot loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedShape {
    /// Library position of the shape.
    pub shape: usize,
    /// Rotation index into the shape's rotation list.
    pub rotation: usize,
    /// Top-left anchor `(r0, c0)`.
    pub anchor: Cell,
    /// Absolute grid cells, valid up to `cell_count`.
    pub positions: [Cell; MAX_SHAPE_CELLS],
    pub cell_count: u8,
}

impl PlacedShape {
    /// Positions a rotation at an anchor. All cells must already be known to
    /// fit the grid; this only does the coordinate arithmetic.
    pub fn at(shape: usize, rotation: usize, cells: &[Coord], anchor: Cell) -> Self {
        let mut positions = [(0, 0); MAX_SHAPE_CELLS];
        for (slot, &(dr, dc)) in positions.iter_mut().zip(cells) {
            *slot = (anchor.0 + dr as usize, anchor.1 + dc as usize);
        }
        Self {
            shape,
            rotation,
            anchor,
            positions,
            cell_count: cells.len() as u8,
        }
    }

    /// The valid cell positions for this placement.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.positions[..self.cell_count as usize]
    }
}
