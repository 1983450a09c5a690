//! 2D rotation and normalization utilities.
//!
//! A polyomino has at most 4 orientations under quarter-turn rotation.
//! Rotations are generated from the base form and deduplicated, so symmetric
//! shapes (lines, squares, crosses) store fewer.

/// A shape-space coordinate `(row, col)`.
///
/// May go negative mid-rotation; stored forms are always renormalized so the
/// minimum row and column are zero.
pub type Coord = (i32, i32);

/// Rotates a coordinate 90 degrees clockwise: `(r, c) -> (c, -r)`.
#[inline]
pub fn rotate_cw((r, c): Coord) -> Coord {
    (c, -r)
}

/// Translates coordinates so the minimum row and column are both zero.
///
/// The cells are returned sorted, so two shapes that differ only by
/// translation or listing order compare equal as slices.
pub fn normalize_to_origin(mut cells: Vec<Coord>) -> Vec<Coord> {
    let min_r = cells.iter().map(|&(r, _)| r).min().unwrap_or(0);
    let min_c = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);

    for (r, c) in &mut cells {
        *r -= min_r;
        *c -= min_c;
    }

    cells.sort_unstable();
    cells
}

/// Generates the unique rotations of a normalized shape.
///
/// Index 0 is the base form. Quarter turns are applied repeatedly and
/// renormalized; generation stops at the first rotation that equals one
/// already recorded, which under the 4-cycle is always the base.
pub fn unique_rotations(base: &[Coord]) -> Vec<Vec<Coord>> {
    let mut rotations = vec![base.to_vec()];
    let mut current = base.to_vec();

    for _ in 0..3 {
        current = normalize_to_origin(current.iter().map(|&cell| rotate_cw(cell)).collect());
        if rotations.iter().any(|recorded| recorded == &current) {
            break;
        }
        rotations.push(current.clone());
    }

    rotations
}

/// Bounding box `(height, width)` of a normalized cell list.
pub fn bounds(cells: &[Coord]) -> (usize, usize) {
    let height = cells.iter().map(|&(r, _)| r).max().map_or(0, |m| m + 1);
    let width = cells.iter().map(|&(_, c)| c).max().map_or(0, |m| m + 1);
    (height as usize, width as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_cw_quarter_turns_cycle() {
        let start = (1, 2);
        let once = rotate_cw(start);
        assert_eq!(once, (2, -1));
        let full = rotate_cw(rotate_cw(rotate_cw(once)));
        assert_eq!(full, start, "four quarter turns must be the identity");
    }

    #[test]
    fn test_normalize_shifts_and_sorts() {
        let cells = vec![(2, -1), (1, -1), (1, 0)];
        assert_eq!(normalize_to_origin(cells), vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_to_origin(vec![(3, 3), (3, 4), (4, 3)]);
        assert_eq!(normalize_to_origin(once.clone()), once);
    }

    #[test]
    fn test_line_has_two_rotations() {
        let rotations = unique_rotations(&[(0, 0), (0, 1), (0, 2)]);
        assert_eq!(rotations.len(), 2);
        assert_eq!(rotations[1], vec![(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_square_has_one_rotation() {
        let rotations = unique_rotations(&[(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(rotations.len(), 1);
    }

    #[test]
    fn test_rotations_stay_normalized_and_sized() {
        let base = vec![(0, 0), (1, 0), (2, 0), (2, 1)];
        for rotation in unique_rotations(&base) {
            assert_eq!(rotation.len(), base.len());
            assert_eq!(rotation.iter().map(|&(r, _)| r).min(), Some(0));
            assert_eq!(rotation.iter().map(|&(_, c)| c).min(), Some(0));
        }
    }

    #[test]
    fn test_bounds_transpose_under_rotation() {
        let rotations = unique_rotations(&[(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(bounds(&rotations[0]), (1, 4));
        assert_eq!(bounds(&rotations[1]), (4, 1));
    }
}
