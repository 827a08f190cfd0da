//! Vertex-connected marching-cubes lookup table.
//!
//! Unlike classic marching cubes, triangles here connect cube corners rather
//! than edge midpoints, so every mesh vertex is a voxel position. The table
//! maps each of the 256 inside/outside corner configurations to at most
//! three triangles. It is generated from 23 hand-written base patterns by
//! applying all 48 symmetries of the cube; the first symmetry that produces a
//! configuration defines its entry.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use nalgebra::Vector3;

use crate::geometry::oriented_unit_normal;

/// Unit-cube offsets of the 8 corners; bit `i` of a cube code refers to corner `i`.
pub const CUBE_CORNERS: [[i64; 3]; 8] = [
    [0, 0, 0],
    [0, 1, 0],
    [1, 1, 0],
    [1, 0, 0],
    [0, 0, 1],
    [0, 1, 1],
    [1, 1, 1],
    [1, 0, 1],
];

/// Number of distinct inside/outside corner configurations
pub const CUBE_CODES_COUNT: usize = 256;

/// Opposite faces of the cube, each listed as a corner cycle aligned with its partner.
const OPPOSITE_FACES: [([usize; 4], [usize; 4]); 3] = [
    ([0, 1, 2, 3], [4, 5, 6, 7]),
    ([0, 4, 5, 1], [3, 7, 6, 2]),
    ([0, 4, 7, 3], [1, 5, 6, 2]),
];

/// Inside corners of a base configuration and its triangles.
///
/// Each triangle is three corner ids plus a reference corner that the face
/// normal is oriented towards.
struct BasicPattern {
    inside: &'static [usize],
    triangles: &'static [[usize; 4]],
}

const fn pattern(inside: &'static [usize], triangles: &'static [[usize; 4]]) -> BasicPattern {
    BasicPattern { inside, triangles }
}

#[rustfmt::skip]
const BASIC_PATTERNS: [BasicPattern; 23] = [
    pattern(&[], &[]),
    pattern(&[0], &[]),
    pattern(&[0, 6], &[]),
    pattern(&[0, 3], &[]),
    pattern(&[0, 2], &[]),
    pattern(&[0, 2, 3], &[[0, 3, 2, 7]]),
    pattern(&[0, 3, 6], &[]),
    pattern(&[0, 2, 7], &[]),
    pattern(&[0, 1, 2, 3], &[[0, 2, 1, 5], [0, 3, 2, 7]]),
    pattern(&[1, 2, 3, 6], &[[1, 3, 6, 4]]),
    pattern(&[0, 1, 3, 5], &[[0, 3, 1, 7], [0, 1, 5, 7]]),
    pattern(&[0, 2, 3, 5], &[[0, 3, 2, 7]]),
    pattern(&[0, 1, 2, 4], &[[0, 2, 1, 7], [0, 1, 4, 7]]),
    pattern(&[0, 2, 4, 6], &[]),
    pattern(&[0, 2, 5, 7], &[]),
    pattern(&[1, 2, 3, 4, 6], &[[1, 3, 6, 4]]),
    pattern(&[1, 2, 3, 4, 5], &[[1, 3, 4, 0], [2, 4, 3, 7], [2, 5, 4, 6]]),
    pattern(&[0, 1, 2, 3, 5], &[[0, 3, 5, 4], [2, 5, 3, 6]]),
    pattern(&[0, 1, 2, 3, 5, 7], &[[0, 7, 5, 4], [2, 5, 7, 6]]),
    pattern(&[0, 1, 2, 3, 4, 5], &[[2, 4, 3, 7], [2, 5, 4, 6]]),
    pattern(&[1, 2, 3, 4, 5, 7], &[[1, 3, 4, 0], [2, 5, 7, 6]]),
    pattern(&[1, 2, 3, 4, 5, 6, 7], &[[1, 3, 4, 0]]),
    pattern(&[0, 1, 2, 3, 4, 5, 6, 7], &[]),
];

/// Corner permutation: corner `i` maps to `p[i]`
pub type CornerPermutation = [usize; 8];

fn compose(first: &CornerPermutation, second: &CornerPermutation) -> CornerPermutation {
    std::array::from_fn(|e| second[first[e]])
}

/// Generators of the cube symmetry group: a swap of each pair of opposite
/// faces and the four quarter turns around the axis through them.
fn basic_permutations() -> BTreeSet<CornerPermutation> {
    let mut basic = BTreeSet::new();
    for (front, back) in OPPOSITE_FACES {
        let order: [usize; 8] = std::array::from_fn(|e| if e < 4 { front[e] } else { back[e - 4] });
        let permutation_to = |transformed: &[usize; 8]| {
            let mut permutation = [0; 8];
            for e in 0..8 {
                permutation[order[e]] = transformed[e];
            }
            permutation
        };

        let swapped: [usize; 8] = std::array::from_fn(|e| order[(e + 4) % 8]);
        basic.insert(permutation_to(&swapped));

        let mut turned = order;
        for k in 0..4 {
            if k > 0 {
                turned[..4].rotate_right(1);
                turned[4..].rotate_right(1);
            }
            basic.insert(permutation_to(&turned));
        }
    }
    basic
}

/// All 48 symmetries of the cube as corner permutations, in lexicographic order.
///
/// Generated as every composition of three basic face swaps and turns.
#[must_use]
pub fn cube_symmetry_permutations() -> Vec<CornerPermutation> {
    let basic: Vec<_> = basic_permutations().into_iter().collect();
    let mut all = BTreeSet::new();
    for a in &basic {
        for b in &basic {
            for c in &basic {
                all.insert(compose(&compose(a, b), c));
            }
        }
    }
    all.into_iter().collect()
}

/// One table triangle in cube-corner ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableTriangle {
    pub corners: [usize; 3],
    /// Corner the normal is oriented towards; not part of the emitted mesh
    pub reference_corner: usize,
    /// Unit normal in cube coordinates
    pub normal: Vector3<f64>,
}

impl TableTriangle {
    fn new(corners: [usize; 3], reference_corner: usize) -> Self {
        let [v0, v1, v2] = corners.map(corner_position);
        let normal = oriented_unit_normal(&v0, &v1, &v2, &corner_position(reference_corner));
        Self {
            corners,
            reference_corner,
            normal,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn corner_position(corner: usize) -> Vector3<f64> {
    let [x, y, z] = CUBE_CORNERS[corner];
    Vector3::new(x as f64, y as f64, z as f64)
}

/// Mapping from 8-bit cube codes to triangles.
#[derive(Debug, Clone)]
pub struct TriangulationTable {
    entries: [Option<Vec<TableTriangle>>; CUBE_CODES_COUNT],
}

static SHARED: OnceLock<TriangulationTable> = OnceLock::new();

impl TriangulationTable {
    /// Build the table from the base patterns.
    #[must_use]
    pub fn new() -> Self {
        let permutations = cube_symmetry_permutations();
        let mut entries: [Option<Vec<TableTriangle>>; CUBE_CODES_COUNT] =
            std::array::from_fn(|_| None);

        for pattern in &BASIC_PATTERNS {
            for permutation in &permutations {
                let code: usize = pattern.inside.iter().map(|&c| 1 << permutation[c]).sum();
                if entries[code].is_some() {
                    continue;
                }
                entries[code] = Some(
                    pattern
                        .triangles
                        .iter()
                        .map(|t| {
                            TableTriangle::new(
                                [permutation[t[0]], permutation[t[1]], permutation[t[2]]],
                                permutation[t[3]],
                            )
                        })
                        .collect(),
                );
            }
        }

        Self { entries }
    }

    /// Process-wide table, built on first use.
    pub fn shared() -> &'static Self {
        SHARED.get_or_init(Self::new)
    }

    /// Triangles for a cube whose inside corners are the set bits of `code`.
    #[must_use]
    pub fn triangles(&self, code: u8) -> &[TableTriangle] {
        self.entries[usize::from(code)].as_deref().unwrap_or(&[])
    }

    /// True when every code received an entry from some base pattern.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(Option::is_some)
    }

    /// Corner offsets matching the bit order of the codes
    #[must_use]
    pub const fn basic_cube_coordinates(&self) -> &'static [[i64; 3]; 8] {
        &CUBE_CORNERS
    }
}

impl Default for TriangulationTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One line per code: the code, the triangle count, four corner ids per
/// triangle (the last being the reference corner), then three normal
/// components per triangle.
impl fmt::Display for TriangulationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in 0..=u8::MAX {
            let triangles = self.triangles(code);
            write!(f, "{code}    {}   ", triangles.len())?;
            for t in triangles {
                for id in t.corners.iter().chain(std::iter::once(&t.reference_corner)) {
                    write!(f, " {id}")?;
                }
            }
            write!(f, "   ")?;
            for t in triangles {
                for component in &t.normal {
                    write!(f, " {component}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn forty_eight_distinct_symmetries() {
        let permutations = cube_symmetry_permutations();
        assert_eq!(permutations.len(), 48);
        assert_eq!(permutations[0], [0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(permutations[47], [7, 6, 5, 4, 3, 2, 1, 0]);
        for p in &permutations {
            let mut sorted = *p;
            sorted.sort_unstable();
            assert_eq!(sorted, [0, 1, 2, 3, 4, 5, 6, 7]);
        }
    }

    #[test]
    fn symmetries_preserve_cube_edges() {
        let is_edge = |a: usize, b: usize| {
            let (pa, pb) = (CUBE_CORNERS[a], CUBE_CORNERS[b]);
            (0..3).map(|i| (pa[i] - pb[i]).abs()).sum::<i64>() == 1
        };
        for p in cube_symmetry_permutations() {
            for a in 0..8 {
                for b in 0..8 {
                    assert_eq!(is_edge(a, b), is_edge(p[a], p[b]));
                }
            }
        }
    }

    #[test]
    fn basic_generators() {
        assert_eq!(basic_permutations().len(), 13);
    }

    #[test]
    fn table_is_complete() {
        let table = TriangulationTable::new();
        assert!(table.is_complete());
        assert!(table.triangles(0).is_empty());
        assert!(table.triangles(1).is_empty());
        assert!(table.triangles(255).is_empty());
    }

    #[test]
    fn known_entries() {
        let table = TriangulationTable::new();

        let t = table.triangles(7);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].corners, [0, 1, 2]);
        assert_eq!(t[0].reference_corner, 5);
        assert_relative_eq!(t[0].normal, Vector3::new(0.0, 0.0, 1.0));

        let t = table.triangles(15);
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].corners, [0, 2, 1]);
        assert_eq!(t[1].corners, [0, 3, 2]);

        let t = table.triangles(254);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].corners, [1, 3, 4]);
        assert_eq!(t[0].reference_corner, 0);
        let k = -(1.0_f64 / 3.0).sqrt();
        assert_relative_eq!(t[0].normal, Vector3::new(k, k, k), epsilon = 1e-12);
    }

    #[test]
    fn triangles_use_inside_corners_only() {
        let table = TriangulationTable::new();
        for code in 0..=u8::MAX {
            for t in table.triangles(code) {
                for c in t.corners {
                    assert_ne!(code & (1 << c), 0, "code {code} corner {c}");
                }
                assert_relative_eq!(t.normal.norm(), 1.0, epsilon = 1e-12);
                let reference = corner_position(t.reference_corner) - corner_position(t.corners[0]);
                assert!(t.normal.dot(&reference) >= 0.0);
            }
        }
    }

    #[test]
    fn shared_table_is_reused() {
        assert!(std::ptr::eq(
            TriangulationTable::shared(),
            TriangulationTable::shared()
        ));
    }

    #[test]
    fn display_has_one_line_per_code() {
        let text = TriangulationTable::new().to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 256);
        assert!(lines[7].starts_with("7    1    0 1 2 5   "));
    }
}
