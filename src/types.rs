use nalgebra::{Point3, Vector3};

use crate::geometry::triangle_area;

/// Input ball (center + radius), user-facing type
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ball {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub r: f64,
}

impl Ball {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, r: f64) -> Self {
        Self { x, y, z, r }
    }

    #[must_use]
    pub const fn center(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Same ball with the radius grown by `addition`
    #[must_use]
    pub fn expanded(&self, addition: f64) -> Self {
        Self {
            r: self.r + addition,
            ..*self
        }
    }
}

/// Surface construction settings.
///
/// Defaults describe a solvent-excluded surface for a water-sized probe on a
/// 0.4 Å grid with one smoothing round and per-ball splitting enabled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Parameters {
    /// Build the solvent-excluded surface instead of the solvent-accessible one
    pub solvent_excluded: bool,
    /// Rolling probe radius
    pub probe: f64,
    /// Requested grid step; may be enlarged to respect the voxel limit
    pub grid_step: f64,
    /// Upper bound on the number of voxels in the grid
    pub grid_max_allowed_voxels_count: usize,
    /// Propagate through the 6 face neighbors only (otherwise all 26 neighbors)
    pub grid_reduced_step_directions: bool,
    pub smoothing_iterations: usize,
    /// Weight of the previous position when blending a smoothing round, in `[0, 1]`
    pub smoothing_self_proportion: f64,
    /// Push vertices that ended up inside their ball's reference sphere back onto it
    #[cfg_attr(feature = "serde", serde(alias = "correct_burried_vertices"))]
    pub correct_buried_vertices: bool,
    /// Any positive value splits triangles shared by several balls
    pub split_mode: u32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            solvent_excluded: true,
            probe: 1.4,
            grid_step: 0.4,
            grid_max_allowed_voxels_count: 20_000_000,
            grid_reduced_step_directions: true,
            smoothing_iterations: 1,
            smoothing_self_proportion: 0.0,
            correct_buried_vertices: true,
            split_mode: 1,
        }
    }
}

impl Parameters {
    #[must_use]
    pub fn solvent_accessible() -> Self {
        Self {
            solvent_excluded: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn solvent_excluded() -> Self {
        Self::default()
    }
}

/// Mesh vertex with the accumulators used while smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceVertex {
    /// Index of the ball owning the voxel this vertex came from
    pub ball_num: Option<usize>,
    pub center: Point3<f64>,
    pub center_weight: f64,
    pub normal: Vector3<f64>,
    pub normal_weight: f64,
}

impl Default for SurfaceVertex {
    fn default() -> Self {
        Self {
            ball_num: None,
            center: Point3::origin(),
            center_weight: 0.0,
            normal: Vector3::zeros(),
            normal_weight: 0.0,
        }
    }
}

/// Triangulated surface with per-ball triangle grouping.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Surface {
    pub vertices: Vec<SurfaceVertex>,
    /// Flat list of vertex indices, three per triangle
    pub triples: Vec<usize>,
    /// For each ball, the indices of the triangles assigned to it
    pub map_of_ball_nums_to_triple_nums: Vec<Vec<usize>>,
    /// For each triangle, the ball it is assigned to
    pub map_of_triple_nums_to_ball_nums: Vec<Option<usize>>,
}

impl Surface {
    /// True when no triangles were produced.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    #[must_use]
    pub const fn num_triangles(&self) -> usize {
        self.triples.len() / 3
    }

    /// Vertex indices of triangle `i`
    #[must_use]
    pub fn triangle(&self, i: usize) -> [usize; 3] {
        [
            self.triples[i * 3],
            self.triples[i * 3 + 1],
            self.triples[i * 3 + 2],
        ]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.triples.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    #[must_use]
    pub fn triangle_area(&self, i: usize) -> f64 {
        let [a, b, c] = self.triangle(i);
        triangle_area(
            &self.vertices[a].center,
            &self.vertices[b].center,
            &self.vertices[c].center,
        )
    }

    /// Surface area assigned to each ball, indexed by ball number.
    #[must_use]
    pub fn areas_by_ball(&self) -> Vec<f64> {
        self.map_of_ball_nums_to_triple_nums
            .iter()
            .map(|triple_nums| triple_nums.iter().map(|&i| self.triangle_area(i)).sum())
            .collect()
    }

    #[must_use]
    pub fn total_area(&self) -> f64 {
        (0..self.num_triangles())
            .map(|i| self.triangle_area(i))
            .sum()
    }
}
