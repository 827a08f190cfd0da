//! Grid-based solvent-accessible (SAS) and solvent-excluded (SES) molecular surfaces.
//!
//! A set of balls (atoms with radii) is voxelized on a regular grid. A two-stage
//! breadth-first propagation, an approximate Euclidean distance transform,
//! classifies every voxel relative to the probe-accessible and probe-excluded
//! volumes and assigns it to its nearest ball. A vertex-connected marching-cubes
//! pass turns the classification into a triangle mesh whose vertices are voxel
//! positions, which is then smoothed, pushed out of the balls and split so that
//! every triangle belongs to a single ball.
//!
//! # Example
//!
//! ```
//! use voronota_gridsurf::{Ball, Parameters, construct_surface};
//!
//! let balls = vec![
//!     Ball::new(0.0, 0.0, 0.0, 1.5),
//!     Ball::new(2.0, 0.0, 0.0, 1.5),
//! ];
//!
//! let parameters = Parameters {
//!     grid_step: 0.5,
//!     ..Parameters::default()
//! };
//! let surface = construct_surface(&parameters, &balls).unwrap();
//!
//! for (ball_num, area) in surface.areas_by_ball().iter().enumerate() {
//!     println!("Ball {ball_num}: SES area={area:.2}");
//! }
//! ```

mod construction;
mod error;
mod extraction;
mod geometry;
mod grid;
mod mesh_bundle;
mod postprocess;
mod propagation;
mod triangulation_table;
mod types;

pub use construction::construct_surface;
pub use error::SurfaceError;
pub use extraction::extract_surface;
pub use grid::{CELL_SHIFTS, GridPoint, Voxel, VoxelGrid, VoxelType};
pub use mesh_bundle::{
    DEFAULT_RADIUS_ADDITION, MeshBundle, MolecularSurfaceParameters, SurfaceType,
    construct_mesh_bundle,
};
pub use postprocess::{correct_buried_vertices, group_triangles_by_ball, smooth, split_by_ball};
pub use triangulation_table::{
    CUBE_CODES_COUNT, CUBE_CORNERS, CornerPermutation, TableTriangle, TriangulationTable,
    cube_symmetry_permutations,
};
pub use types::{Ball, Parameters, Surface, SurfaceVertex};
