use log::debug;

use crate::error::{SurfaceError, validate_parameters, validate_smoothing_self_proportion};
use crate::extraction::extract_surface;
use crate::grid::VoxelGrid;
use crate::postprocess::{correct_buried_vertices, group_triangles_by_ball, smooth, split_by_ball};
use crate::triangulation_table::TriangulationTable;
use crate::types::{Ball, Parameters, Surface};

/// Build a triangulated SAS or SES surface around `balls`.
///
/// Lays out and classifies a voxel grid, extracts the surface mesh and applies
/// the smoothing, burial correction and per-ball splitting requested by
/// `parameters`. An empty surface (no triangles) is a valid result.
///
/// # Errors
///
/// Returns [`SurfaceError`] if `balls` is empty, a ball or parameter is invalid.
///
/// # Example
///
/// ```
/// use voronota_gridsurf::{Ball, Parameters, construct_surface};
///
/// let balls = [Ball::new(0.0, 0.0, 0.0, 1.5), Ball::new(2.0, 0.0, 0.0, 1.5)];
/// let surface = construct_surface(&Parameters::default(), &balls).unwrap();
/// assert!(!surface.is_empty());
/// assert_eq!(surface.map_of_ball_nums_to_triple_nums.len(), 2);
/// ```
pub fn construct_surface(parameters: &Parameters, balls: &[Ball]) -> Result<Surface, SurfaceError> {
    validate_parameters(parameters)?;
    let grid = VoxelGrid::new(
        parameters.probe,
        parameters.grid_step,
        parameters.grid_max_allowed_voxels_count,
        parameters.grid_reduced_step_directions,
        balls,
    )?;
    grid.construct_surface(parameters)
}

impl VoxelGrid {
    /// Extract and postprocess the surface of an already classified grid.
    ///
    /// Only the surface kind and the postprocessing fields of `parameters` are
    /// used; probe and step come from the grid itself.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidSmoothingSelfProportion`] if the blend
    /// weight is outside `[0, 1]`.
    pub fn construct_surface(&self, parameters: &Parameters) -> Result<Surface, SurfaceError> {
        validate_smoothing_self_proportion(parameters.smoothing_self_proportion)?;

        let mut surface = extract_surface(
            self,
            TriangulationTable::shared(),
            parameters.solvent_excluded,
        );

        smooth(
            &mut surface,
            parameters.smoothing_iterations,
            parameters.smoothing_self_proportion,
        );

        if parameters.correct_buried_vertices {
            let radius_addition = if parameters.solvent_excluded {
                0.0
            } else {
                self.probe
            };
            correct_buried_vertices(&mut surface, &self.balls, radius_addition);
        }

        if parameters.split_mode > 0 {
            split_by_ball(&mut surface);
            group_triangles_by_ball(&mut surface, self.balls.len());
        }

        debug!(
            "{} surface: {} triangles, {} vertices",
            if parameters.solvent_excluded { "SES" } else { "SAS" },
            surface.num_triangles(),
            surface.vertices.len()
        );

        Ok(surface)
    }
}
