//! Regular voxel grid laid over a set of balls.
//!
//! The grid covers the bounding box of the ball centers padded by the largest
//! radius plus one and a half probes, so the probe-accessible shell of every
//! ball fits inside. Grid coordinates are non-negative integers; voxel ids are
//! row-major with `x` fastest and `z` slowest.

use log::{debug, info};
use nalgebra::{Point3, Vector3};

use crate::error::{SurfaceError, validate_balls, validate_grid_parameters};
use crate::types::Ball;

/// Smallest factor by which one voxel-limit adjustment enlarges the step.
const MIN_STEP_GROWTH: f64 = 1.001;

/// Neighbor offsets: the 6 face neighbors first, then the 20 edge and corner neighbors.
pub const CELL_SHIFTS: [[i64; 3]; 26] = build_cell_shifts();

const fn build_cell_shifts() -> [[i64; 3]; 26] {
    let mut shifts = [[0; 3]; 26];
    let mut count = 0;
    let mut pass = 0;
    while pass < 2 {
        let mut x: i64 = -1;
        while x <= 1 {
            let mut y: i64 = -1;
            while y <= 1 {
                let mut z: i64 = -1;
                while z <= 1 {
                    let manhattan = x.abs() + y.abs() + z.abs();
                    if (pass == 0 && manhattan == 1) || (pass == 1 && manhattan > 1) {
                        shifts[count] = [x, y, z];
                        count += 1;
                    }
                    z += 1;
                }
                y += 1;
            }
            x += 1;
        }
        pass += 1;
    }
    shifts
}

/// Classification state of a voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoxelType {
    #[default]
    Unassigned,
    /// Voxel nearest to a ball center
    Center,
    Stage1InSas,
    Stage1OutSas,
    /// Accessible voxel bordering the inaccessible region
    Stage1SurfaceSas,
    Stage2InSasOutSes,
    Stage2InSasInSes,
    /// Probe-swept voxel bordering the excluded region
    Stage2SurfaceSes,
}

/// Per-cell classification record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel {
    pub voxel_type: VoxelType,
    pub ball_num: Option<usize>,
    pub source_voxel_id: Option<usize>,
    pub distance_to_source: f64,
}

impl Default for Voxel {
    fn default() -> Self {
        Self {
            voxel_type: VoxelType::Unassigned,
            ball_num: None,
            source_voxel_id: None,
            distance_to_source: f64::MAX,
        }
    }
}

impl Voxel {
    #[inline]
    #[must_use]
    pub const fn in_sas(&self) -> bool {
        matches!(
            self.voxel_type,
            VoxelType::Stage1SurfaceSas | VoxelType::Stage2InSasOutSes
        ) || self.in_ses()
    }

    #[inline]
    #[must_use]
    pub const fn in_ses(&self) -> bool {
        matches!(
            self.voxel_type,
            VoxelType::Stage2SurfaceSes
                | VoxelType::Stage2InSasInSes
                | VoxelType::Stage1InSas
                | VoxelType::Center
        )
    }

    #[inline]
    #[must_use]
    pub const fn surface_sas(&self) -> bool {
        matches!(self.voxel_type, VoxelType::Stage1SurfaceSas)
    }

    #[inline]
    #[must_use]
    pub const fn surface_ses(&self) -> bool {
        matches!(self.voxel_type, VoxelType::Stage2SurfaceSes)
    }
}

/// Integer grid coordinates, possibly outside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl GridPoint {
    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn shifted(&self, shift: &[i64; 3]) -> Self {
        Self {
            x: self.x + shift[0],
            y: self.y + shift[1],
            z: self.z + shift[2],
        }
    }
}

/// Voxel grid with per-voxel classification and nearest-ball ownership.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    pub(crate) probe: f64,
    pub(crate) step: f64,
    pub(crate) dimensions: [usize; 3],
    pub(crate) init_shift: Vector3<f64>,
    pub(crate) number_of_cell_shifts_to_use: usize,
    pub(crate) balls: Vec<Ball>,
    pub(crate) voxels: Vec<Voxel>,
}

impl VoxelGrid {
    /// Lay out the grid over `balls`, seed ball centers and classify every voxel.
    ///
    /// `step` is enlarged as needed so that the grid holds at most
    /// `max_allowed_voxels_count` voxels (a limit of 0 is treated as 1).
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the ball list is empty, a ball is invalid,
    /// or `probe`/`step` are out of range.
    pub fn new(
        probe: f64,
        step: f64,
        max_allowed_voxels_count: usize,
        reduced_step_directions: bool,
        balls: &[Ball],
    ) -> Result<Self, SurfaceError> {
        validate_grid_parameters(probe, step)?;
        validate_balls(balls)?;

        let first = balls.first().ok_or(SurfaceError::NoBalls)?;
        let mut min_coords = first.center();
        let mut max_coords = first.center();
        let mut max_r = first.r;
        for ball in balls {
            min_coords = min_coords.inf(&ball.center());
            max_coords = max_coords.sup(&ball.center());
            max_r = max_r.max(ball.r);
        }

        let padding = probe.mul_add(1.5, max_r);
        let init_shift = Vector3::repeat(padding) - min_coords.coords;
        let extent = (max_coords - min_coords).add_scalar(2.0 * padding);
        if !extent.iter().chain(init_shift.iter()).all(|v| v.is_finite()) {
            return Err(SurfaceError::UnboundedGrid);
        }

        let (fitted_step, dimensions) =
            fit_step_to_voxel_limit(&extent, step, max_allowed_voxels_count.max(1));
        if fitted_step > step {
            info!(
                "Grid step enlarged from {step} to {fitted_step:.4} to stay within {max_allowed_voxels_count} voxels"
            );
        }
        let voxel_count: usize = dimensions.iter().product();
        debug!(
            "Grid {}x{}x{} ({voxel_count} voxels), step {fitted_step:.4}",
            dimensions[0], dimensions[1], dimensions[2]
        );

        let mut grid = Self {
            probe,
            step: fitted_step,
            dimensions,
            init_shift,
            number_of_cell_shifts_to_use: if reduced_step_directions { 6 } else { 26 },
            balls: balls.to_vec(),
            voxels: vec![Voxel::default(); voxel_count],
        };

        for ball_num in 0..grid.balls.len() {
            // coarsened steps can round a center just past the last voxel
            let point = grid.clamped(&grid.real_to_grid(&grid.balls[ball_num].center()));
            if let Some(id) = grid.id_of(&point) {
                let voxel = &mut grid.voxels[id];
                voxel.voxel_type = VoxelType::Center;
                voxel.ball_num = Some(ball_num);
            }
        }

        grid.propagate();

        Ok(grid)
    }

    #[must_use]
    pub const fn probe(&self) -> f64 {
        self.probe
    }

    /// Actual step, after any enlargement
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub const fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    #[must_use]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// Offsets of the neighbors visited during propagation.
    #[must_use]
    pub fn cell_shifts(&self) -> &'static [[i64; 3]] {
        &CELL_SHIFTS[..self.number_of_cell_shifts_to_use]
    }

    /// Voxel id of an in-range grid point.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn id_of(&self, gp: &GridPoint) -> Option<usize> {
        if self.in_range(gp) {
            let [nx, ny, _] = self.dimensions;
            Some(gp.z as usize * (nx * ny) + gp.y as usize * nx + gp.x as usize)
        } else {
            None
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn point_of(&self, id: usize) -> GridPoint {
        let [nx, ny, _] = self.dimensions;
        let z = id / (nx * ny);
        let y = (id - z * (nx * ny)) / nx;
        let x = id - z * (nx * ny) - y * nx;
        GridPoint::new(x as i64, y as i64, z as i64)
    }

    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn in_range(&self, gp: &GridPoint) -> bool {
        gp.x >= 0
            && gp.y >= 0
            && gp.z >= 0
            && gp.x < self.dimensions[0] as i64
            && gp.y < self.dimensions[1] as i64
            && gp.z < self.dimensions[2] as i64
    }

    /// Nearest grid point to a real-space position.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn real_to_grid(&self, p: &Point3<f64>) -> GridPoint {
        let coord = |i: usize| ((p[i] + self.init_shift[i]) / self.step + 0.5).floor() as i64;
        GridPoint::new(coord(0), coord(1), coord(2))
    }

    /// Real-space position of a grid point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn grid_to_real(&self, gp: &GridPoint) -> Point3<f64> {
        Point3::new(
            (gp.x as f64).mul_add(self.step, -self.init_shift.x),
            (gp.y as f64).mul_add(self.step, -self.init_shift.y),
            (gp.z as f64).mul_add(self.step, -self.init_shift.z),
        )
    }

    #[allow(clippy::cast_possible_wrap)]
    fn clamped(&self, gp: &GridPoint) -> GridPoint {
        GridPoint::new(
            gp.x.clamp(0, self.dimensions[0] as i64 - 1),
            gp.y.clamp(0, self.dimensions[1] as i64 - 1),
            gp.z.clamp(0, self.dimensions[2] as i64 - 1),
        )
    }
}

/// Voxels per axis, or `None` if an axis would not fit into a signed grid coordinate.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn dimensions_for_step(extent: &Vector3<f64>, step: f64) -> Option<[usize; 3]> {
    let mut dimensions = [1; 3];
    for (i, dimension) in dimensions.iter_mut().enumerate() {
        let cells = (extent[i] / step).floor();
        if !(0.0..i64::MAX as f64).contains(&cells) {
            return None;
        }
        *dimension = (cells as usize).checked_add(1)?;
    }
    Some(dimensions)
}

fn voxels_count(dimensions: &[usize; 3]) -> Option<usize> {
    dimensions[0]
        .checked_mul(dimensions[1])?
        .checked_mul(dimensions[2])
}

/// Enlarge `step` until the grid covering `extent` has at most `max_allowed` voxels.
#[allow(clippy::cast_precision_loss)]
fn fit_step_to_voxel_limit(
    extent: &Vector3<f64>,
    mut step: f64,
    max_allowed: usize,
) -> (f64, [usize; 3]) {
    loop {
        let dimensions = dimensions_for_step(extent, step);
        match dimensions.and_then(|d| voxels_count(&d).map(|count| (d, count))) {
            None => step *= 2.0,
            Some((_, count)) if count > max_allowed => {
                let ratio = count as f64 / max_allowed as f64;
                step *= ratio.cbrt().max(MIN_STEP_GROWTH);
            }
            Some((dimensions, _)) => return (step, dimensions),
        }
    }
}
