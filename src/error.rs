use crate::types::{Ball, Parameters};

/// Error type for surface construction.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// At least one ball is required to lay out the grid.
    NoBalls,
    /// A ball has invalid coordinates or radius.
    InvalidBall {
        /// Index of the invalid ball.
        index: usize,
        /// Description of why the ball is invalid.
        reason: &'static str,
    },
    /// Probe radius must be non-negative and finite.
    InvalidProbe(f64),
    /// Grid step must be positive and finite.
    InvalidGridStep(f64),
    /// Smoothing self proportion must lie in `[0, 1]`.
    InvalidSmoothingSelfProportion(f64),
    /// Ball coordinates span a range the grid cannot represent.
    UnboundedGrid,
    /// A mesh index does not fit into the 32-bit index buffer.
    IndexOverflow(usize),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBalls => write!(f, "no balls given"),
            Self::InvalidBall { index, reason } => {
                write!(f, "invalid ball at index {index}: {reason}")
            }
            Self::InvalidProbe(v) => write!(
                f,
                "invalid probe radius: {v} (must be non-negative and finite)"
            ),
            Self::InvalidGridStep(v) => {
                write!(f, "invalid grid step: {v} (must be positive and finite)")
            }
            Self::InvalidSmoothingSelfProportion(v) => write!(
                f,
                "invalid smoothing self proportion: {v} (must be within [0, 1])"
            ),
            Self::UnboundedGrid => write!(f, "ball coordinates span a non-finite range"),
            Self::IndexOverflow(v) => {
                write!(f, "mesh index {v} does not fit into a 32-bit index buffer")
            }
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Validate grid layout parameters.
pub(crate) fn validate_grid_parameters(probe: f64, step: f64) -> Result<(), SurfaceError> {
    if !probe.is_finite() || probe < 0.0 {
        return Err(SurfaceError::InvalidProbe(probe));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(SurfaceError::InvalidGridStep(step));
    }
    Ok(())
}

/// Validate the smoothing blend weight.
pub(crate) fn validate_smoothing_self_proportion(s: f64) -> Result<(), SurfaceError> {
    if (0.0..=1.0).contains(&s) {
        Ok(())
    } else {
        Err(SurfaceError::InvalidSmoothingSelfProportion(s))
    }
}

/// Validate the full parameter set.
pub(crate) fn validate_parameters(parameters: &Parameters) -> Result<(), SurfaceError> {
    validate_grid_parameters(parameters.probe, parameters.grid_step)?;
    validate_smoothing_self_proportion(parameters.smoothing_self_proportion)
}

/// Validate input balls.
pub(crate) fn validate_balls(balls: &[Ball]) -> Result<(), SurfaceError> {
    if balls.is_empty() {
        return Err(SurfaceError::NoBalls);
    }
    for (i, ball) in balls.iter().enumerate() {
        if !ball.x.is_finite() || !ball.y.is_finite() || !ball.z.is_finite() {
            return Err(SurfaceError::InvalidBall {
                index: i,
                reason: "coordinates must be finite",
            });
        }
        if !ball.r.is_finite() || ball.r <= 0.0 {
            return Err(SurfaceError::InvalidBall {
                index: i,
                reason: "radius must be positive and finite",
            });
        }
    }
    Ok(())
}
