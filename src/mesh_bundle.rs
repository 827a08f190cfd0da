// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-gridsurf project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Flat render-ready buffers for a molecular surface.

use log::debug;

use crate::construction::construct_surface;
use crate::error::SurfaceError;
use crate::types::{Ball, Parameters, Surface};

/// Default growth of every atomic radius before the surface is built
pub const DEFAULT_RADIUS_ADDITION: f64 = 0.05;

/// Kind of molecular surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceType {
    /// Surface traced by the probe center (SAS)
    SolventAccessible,
    /// Surface traced by the probe boundary (SES)
    #[default]
    SolventExcluded,
}

/// Settings for [`construct_mesh_bundle`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MolecularSurfaceParameters {
    pub surface: Parameters,
    /// Added to every ball radius before construction
    pub radius_addition: f64,
}

impl Default for MolecularSurfaceParameters {
    fn default() -> Self {
        Self {
            surface: Parameters::default(),
            radius_addition: DEFAULT_RADIUS_ADDITION,
        }
    }
}

impl MolecularSurfaceParameters {
    /// Common settings; everything else keeps its default.
    #[must_use]
    pub fn new(
        radius_addition: f64,
        surface_type: SurfaceType,
        probe: f64,
        grid_step: f64,
        smoothing_iterations: usize,
    ) -> Self {
        Self {
            surface: Parameters {
                solvent_excluded: surface_type == SurfaceType::SolventExcluded,
                probe,
                grid_step,
                smoothing_iterations,
                ..Parameters::default()
            },
            radius_addition,
        }
    }
}

/// Surface mesh packed into flat buffers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshBundle {
    /// `x, y, z` per vertex
    pub vertices: Vec<f32>,
    /// `x, y, z` per vertex
    pub normals: Vec<f32>,
    /// Three vertex indices per triangle
    pub indices: Vec<u32>,
    /// Per ball, the vertex index triples of its triangles
    pub mapped_indices: Vec<Vec<u32>>,
}

fn to_index(i: usize) -> Result<u32, SurfaceError> {
    u32::try_from(i).map_err(|_| SurfaceError::IndexOverflow(i))
}

impl MeshBundle {
    /// Pack `surface` into flat buffers.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::IndexOverflow`] if a vertex index does not fit into `u32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_surface(surface: &Surface) -> Result<Self, SurfaceError> {
        let mut vertices = Vec::with_capacity(surface.vertices.len() * 3);
        let mut normals = Vec::with_capacity(surface.vertices.len() * 3);
        for vertex in &surface.vertices {
            vertices.extend(vertex.center.iter().map(|&c| c as f32));
            normals.extend(vertex.normal.iter().map(|&c| c as f32));
        }

        let indices = surface
            .triples
            .iter()
            .map(|&i| to_index(i))
            .collect::<Result<Vec<_>, _>>()?;

        let mapped_indices = surface
            .map_of_ball_nums_to_triple_nums
            .iter()
            .map(|triple_nums| {
                triple_nums
                    .iter()
                    .flat_map(|&t| surface.triangle(t))
                    .map(to_index)
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            vertices,
            normals,
            indices,
            mapped_indices,
        })
    }

    #[must_use]
    pub const fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    #[must_use]
    pub const fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build a surface over balls grown by `radius_addition` and pack it.
///
/// Returns `Ok(None)` when there are no balls or the surface has no triangles.
///
/// # Errors
///
/// Returns [`SurfaceError`] for invalid balls or parameters, or if the mesh is
/// too large for 32-bit indices.
pub fn construct_mesh_bundle(
    parameters: &MolecularSurfaceParameters,
    balls: &[Ball],
) -> Result<Option<MeshBundle>, SurfaceError> {
    if balls.is_empty() {
        return Ok(None);
    }
    let expanded: Vec<Ball> = balls
        .iter()
        .map(|ball| ball.expanded(parameters.radius_addition))
        .collect();

    let surface = construct_surface(&parameters.surface, &expanded)?;
    if surface.is_empty() {
        debug!("No surface triangles for {} balls", balls.len());
        return Ok(None);
    }
    MeshBundle::from_surface(&surface).map(Some)
}
