// Copyright (c) 2026 Kliment Olechnovic and Mikael Lund
// Part of the voronota-gridsurf project, licensed under the MIT License.
// SPDX-License-Identifier: MIT

//! Triangle soup extraction from a classified grid.

use log::debug;
use nalgebra::Vector3;

use crate::grid::{GridPoint, VoxelGrid};
use crate::postprocess::group_triangles_by_ball;
use crate::triangulation_table::TriangulationTable;
use crate::types::{Surface, SurfaceVertex};

/// Marks a voxel that has not become a mesh vertex yet.
const UNVISITED: usize = usize::MAX;

/// Walk every full cube of the grid and emit the table triangles for its corner code.
///
/// A corner is inside when its voxel lies in the solvent-excluded volume (or the
/// solvent-accessible volume when `solvent_excluded` is false). Mesh vertices are
/// voxel positions, shared between all triangles that touch the same voxel. Each
/// vertex normal is the mean of the table normals of its triangles.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn extract_surface(
    grid: &VoxelGrid,
    table: &TriangulationTable,
    solvent_excluded: bool,
) -> Surface {
    let [nx, ny, nz] = grid.dimensions();
    let inside: Vec<bool> = grid
        .voxels()
        .iter()
        .map(|v| if solvent_excluded { v.in_ses() } else { v.in_sas() })
        .collect();

    let mut triangle_voxel_ids: Vec<[usize; 3]> = Vec::with_capacity(grid.balls().len() * 100);
    let mut triangle_normals: Vec<Vector3<f64>> = Vec::with_capacity(grid.balls().len() * 100);

    for z in 0..nz.saturating_sub(1) {
        for y in 0..ny.saturating_sub(1) {
            for x in 0..nx.saturating_sub(1) {
                let start = GridPoint::new(x as i64, y as i64, z as i64);
                let mut cube_ids = [0; 8];
                let mut code = 0_u8;
                for (i, corner) in table.basic_cube_coordinates().iter().enumerate() {
                    let Some(id) = grid.id_of(&start.shifted(corner)) else {
                        continue;
                    };
                    cube_ids[i] = id;
                    if inside[id] {
                        code |= 1 << i;
                    }
                }
                for triangle in table.triangles(code) {
                    triangle_voxel_ids.push(triangle.corners.map(|c| cube_ids[c]));
                    triangle_normals.push(triangle.normal);
                }
            }
        }
    }

    let mut vertex_of_voxel = vec![UNVISITED; grid.voxels().len()];
    let mut surface = Surface {
        triples: Vec::with_capacity(triangle_voxel_ids.len() * 3),
        ..Surface::default()
    };

    for &voxel_id in triangle_voxel_ids.iter().flatten() {
        if vertex_of_voxel[voxel_id] == UNVISITED {
            vertex_of_voxel[voxel_id] = surface.vertices.len();
            surface.vertices.push(SurfaceVertex {
                ball_num: grid.voxels()[voxel_id].ball_num,
                center: grid.grid_to_real(&grid.point_of(voxel_id)),
                center_weight: 1.0,
                ..SurfaceVertex::default()
            });
        }
        surface.triples.push(vertex_of_voxel[voxel_id]);
    }

    for (triangle, normal) in surface.triples.chunks_exact(3).zip(&triangle_normals) {
        for &vertex_id in triangle {
            let vertex = &mut surface.vertices[vertex_id];
            vertex.normal += normal;
            vertex.normal_weight += 1.0;
        }
    }
    for vertex in &mut surface.vertices {
        vertex.normal /= vertex.normal_weight;
        vertex.normal_weight = 1.0;
    }

    group_triangles_by_ball(&mut surface, grid.balls().len());

    debug!(
        "Extracted {} triangles over {} vertices",
        surface.num_triangles(),
        surface.vertices.len()
    );

    surface
}
