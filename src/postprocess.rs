//! Mesh refinement steps applied after extraction.

use nalgebra::{Point3, Vector3};

use crate::geometry::{middle_of_three, middle_of_two, push_out_of_sphere};
use crate::types::{Ball, Surface, SurfaceVertex};

/// Laplacian-style smoothing of vertex centers and normals.
///
/// Each round replaces a vertex by the mean of the other two corners of all its
/// triangles, then blends it with the previous value using `self_proportion`
/// as the weight of the old value. Vertices without triangles are left alone.
pub fn smooth(surface: &mut Surface, iterations: usize, self_proportion: f64) {
    for _ in 0..iterations {
        let mut smoothed = vec![SurfaceVertex::default(); surface.vertices.len()];

        for triangle in surface.triangles() {
            for (j, &id) in triangle.iter().enumerate() {
                let a = &surface.vertices[triangle[(j + 1) % 3]];
                let b = &surface.vertices[triangle[(j + 2) % 3]];
                let accumulator = &mut smoothed[id];
                accumulator.center += a.center.coords + b.center.coords;
                accumulator.center_weight += 2.0;
                accumulator.normal += a.normal + b.normal;
                accumulator.normal_weight += 2.0;
            }
        }

        for (vertex, accumulator) in surface.vertices.iter_mut().zip(&smoothed) {
            if accumulator.center_weight <= 0.0 {
                continue;
            }
            let mut center = accumulator.center / accumulator.center_weight;
            let mut normal = accumulator.normal / accumulator.normal_weight;
            if self_proportion > 0.0 {
                center = Point3::from(
                    center.coords * (1.0 - self_proportion) + vertex.center.coords * self_proportion,
                );
                normal = normal * (1.0 - self_proportion) + vertex.normal * self_proportion;
            }
            vertex.center = center;
            vertex.normal = normal;
            vertex.center_weight = 1.0;
            vertex.normal_weight = 1.0;
        }
    }
}

/// Project vertices that sank into their owner ball back onto its surface.
///
/// The reference sphere of a ball has radius `r + radius_addition`. Vertices
/// without an owner, and vertices exactly at the ball center, are kept.
pub fn correct_buried_vertices(surface: &mut Surface, balls: &[Ball], radius_addition: f64) {
    for vertex in &mut surface.vertices {
        let Some(ball) = vertex.ball_num.and_then(|i| balls.get(i)) else {
            continue;
        };
        if let Some(projected) =
            push_out_of_sphere(&vertex.center, &ball.center(), ball.r + radius_addition)
        {
            vertex.center = projected;
        }
    }
}

/// Split every triangle whose corners belong to different balls.
///
/// Such a triangle is replaced by three fans of two triangles, one fan per
/// corner, built from the corner, the two adjacent edge midpoints and the
/// centroid. The new vertices of a fan take the owner of its corner, so every
/// resulting triangle has a single owner. Uniform triangles are kept as they are.
/// The per-ball maps must be rebuilt afterwards.
pub fn split_by_ball(surface: &mut Surface) {
    let mut triples = Vec::with_capacity(surface.triples.len());
    for i in 0..surface.num_triangles() {
        let ids = surface.triangle(i);
        let owners = ids.map(|id| surface.vertices[id].ball_num);
        if owners[0] == owners[1] && owners[0] == owners[2] {
            triples.extend_from_slice(&ids);
            continue;
        }

        let corners = ids.map(|id| surface.vertices[id]);
        let c = corners.map(|v| v.center.coords);
        let n = corners.map(|v| v.normal);
        let fan_points = |p: &[Vector3<f64>; 3]| {
            [
                middle_of_two(&p[0], &p[1]),
                middle_of_three(&p[0], &p[1], &p[2]),
                middle_of_two(&p[0], &p[2]),
                middle_of_two(&p[1], &p[0]),
                middle_of_three(&p[0], &p[1], &p[2]),
                middle_of_two(&p[1], &p[2]),
                middle_of_two(&p[2], &p[0]),
                middle_of_three(&p[0], &p[1], &p[2]),
                middle_of_two(&p[2], &p[1]),
            ]
        };
        let centers = fan_points(&c);
        let normals = fan_points(&n);

        let first_new = surface.vertices.len();
        for j in 0..9 {
            surface.vertices.push(SurfaceVertex {
                ball_num: owners[j / 3],
                center: Point3::from(centers[j]),
                center_weight: 1.0,
                normal: normals[j],
                normal_weight: 1.0,
            });
        }

        for (k, &corner) in ids.iter().enumerate() {
            let fan = first_new + k * 3;
            triples.extend_from_slice(&[corner, fan, fan + 1, corner, fan + 1, fan + 2]);
        }
    }
    surface.triples = triples;
}

/// Rebuild both per-ball maps.
///
/// A triangle belongs to the first of its corners (in order) that has an
/// owner below `balls_count`; triangles with no such corner stay unassigned.
pub fn group_triangles_by_ball(surface: &mut Surface, balls_count: usize) {
    let mut by_ball = vec![Vec::new(); balls_count];
    let mut by_triangle = vec![None; surface.num_triangles()];
    for (i, triangle) in surface.triangles().enumerate() {
        let owner = triangle
            .iter()
            .find_map(|&id| surface.vertices[id].ball_num.filter(|&b| b < balls_count));
        if let Some(ball_num) = owner {
            by_ball[ball_num].push(i);
            by_triangle[i] = Some(ball_num);
        }
    }
    surface.map_of_ball_nums_to_triple_nums = by_ball;
    surface.map_of_triple_nums_to_ball_nums = by_triangle;
}
