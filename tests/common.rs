#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use voronota_gridsurf::{Ball, Surface};

/// Cubic lattice of `n * n * n` equal balls.
#[allow(clippy::cast_precision_loss)]
pub fn ball_lattice(n: usize, spacing: f64, radius: f64) -> Vec<Ball> {
    let mut balls = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                balls.push(Ball::new(
                    i as f64 * spacing,
                    j as f64 * spacing,
                    k as f64 * spacing,
                    radius,
                ));
            }
        }
    }
    balls
}

pub fn test_data_path(name: &str) -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir).join("tests/data").join(name)
}

/// One parsed line of the printed triangulation table.
#[derive(Debug)]
pub struct TableLine {
    pub code: usize,
    pub ids: Vec<usize>,
    pub normals: Vec<f64>,
}

/// Parse the `code count ids... normals...` text layout.
pub fn parse_table(text: &str) -> Vec<TableLine> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let code = tokens[0].parse().expect("bad code");
            let count: usize = tokens[1].parse().expect("bad count");
            let ids = tokens[2..2 + count * 4]
                .iter()
                .map(|t| t.parse().expect("bad corner id"))
                .collect();
            let normals = tokens[2 + count * 4..]
                .iter()
                .map(|t| t.parse().expect("bad normal"))
                .collect();
            TableLine { code, ids, normals }
        })
        .collect()
}

pub fn load_reference_table() -> Vec<TableLine> {
    let path = test_data_path("triangulation_table.txt");
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    parse_table(&text)
}

/// Structural checks every constructed surface must pass.
pub fn assert_well_formed(surface: &Surface, balls_count: usize) {
    assert_eq!(surface.triples.len() % 3, 0);
    assert!(
        surface.triples.iter().all(|&i| i < surface.vertices.len()),
        "triangle index out of bounds"
    );
    assert_eq!(surface.map_of_ball_nums_to_triple_nums.len(), balls_count);
    assert_eq!(
        surface.map_of_triple_nums_to_ball_nums.len(),
        surface.num_triangles()
    );
    for vertex in &surface.vertices {
        assert!(vertex.ball_num.is_some_and(|b| b < balls_count));
        assert!(vertex.center.iter().all(|c| c.is_finite()));
    }
    for (ball_num, triple_nums) in surface.map_of_ball_nums_to_triple_nums.iter().enumerate() {
        for &t in triple_nums {
            assert_eq!(surface.map_of_triple_nums_to_ball_nums[t], Some(ball_num));
        }
    }
}

/// After splitting, each triangle has a single owner.
pub fn assert_single_owner_triangles(surface: &Surface) {
    for triangle in surface.triangles() {
        let owner = surface.vertices[triangle[0]].ball_num;
        assert!(
            triangle
                .iter()
                .all(|&v| surface.vertices[v].ball_num == owner),
            "mixed owners in {triangle:?}"
        );
    }
}

/// Number of edge-connected triangle components, by union-find over vertices.
pub fn count_connected_components(surface: &Surface) -> usize {
    fn find(parent: &mut [usize], mut v: usize) -> usize {
        while parent[v] != v {
            parent[v] = parent[parent[v]];
            v = parent[v];
        }
        v
    }

    let mut parent: Vec<usize> = (0..surface.vertices.len()).collect();
    for [a, b, c] in surface.triangles() {
        for (u, v) in [(a, b), (b, c)] {
            let (ru, rv) = (find(&mut parent, u), find(&mut parent, v));
            parent[ru] = rv;
        }
    }

    let mut roots: Vec<usize> = surface
        .triples
        .iter()
        .map(|&v| find(&mut parent, v))
        .collect();
    roots.sort_unstable();
    roots.dedup();
    roots.len()
}
