//! Integration tests for the vertex-connected marching-cubes table.

mod common;

use std::collections::BTreeMap;

use common::{TableLine, load_reference_table, parse_table};
use voronota_gridsurf::{CUBE_CODES_COUNT, TriangulationTable, cube_symmetry_permutations};

#[rustfmt::skip]
const REFERENCE_PERMUTATIONS: [[usize; 8]; 48] = [
    [0,1,2,3,4,5,6,7], [0,1,5,4,3,2,6,7], [0,3,2,1,4,7,6,5], [0,3,7,4,1,2,6,5],
    [0,4,5,1,3,7,6,2], [0,4,7,3,1,5,6,2], [1,0,3,2,5,4,7,6], [1,0,4,5,2,3,7,6],
    [1,2,3,0,5,6,7,4], [1,2,6,5,0,3,7,4], [1,5,4,0,2,6,7,3], [1,5,6,2,0,4,7,3],
    [2,1,0,3,6,5,4,7], [2,1,5,6,3,0,4,7], [2,3,0,1,6,7,4,5], [2,3,7,6,1,0,4,5],
    [2,6,5,1,3,7,4,0], [2,6,7,3,1,5,4,0], [3,0,1,2,7,4,5,6], [3,0,4,7,2,1,5,6],
    [3,2,1,0,7,6,5,4], [3,2,6,7,0,1,5,4], [3,7,4,0,2,6,5,1], [3,7,6,2,0,4,5,1],
    [4,0,1,5,7,3,2,6], [4,0,3,7,5,1,2,6], [4,5,1,0,7,6,2,3], [4,5,6,7,0,1,2,3],
    [4,7,3,0,5,6,2,1], [4,7,6,5,0,3,2,1], [5,1,0,4,6,2,3,7], [5,1,2,6,4,0,3,7],
    [5,4,0,1,6,7,3,2], [5,4,7,6,1,0,3,2], [5,6,2,1,4,7,3,0], [5,6,7,4,1,2,3,0],
    [6,2,1,5,7,3,0,4], [6,2,3,7,5,1,0,4], [6,5,1,2,7,4,0,3], [6,5,4,7,2,1,0,3],
    [6,7,3,2,5,4,0,1], [6,7,4,5,2,3,0,1], [7,3,0,4,6,2,1,5], [7,3,2,6,4,0,1,5],
    [7,4,0,3,6,5,1,2], [7,4,5,6,3,0,1,2], [7,6,2,3,4,5,1,0], [7,6,5,4,3,2,1,0],
];

fn assert_lines_match(actual: &[TableLine], expected: &[TableLine]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_eq!(a.code, e.code);
        assert_eq!(a.ids, e.ids, "corner ids differ for code {}", a.code);
        assert_eq!(a.normals.len(), e.normals.len());
        for (x, y) in a.normals.iter().zip(&e.normals) {
            assert!((x - y).abs() < 1e-5, "normal differs for code {}: {x} vs {y}", a.code);
        }
    }
}

#[test]
fn test_symmetry_group_matches_reference() {
    assert_eq!(cube_symmetry_permutations(), REFERENCE_PERMUTATIONS.to_vec());
}

#[test]
fn test_table_matches_reference_fixture() {
    let reference = load_reference_table();
    assert_eq!(reference.len(), CUBE_CODES_COUNT);

    let table = TriangulationTable::shared();
    assert!(table.is_complete());
    for line in &reference {
        let code = u8::try_from(line.code).unwrap();
        let triangles = table.triangles(code);
        let ids: Vec<usize> = triangles
            .iter()
            .flat_map(|t| [t.corners[0], t.corners[1], t.corners[2], t.reference_corner])
            .collect();
        assert_eq!(ids, line.ids, "code {code}");
        let normals: Vec<f64> = triangles.iter().flat_map(|t| t.normal.iter().copied()).collect();
        for (x, y) in normals.iter().zip(&line.normals) {
            assert!((x - y).abs() < 1e-5, "code {code}: {x} vs {y}");
        }
    }
}

#[test]
fn test_printed_table_matches_reference_fixture() {
    let printed = parse_table(&TriangulationTable::shared().to_string());
    assert_lines_match(&printed, &load_reference_table());
}

#[test]
fn test_triangle_count_distribution() {
    let table = TriangulationTable::shared();
    let mut histogram = BTreeMap::new();
    for code in 0..=u8::MAX {
        *histogram.entry(table.triangles(code).len()).or_insert(0) += 1;
    }
    assert_eq!(
        histogram,
        BTreeMap::from([(0, 78), (1, 72), (2, 82), (3, 24)])
    );
}

#[test]
fn test_single_corner_configurations() {
    // a lone inside corner has no face; a lone outside corner is cut off by one triangle
    let table = TriangulationTable::shared();
    assert!(table.triangles(0b0000_0001).is_empty());
    assert_eq!(table.triangles(0b1111_1110).len(), 1);
}

#[test]
fn test_normals_are_unit_length() {
    let table = TriangulationTable::shared();
    for code in 0..=u8::MAX {
        for t in table.triangles(code) {
            assert!((t.normal.norm() - 1.0).abs() < 1e-12, "code {code}");
        }
    }
}
