//! Two-stage breadth-first classification of grid voxels.
//!
//! Stage 1 grows outwards from ball centers and labels every voxel within one
//! probe radius of its nearest ball as solvent-accessible. The accessible
//! voxels bordering the inaccessible region form the SAS layer.
//!
//! Stage 2 grows inwards from the SAS layer and measures the distance to the
//! nearest SAS voxel. Accessible voxels farther than one probe radius from the
//! SAS layer are excluded from the probe-swept volume, and the probe-swept
//! voxels touching them form the SES layer.
//!
//! Both stages use FIFO queues seeded in ascending voxel order, so the result
//! is fully deterministic.

use std::collections::VecDeque;

use log::debug;

use crate::grid::{VoxelGrid, VoxelType};

impl VoxelGrid {
    pub(crate) fn propagate(&mut self) {
        let mut queue = self.seed_centers();
        self.propagate_accessibility(&mut queue);
        self.reset_sources();
        self.mark_accessible_surface(&mut queue);
        self.propagate_exclusion(&mut queue);
        self.mark_excluded_surface();

        if log::log_enabled!(log::Level::Debug) {
            let count = |t: VoxelType| self.voxels.iter().filter(|v| v.voxel_type == t).count();
            debug!(
                "Classified voxels: {} SAS surface, {} SES surface, {} excluded",
                count(VoxelType::Stage1SurfaceSas),
                count(VoxelType::Stage2SurfaceSes),
                count(VoxelType::Stage2InSasInSes)
            );
        }
    }

    /// Every center voxel becomes its own source.
    fn seed_centers(&mut self) -> VecDeque<usize> {
        let mut queue = VecDeque::new();
        for (id, voxel) in self.voxels.iter_mut().enumerate() {
            if voxel.voxel_type == VoxelType::Center {
                voxel.source_voxel_id = Some(id);
                voxel.distance_to_source = 0.0;
                queue.push_back(id);
            }
        }
        queue
    }

    /// Spread ball ownership while the distance to the ball surface stays within the probe radius.
    fn propagate_accessibility(&mut self, queue: &mut VecDeque<usize>) {
        while let Some(center_id) = queue.pop_front() {
            let center = self.voxels[center_id];
            let Some(ball_num) = center.ball_num else {
                continue;
            };
            let ball = self.balls[ball_num];
            let center_point = self.point_of(center_id);
            for shift in self.cell_shifts() {
                let neighbor_point = center_point.shifted(shift);
                let Some(neighbor_id) = self.id_of(&neighbor_point) else {
                    continue;
                };
                let neighbor = self.voxels[neighbor_id];
                if neighbor.source_voxel_id == center.source_voxel_id {
                    continue;
                }
                let candidate_distance =
                    (self.grid_to_real(&neighbor_point) - ball.center()).norm() - ball.r;
                if neighbor.ball_num.is_none() || neighbor.distance_to_source > candidate_distance
                {
                    let neighbor = &mut self.voxels[neighbor_id];
                    neighbor.ball_num = center.ball_num;
                    neighbor.source_voxel_id = center.source_voxel_id;
                    neighbor.distance_to_source = candidate_distance;
                    if candidate_distance <= self.probe {
                        neighbor.voxel_type = VoxelType::Stage1InSas;
                        queue.push_back(neighbor_id);
                    } else {
                        neighbor.voxel_type = VoxelType::Stage1OutSas;
                    }
                }
            }
        }
    }

    fn reset_sources(&mut self) {
        for voxel in &mut self.voxels {
            voxel.source_voxel_id = None;
            voxel.distance_to_source = f64::MAX;
        }
    }

    /// Accessible voxels next to inaccessible ones become the SAS layer and seed stage 2.
    fn mark_accessible_surface(&mut self, queue: &mut VecDeque<usize>) {
        for center_id in 0..self.voxels.len() {
            if self.voxels[center_id].voxel_type != VoxelType::Stage1OutSas {
                continue;
            }
            let center_point = self.point_of(center_id);
            for shift in self.cell_shifts() {
                let Some(neighbor_id) = self.id_of(&center_point.shifted(shift)) else {
                    continue;
                };
                let neighbor = &mut self.voxels[neighbor_id];
                if neighbor.voxel_type == VoxelType::Stage1InSas {
                    neighbor.voxel_type = VoxelType::Stage1SurfaceSas;
                    neighbor.source_voxel_id = Some(neighbor_id);
                    neighbor.distance_to_source = 0.0;
                    queue.push_back(neighbor_id);
                }
            }
        }
    }

    /// Spread the nearest SAS voxel inwards, comparing squared real-space distances.
    fn propagate_exclusion(&mut self, queue: &mut VecDeque<usize>) {
        let probe_squared = self.probe * self.probe;
        while let Some(center_id) = queue.pop_front() {
            let center = self.voxels[center_id];
            let Some(source_id) = center.source_voxel_id else {
                continue;
            };
            let source_position = self.grid_to_real(&self.point_of(source_id));
            let center_point = self.point_of(center_id);
            for shift in self.cell_shifts() {
                let neighbor_point = center_point.shifted(shift);
                let Some(neighbor_id) = self.id_of(&neighbor_point) else {
                    continue;
                };
                let neighbor = self.voxels[neighbor_id];
                let reachable = matches!(
                    neighbor.voxel_type,
                    VoxelType::Stage1InSas
                        | VoxelType::Stage2InSasOutSes
                        | VoxelType::Stage2InSasInSes
                );
                if !reachable || neighbor.source_voxel_id == center.source_voxel_id {
                    continue;
                }
                let candidate_squared_distance =
                    (self.grid_to_real(&neighbor_point) - source_position).norm_squared();
                if neighbor.distance_to_source > candidate_squared_distance {
                    let neighbor = &mut self.voxels[neighbor_id];
                    neighbor.source_voxel_id = Some(source_id);
                    neighbor.distance_to_source = candidate_squared_distance;
                    if candidate_squared_distance <= probe_squared {
                        neighbor.voxel_type = VoxelType::Stage2InSasOutSes;
                        queue.push_back(neighbor_id);
                    } else {
                        neighbor.voxel_type = VoxelType::Stage2InSasInSes;
                    }
                }
            }
        }
    }

    /// Probe-swept voxels next to excluded ones become the SES layer.
    fn mark_excluded_surface(&mut self) {
        for center_id in 0..self.voxels.len() {
            if self.voxels[center_id].voxel_type != VoxelType::Stage2InSasInSes {
                continue;
            }
            let center_point = self.point_of(center_id);
            for shift in self.cell_shifts() {
                let Some(neighbor_id) = self.id_of(&center_point.shifted(shift)) else {
                    continue;
                };
                let neighbor = &mut self.voxels[neighbor_id];
                if neighbor.voxel_type == VoxelType::Stage2InSasOutSes {
                    neighbor.voxel_type = VoxelType::Stage2SurfaceSes;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::grid::{VoxelGrid, VoxelType};
    use crate::types::Ball;

    const RADIUS: f64 = 2.0;
    const PROBE: f64 = 1.4;

    fn single_ball_grid(reduced: bool) -> VoxelGrid {
        VoxelGrid::new(
            PROBE,
            0.2,
            20_000_000,
            reduced,
            &[Ball::new(0.0, 0.0, 0.0, RADIUS)],
        )
        .unwrap()
    }

    fn distances_of(grid: &VoxelGrid, voxel_type: VoxelType) -> Vec<f64> {
        grid.voxels()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.voxel_type == voxel_type)
            .map(|(id, _)| grid.grid_to_real(&grid.point_of(id)).coords.norm())
            .collect()
    }

    #[test]
    fn sas_layer_hugs_expanded_sphere() {
        let grid = single_ball_grid(true);
        let distances = distances_of(&grid, VoxelType::Stage1SurfaceSas);
        assert!(!distances.is_empty());
        for d in distances {
            assert!(d <= RADIUS + PROBE + 1e-9, "{d}");
            assert!(d > RADIUS + PROBE - grid.step() - 1e-9, "{d}");
        }
    }

    #[test]
    fn ses_layer_hugs_ball() {
        for reduced in [true, false] {
            let grid = single_ball_grid(reduced);
            let distances = distances_of(&grid, VoxelType::Stage2SurfaceSes);
            assert!(!distances.is_empty());
            for d in distances {
                assert!((d - RADIUS).abs() < 0.5, "{d}");
            }
        }
    }

    #[test]
    fn classification_follows_distance() {
        let grid = single_ball_grid(true);
        for (id, voxel) in grid.voxels().iter().enumerate() {
            let d = grid.grid_to_real(&grid.point_of(id)).coords.norm();
            if d < RADIUS - 0.5 {
                assert!(voxel.in_ses(), "{d} {:?}", voxel.voxel_type);
            } else if d > RADIUS + 0.5 && d < RADIUS + PROBE - 0.5 {
                assert!(voxel.in_sas() && !voxel.in_ses(), "{d} {:?}", voxel.voxel_type);
            } else if d > RADIUS + PROBE + 1e-9 {
                assert!(!voxel.in_sas(), "{d} {:?}", voxel.voxel_type);
            }
        }
    }

    #[test]
    fn nearest_ball_owns_voxels() {
        let balls = [Ball::new(-2.0, 0.0, 0.0, 1.5), Ball::new(2.0, 0.0, 0.0, 1.5)];
        let grid = VoxelGrid::new(PROBE, 0.25, 20_000_000, false, &balls).unwrap();
        for (ball_num, ball) in balls.iter().enumerate() {
            let id = grid.id_of(&grid.real_to_grid(&ball.center())).unwrap();
            assert_eq!(grid.voxels()[id].ball_num, Some(ball_num));
        }
        for (id, voxel) in grid.voxels().iter().enumerate() {
            let x = grid.grid_to_real(&grid.point_of(id)).x;
            if voxel.in_sas() && x.abs() > 0.5 {
                let expected = usize::from(x > 0.0);
                assert_eq!(voxel.ball_num, Some(expected), "x = {x}");
            }
        }
    }

    #[test]
    fn crevice_between_balls_is_filled() {
        // the probe cannot enter the gap between two nearly touching balls
        let balls = [Ball::new(-1.6, 0.0, 0.0, 1.5), Ball::new(1.6, 0.0, 0.0, 1.5)];
        let grid = VoxelGrid::new(PROBE, 0.2, 20_000_000, true, &balls).unwrap();
        let gp = grid.real_to_grid(&nalgebra::Point3::new(0.0, 0.0, 0.0));
        let voxel = grid.voxels()[grid.id_of(&gp).unwrap()];
        assert!(voxel.in_ses(), "{:?}", voxel.voxel_type);
    }

    #[test]
    fn propagation_is_deterministic() {
        let a = single_ball_grid(false);
        let b = single_ball_grid(false);
        assert_eq!(a.voxels(), b.voxels());
    }

    #[test]
    fn no_voxel_left_unassigned_near_balls() {
        let grid = single_ball_grid(true);
        for (id, voxel) in grid.voxels().iter().enumerate() {
            let d = grid.grid_to_real(&grid.point_of(id)).coords.norm();
            if d < RADIUS + PROBE {
                assert_ne!(voxel.voxel_type, VoxelType::Unassigned);
            }
        }
    }
}
