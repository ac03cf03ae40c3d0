//! Largest obstacle-free region
//!
//! Sampled search over the grid for the point with the most clearance from
//! both obstacles and surface edges. Shapes are centred and scaled on it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::grid::Grid;
use crate::consts::{MAX_SAFE_RADIUS, OBSTACLE_RADIUS, SAFE_ZONE_STRIDE, UNOBSTRUCTED_CLEARANCE};
use crate::planar_distance;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeZone {
    pub center: Vec3,
    pub radius: f32,
}

impl Default for SafeZone {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 0.0,
        }
    }
}

impl SafeZone {
    /// Search the grid for the most open spot.
    ///
    /// With no obstacles the search is limited by the surface edges alone.
    pub fn find(grid: &Grid, obstacles: &[Vec3]) -> Self {
        let surface = grid.surface();
        let mut best = Self::default();
        for index in (0..grid.cell_count()).step_by(SAFE_ZONE_STRIDE) {
            let (col, row) = grid.cell_of(index);
            let p = grid.world_position(col, row);
            let radius = obstacle_clearance(p, obstacles).min(surface.edge_distance(p));
            if radius > best.radius {
                best = Self { center: p, radius };
            }
        }

        best.radius = best.radius.clamp(0.0, MAX_SAFE_RADIUS);
        best
    }
}

/// Distance from `p` to the rim of the nearest obstacle
fn obstacle_clearance(p: Vec3, obstacles: &[Vec3]) -> f32 {
    obstacles
        .iter()
        .map(|&o| planar_distance(p, o) - OBSTACLE_RADIUS)
        .fold(UNOBSTRUCTED_CLEARANCE, f32::min)
}
