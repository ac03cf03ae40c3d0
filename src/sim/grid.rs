//! Grid geometry
//!
//! Lays a fixed `col_count × row_count` lattice of actuator cells over a
//! rectangular surface. Cells are indexed column-major:
//! `index = col * row_count + row`.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// World-space bounds of the surface the swarm stands on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    /// Elevation of the top face
    pub top_y: f32,
}

impl Surface {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32, top_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
            top_y,
        }
    }

    /// Surface of the given size with its corner at the origin
    pub fn from_size(width: f32, depth: f32) -> Self {
        Self::new(0.0, width, 0.0, depth, 0.0)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    /// Planar distance from `p` to the nearest edge
    pub fn edge_distance(&self, p: Vec3) -> f32 {
        let dx = (p.x - self.min_x).abs().min((p.x - self.max_x).abs());
        let dz = (p.z - self.min_z).abs().min((p.z - self.max_z).abs());
        dx.min(dz)
    }
}

/// Immutable cell lattice over a surface
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    surface: Surface,
    density: f32,
    actuator_height: f32,
    col_count: usize,
    row_count: usize,
}

impl Grid {
    /// Lay out the grid. A missing surface is fatal.
    pub fn from_surface(
        surface: Option<&Surface>,
        density: f32,
        actuator_height: f32,
    ) -> Result<Self, SetupError> {
        let surface = *surface.ok_or(SetupError::MissingSurface)?;
        if !(density.is_finite() && density > 0.0) {
            return Err(SetupError::InvalidDensity(density));
        }

        let col_count = (surface.width() / density).floor().max(0.0) as usize;
        let row_count = (surface.depth() / density).floor().max(0.0) as usize;
        if col_count == 0 || row_count == 0 {
            return Err(SetupError::EmptyGrid {
                width: surface.width(),
                depth: surface.depth(),
                density,
            });
        }

        log::info!(
            "Grid {}x{} ({} cells) at density {}",
            col_count,
            row_count,
            col_count * row_count,
            density
        );

        Ok(Self {
            surface,
            density,
            actuator_height,
            col_count,
            row_count,
        })
    }

    #[inline]
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.col_count * self.row_count
    }

    #[inline]
    pub fn density(&self) -> f32 {
        self.density
    }

    #[inline]
    pub fn actuator_height(&self) -> f32 {
        self.actuator_height
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn linear_index(&self, col: usize, row: usize) -> usize {
        col * self.row_count + row
    }

    /// Inverse of [`Grid::linear_index`]
    #[inline]
    pub fn cell_of(&self, index: usize) -> (usize, usize) {
        (index / self.row_count, index % self.row_count)
    }

    /// Elevation of every cell at rest
    #[inline]
    pub fn rest_height(&self) -> f32 {
        self.surface.top_y + self.actuator_height * 0.5
    }

    /// Rest position of cell `(col, row)`
    pub fn world_position(&self, col: usize, row: usize) -> Vec3 {
        Vec3::new(
            self.surface.min_x + (col as f32 + 0.5) * self.density,
            self.rest_height(),
            self.surface.min_z + (row as f32 + 0.5) * self.density,
        )
    }

    /// Rest positions in linear-index order
    pub fn rest_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        (0..self.cell_count()).map(|i| {
            let (col, row) = self.cell_of(i);
            self.world_position(col, row)
        })
    }

    /// Centre of the surface at rest elevation
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.surface.min_x + self.surface.max_x) * 0.5,
            self.rest_height(),
            (self.surface.min_z + self.surface.max_z) * 0.5,
        )
    }

    /// Map a normalized pointer position onto a cell.
    ///
    /// The pointer's x axis is mirrored (camera faces the viewer) and its y
    /// axis runs from the far edge (`max_z`) to the near edge.
    pub fn cell_at_normalized(&self, pos: Vec2) -> (usize, usize) {
        let u = (1.0 - pos.x).clamp(0.0, 1.0);
        let v = (1.0 - pos.y).clamp(0.0, 1.0);
        let col = ((u * self.col_count as f32) as usize).min(self.col_count - 1);
        let row = ((v * self.row_count as f32) as usize).min(self.row_count - 1);
        (col, row)
    }
}
