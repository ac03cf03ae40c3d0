//! Engine state
//!
//! Everything the per-tick composer reads and writes: the grid, the wave
//! field, the latest safe zone, the obstacle snapshot and the target heights
//! handed to the actuator driver.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::grid::{Grid, Surface};
use super::safe_zone::SafeZone;
use super::wave::WaveField;
use crate::error::SetupError;
use crate::settings::Settings;

/// Complete simulation state for one swarm
#[derive(Debug, Clone)]
pub struct Swarm {
    /// Seed the idle-ripple RNG was started from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) settings: Settings,
    grid: Grid,
    /// Rest positions in linear-index order
    pub(crate) rest: Vec<Vec3>,
    pub(crate) wave: WaveField,
    pub(crate) safe_zone: SafeZone,
    pub(crate) obstacles: Vec<Vec3>,
    /// Target positions in linear-index order
    pub(crate) targets: Vec<Vec3>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds
    pub elapsed: f32,
}

impl Swarm {
    /// Lay out the grid over `surface`. Fails if no surface is given.
    pub fn new(settings: &Settings, surface: Option<&Surface>) -> Result<Self, SetupError> {
        let grid = Grid::from_surface(surface, settings.density, settings.actuator_height)?;
        let rest: Vec<Vec3> = grid.rest_positions().collect();
        let wave = WaveField::new(grid.col_count(), grid.row_count(), settings.damping);

        Ok(Self {
            seed: settings.seed,
            rng: Pcg32::seed_from_u64(settings.seed),
            settings: settings.clone(),
            targets: rest.clone(),
            safe_zone: SafeZone {
                center: grid.center(),
                radius: 0.0,
            },
            rest,
            wave,
            obstacles: Vec::new(),
            time_ticks: 0,
            elapsed: 0.0,
            grid,
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn wave(&self) -> &WaveField {
        &self.wave
    }

    /// Mutable wave access for hosts that inject their own disturbances
    #[inline]
    pub fn wave_mut(&mut self) -> &mut WaveField {
        &mut self.wave
    }

    /// Most recent safe zone (stale while no shape is being raised)
    #[inline]
    pub fn safe_zone(&self) -> &SafeZone {
        &self.safe_zone
    }

    #[inline]
    pub fn obstacles(&self) -> &[Vec3] {
        &self.obstacles
    }

    /// Replace the obstacle snapshot
    pub fn set_obstacles(&mut self, obstacles: Vec<Vec3>) {
        if obstacles.len() != self.obstacles.len() {
            log::debug!("obstacle count {} -> {}", self.obstacles.len(), obstacles.len());
        }
        self.obstacles = obstacles;
    }

    #[inline]
    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest
    }

    /// Target positions from the last tick
    #[inline]
    pub fn targets(&self) -> &[Vec3] {
        &self.targets
    }

    /// Target position of cell `(col, row)`
    pub fn target(&self, col: usize, row: usize) -> Vec3 {
        self.targets[self.grid.linear_index(col, row)]
    }

    /// Height above rest of cell `(col, row)` from the last tick
    pub fn offset(&self, col: usize, row: usize) -> f32 {
        let i = self.grid.linear_index(col, row);
        self.targets[i].y - self.rest[i].y
    }

    /// Return every cell to rest and clear the wave field
    pub fn reset(&mut self) {
        self.wave.reset();
        self.targets.copy_from_slice(&self.rest);
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.time_ticks = 0;
        self.elapsed = 0.0;
    }
}
