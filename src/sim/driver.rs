//! Host-side tick driver
//!
//! Turns variable frame times into fixed ticks, pulls the latest control
//! snapshot once per tick and refreshes the obstacle snapshot on a
//! configurable cadence.

use glam::{Vec2, Vec3};

use super::state::Swarm;
use super::tick::{TickInput, TickReport, tick};
use crate::consts::MAX_SUBSTEPS;
use crate::control::ControlStore;

/// Supplies obstacle positions (scene scan, tracker, fixed list...)
pub trait ObstacleSource {
    fn scan(&mut self) -> Vec<Vec3>;
}

impl<F> ObstacleSource for F
where
    F: FnMut() -> Vec<Vec3>,
{
    fn scan(&mut self) -> Vec<Vec3> {
        self()
    }
}

/// Obstacles that never move
#[derive(Debug, Clone, Default)]
pub struct FixedObstacles(pub Vec<Vec3>);

impl ObstacleSource for FixedObstacles {
    fn scan(&mut self) -> Vec<Vec3> {
        self.0.clone()
    }
}

pub struct Driver<S> {
    swarm: Swarm,
    store: ControlStore,
    source: S,
    dt: f32,
    refresh_ticks: u64,
    accumulator: f32,
    /// Host pointer fallback, normalized
    pub mouse: Option<Vec2>,
    last_report: Option<TickReport>,
}

impl<S: ObstacleSource> Driver<S> {
    pub fn new(swarm: Swarm, store: ControlStore, source: S) -> Self {
        let dt = swarm.settings().tick_dt();
        let refresh_ticks = u64::from(swarm.settings().obstacle_refresh_ticks.max(1));
        Self {
            swarm,
            store,
            source,
            dt,
            refresh_ticks,
            accumulator: 0.0,
            mouse: None,
            last_report: None,
        }
    }

    #[inline]
    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    #[inline]
    pub fn store(&self) -> &ControlStore {
        &self.store
    }

    #[inline]
    pub fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    /// Run exactly one tick
    pub fn step(&mut self) -> &TickReport {
        let obstacles = (self.swarm.time_ticks % self.refresh_ticks == 0).then(|| self.source.scan());
        let input = TickInput {
            control: self.store.snapshot(),
            obstacles,
            mouse: self.mouse,
        };
        let report = tick(&mut self.swarm, &input, self.dt);
        self.last_report.insert(report)
    }

    /// Feed elapsed wall time; runs as many fixed ticks as are due, capped to
    /// avoid a spiral of death. Returns the number of ticks run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= self.dt;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= self.dt {
            log::warn!("tick overrun, dropping {:.3}s of backlog", self.accumulator);
            self.accumulator = 0.0;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{Behavior, Command, Subject};
    use crate::settings::Settings;
    use crate::sim::grid::Surface;

    fn swarm(refresh: u32) -> Swarm {
        let settings = Settings {
            density: 0.5,
            tick_hz: 50,
            obstacle_refresh_ticks: refresh,
            ..Default::default()
        };
        Swarm::new(&settings, Some(&Surface::from_size(5.0, 5.0))).unwrap()
    }

    #[test]
    fn test_obstacles_refresh_on_cadence() {
        let mut scans = 0u32;
        let source = || {
            scans += 1;
            vec![Vec3::new(1.0, 0.0, scans as f32)]
        };
        let mut driver = Driver::new(swarm(4), ControlStore::new(), source);
        for _ in 0..9 {
            driver.step();
        }
        // Ticks 0, 4 and 8
        assert_eq!(driver.swarm().obstacles(), &[Vec3::new(1.0, 0.0, 3.0)]);
    }

    #[test]
    fn test_advance_runs_fixed_ticks() {
        let mut driver = Driver::new(swarm(10), ControlStore::new(), FixedObstacles::default());
        assert_eq!(driver.advance(0.01), 0);
        assert_eq!(driver.advance(0.011), 1);
        assert_eq!(driver.advance(0.05), 2);
        assert_eq!(driver.swarm().time_ticks, 3);
        // Long stalls are capped
        assert!(driver.advance(5.0) <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_store_changes_reach_the_tick() {
        let store = ControlStore::new();
        let mut driver = Driver::new(swarm(1), store.clone(), FixedObstacles::default());
        assert_eq!(driver.step().behavior, Behavior::Normal);

        store.set_manual_override(false);
        store.apply(Command::SetExternalBehavior(Behavior::Confused));
        store.apply(Command::SetSubject(Some(Subject::History)));
        let report = driver.step();
        assert_eq!(report.behavior, Behavior::Confused);
        assert!(report.safe_zone.is_some());
    }
}
