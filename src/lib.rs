//! Swarm Field - height-field engine for a desk-top actuator swarm
//!
//! Core modules:
//! - `sim`: Grid geometry, wave integrator, safe-zone search, subject shapes, per-tick composer
//! - `control`: Shared control state written by the listener and read by the tick
//! - `net`: Datagram protocol and background listener
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Error types for setup, configuration and networking

pub mod control;
pub mod error;
pub mod net;
pub mod settings;
pub mod sim;

pub use control::{Behavior, Channel, ControlState, ControlStore, Subject};
pub use error::{ConfigError, ListenerError, SetupError};
pub use settings::Settings;

use glam::Vec3;

/// Engine constants
pub mod consts {
    /// Default UDP port for the control protocol
    pub const DEFAULT_PORT: u16 = 5005;
    /// Default cell spacing in world units
    pub const DEFAULT_DENSITY: f32 = 0.15;
    /// Actuator height used when the host does not provide one
    pub const DEFAULT_ACTUATOR_HEIGHT: f32 = 0.08;
    /// Maximum ticks run per host frame
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Cells closer than this to an obstacle stay at rest
    pub const OBSTACLE_RADIUS: f32 = 0.6;
    /// Safe-zone search samples every Nth cell
    pub const SAFE_ZONE_STRIDE: usize = 3;
    /// Upper bound on the safe-zone radius
    pub const MAX_SAFE_RADIUS: f32 = 3.0;
    /// Clearance assumed before any obstacle has been seen during a scan
    pub const UNOBSTRUCTED_CLEARANCE: f32 = 100.0;
    /// Shapes centred on the safe zone need at least this much room
    pub const MIN_SHAPE_RADIUS: f32 = 0.3;

    /// Gravity well: numerator, softening epsilon, maximum depth
    pub const GRAVITY_STRENGTH: f32 = 0.6;
    pub const GRAVITY_EPSILON: f32 = 0.1;
    pub const GRAVITY_MAX_DEPTH: f32 = 1.8;

    /// Wave heights are clamped to ±this when composed into targets
    pub const WAVE_DISPLAY_LIMIT: f32 = 1.5;
    /// Neighbour share of a ripple's strength
    pub const RIPPLE_NEIGHBOR_SHARE: f32 = 0.5;
}

/// Distance between two points projected onto the surface plane (XZ)
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Chebyshev (square) distance on the surface plane
#[inline]
pub fn chebyshev_distance(a: Vec3, b: Vec3) -> f32 {
    (a.x - b.x).abs().max((a.z - b.z).abs())
}

/// Cubic Hermite smoothstep of `t` clamped to [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -4.0, 4.0);
        assert!((planar_distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = Vec3::new(1.0, 0.0, 1.0);
        let b = Vec3::new(-2.0, 5.0, 2.5);
        assert!((chebyshev_distance(a, b) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(-1.0), 0.0);
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(2.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
    }
}
