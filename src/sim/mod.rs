//! Height-field simulation
//!
//! Everything the fixed-rate tick touches lives here. Nothing in this module
//! blocks or performs I/O:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Control state arrives as a snapshot, never awaited

pub mod driver;
pub mod grid;
pub mod safe_zone;
pub mod shape;
pub mod state;
pub mod tick;
pub mod wave;

pub use driver::{Driver, FixedObstacles, ObstacleSource};
pub use grid::{Grid, Surface};
pub use safe_zone::SafeZone;
pub use shape::{ShapeContext, evaluate as evaluate_shape, near_obstacle};
pub use state::Swarm;
pub use tick::{TickInput, TickReport, tick};
pub use wave::WaveField;
