//! Fixed-rate simulation tick
//!
//! Composes the wave field, the subject shape and the behavior overlay into
//! one target height per cell.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::safe_zone::SafeZone;
use super::shape::{self, ShapeContext};
use super::state::Swarm;
use crate::consts::WAVE_DISPLAY_LIMIT;
use crate::control::{Behavior, Channel, ControlState};

/// Inputs for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest control snapshot
    pub control: ControlState,
    /// Fresh obstacle snapshot, when the host refreshed it this tick
    pub obstacles: Option<Vec<Vec3>>,
    /// Host mouse/touch position in normalized coordinates. Sinks the
    /// surface like the right pointer, but only while that pointer is idle.
    pub mouse: Option<Vec2>,
}

/// What happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub behavior: Behavior,
    /// Ripples that landed in the wave field this tick
    pub ripples: u32,
    /// Safe zone, when it was recomputed this tick
    pub safe_zone: Option<SafeZone>,
    /// Largest absolute offset from rest
    pub peak_offset: f32,
}

/// Advance the swarm by one fixed timestep
pub fn tick(swarm: &mut Swarm, input: &TickInput, dt: f32) -> TickReport {
    if let Some(obstacles) = &input.obstacles {
        swarm.set_obstacles(obstacles.clone());
    }

    swarm.time_ticks += 1;
    swarm.elapsed += dt;

    let control = &input.control;
    let behavior = control.active_behavior().clone();
    let mut ripples = 0u32;

    // Shape anchor only matters while a shape is raised
    let safe_zone = if behavior.wants_shape() {
        let zone = SafeZone::find(swarm.grid(), &swarm.obstacles);
        swarm.safe_zone = zone;
        Some(zone)
    } else {
        None
    };

    if behavior == Behavior::Happy && inject_idle_ripple(swarm) {
        ripples += 1;
    }

    // Pointers force the field every tick they stay active
    if control.gestures_enabled {
        for channel in [Channel::Left, Channel::Right] {
            if let Some(pos) = control.pointer(channel) {
                if inject_pointer_ripple(swarm, pos, channel.polarity()) {
                    ripples += 1;
                }
            }
        }
    }
    if let (Some(pos), None) = (input.mouse, control.right) {
        if inject_pointer_ripple(swarm, pos, Channel::Right.polarity()) {
            ripples += 1;
        }
    }

    // Injection is done; this step produces the heights we read out
    swarm.wave.step();

    let peak_offset = compose(swarm, control, &behavior);

    TickReport {
        tick: swarm.time_ticks,
        behavior,
        ripples,
        safe_zone,
        peak_offset,
    }
}

/// Random ripple somewhere a ripple fits. Returns true when one landed.
fn inject_idle_ripple(swarm: &mut Swarm) -> bool {
    let chance = (swarm.settings.happy_ripple_chance as f64).clamp(0.0, 1.0);
    if !(chance > 0.0) || !swarm.rng.random_bool(chance) {
        return false;
    }
    let radius = swarm.settings.ripple_radius.max(1);
    let (cols, rows) = (swarm.grid().col_count(), swarm.grid().row_count());
    if cols <= radius.saturating_mul(2) || rows <= radius.saturating_mul(2) {
        return false;
    }
    let col = swarm.rng.random_range(radius..cols - radius);
    let row = swarm.rng.random_range(radius..rows - radius);
    let strength = swarm.settings.happy_ripple_strength;
    swarm.wave.add_ripple(col, row, strength, radius)
}

fn inject_pointer_ripple(swarm: &mut Swarm, pos: Vec2, polarity: f32) -> bool {
    let (col, row) = swarm.grid().cell_at_normalized(pos);
    let strength = swarm.settings.pointer_strength * polarity;
    let radius = swarm.settings.ripple_radius;
    swarm.wave.add_ripple(col, row, strength, radius)
}

/// Write every cell's target. Returns the largest absolute offset.
fn compose(swarm: &mut Swarm, control: &ControlState, behavior: &Behavior) -> f32 {
    let sleepy_amplitude = swarm.settings.sleepy_amplitude;
    let actuator_height = swarm.grid().actuator_height();
    let noise_seed = swarm.settings.noise_seed;
    let time = swarm.elapsed;
    let raise_shape = behavior.wants_shape();
    let sleepy = *behavior == Behavior::Sleepy;

    let Swarm {
        wave,
        safe_zone,
        obstacles,
        targets,
        rest,
        ..
    } = swarm;
    let zone: &SafeZone = safe_zone;
    let obstacles: &[Vec3] = obstacles;
    let heights = wave.current();

    let mut peak = 0.0f32;
    for ((target, &rest_pos), &height) in targets.iter_mut().zip(rest.iter()).zip(heights) {
        let mut offset = height.clamp(-WAVE_DISPLAY_LIMIT, WAVE_DISPLAY_LIMIT);
        if raise_shape {
            offset += shape::evaluate(&ShapeContext {
                rest: rest_pos,
                subject: control.subject,
                zone,
                obstacles,
                actuator_height,
                time,
                noise_seed,
            });
        }
        if sleepy {
            offset += (rest_pos.x + time).sin() * sleepy_amplitude;
        }
        peak = peak.max(offset.abs());
        *target = Vec3::new(rest_pos.x, rest_pos.y + offset, rest_pos.z);
    }
    peak
}
