//! Subject shapes
//!
//! Pure functions from a cell's rest position to a height contribution.
//! Every shape is zero on cells next to an obstacle and zero outside its own
//! footprint around the safe zone.

use glam::Vec3;

use super::safe_zone::SafeZone;
use crate::consts::{
    GRAVITY_EPSILON, GRAVITY_MAX_DEPTH, GRAVITY_STRENGTH, MIN_SHAPE_RADIUS, OBSTACLE_RADIUS,
};
use crate::control::Subject;
use crate::{chebyshev_distance, planar_distance, smoothstep};

/// Terrain noise sampling frequency (per world unit)
const TERRAIN_FREQUENCY: f32 = 0.6;
/// Terrain noise drift along x (per second)
const TERRAIN_DRIFT: f32 = 0.05;
/// Peak terrain height as a fraction of the safe radius
const TERRAIN_SCALE: f32 = 0.8;
/// Saddle amplitude and lift as fractions of the safe radius.
/// Equal values keep the saddle's lowest point on the rest plane.
const SADDLE_SCALE: f32 = 0.5;
const SADDLE_LIFT: f32 = 0.5;

/// Inputs to a shape evaluation for one cell
#[derive(Debug, Clone, Copy)]
pub struct ShapeContext<'a> {
    pub rest: Vec3,
    pub subject: Subject,
    pub zone: &'a SafeZone,
    pub obstacles: &'a [Vec3],
    /// Step size of the stepped pyramid
    pub actuator_height: f32,
    /// Seconds since start, animates the terrain
    pub time: f32,
    pub noise_seed: u32,
}

/// Whether `p` lies inside an obstacle's reserved disc
pub fn near_obstacle(p: Vec3, obstacles: &[Vec3]) -> bool {
    obstacles
        .iter()
        .any(|&o| planar_distance(p, o) < OBSTACLE_RADIUS)
}

/// Height contribution of the subject shape at one cell
pub fn evaluate(ctx: &ShapeContext<'_>) -> f32 {
    if near_obstacle(ctx.rest, ctx.obstacles) {
        return 0.0;
    }
    match ctx.subject {
        Subject::Physics => gravity_well(ctx.rest, ctx.obstacles),
        Subject::Geography => terrain(ctx),
        Subject::Math => saddle(ctx.rest, ctx.zone),
        Subject::History => ziggurat(ctx.rest, ctx.zone, ctx.actuator_height),
    }
}

/// Inverse-square pull toward every obstacle, as a depression
fn gravity_well(p: Vec3, obstacles: &[Vec3]) -> f32 {
    let pull: f32 = obstacles
        .iter()
        .map(|&o| {
            let d = planar_distance(p, o);
            GRAVITY_STRENGTH / (d * d + GRAVITY_EPSILON)
        })
        .sum();
    -pull.clamp(0.0, GRAVITY_MAX_DEPTH)
}

fn terrain(ctx: &ShapeContext<'_>) -> f32 {
    let zone = ctx.zone;
    if zone.radius <= MIN_SHAPE_RADIUS {
        return 0.0;
    }
    let d = planar_distance(ctx.rest, zone.center);
    if d >= zone.radius {
        return 0.0;
    }
    let n = value_noise2(
        ctx.rest.x * TERRAIN_FREQUENCY + ctx.time * TERRAIN_DRIFT,
        ctx.rest.z * TERRAIN_FREQUENCY,
        ctx.noise_seed,
    );
    let falloff = 1.0 - smoothstep(d / zone.radius);
    n * zone.radius * TERRAIN_SCALE * falloff
}

fn saddle(p: Vec3, zone: &SafeZone) -> f32 {
    if zone.radius <= MIN_SHAPE_RADIUS {
        return 0.0;
    }
    if planar_distance(p, zone.center) >= zone.radius {
        return 0.0;
    }
    let nx = (p.x - zone.center.x) / zone.radius;
    let nz = (p.z - zone.center.z) / zone.radius;
    ((nx * nx - nz * nz) * zone.radius * SADDLE_SCALE + zone.radius * SADDLE_LIFT).max(0.0)
}

/// Stepped pyramid over a square footprint
fn ziggurat(p: Vec3, zone: &SafeZone, step: f32) -> f32 {
    if zone.radius <= MIN_SHAPE_RADIUS || step <= 0.0 {
        return 0.0;
    }
    let d = chebyshev_distance(p, zone.center);
    if d >= zone.radius {
        return 0.0;
    }
    ((zone.radius - d) / step).floor() * step
}

fn hash_u32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846ca68b);
    x ^= x >> 16;
    x
}

fn lattice(x: i32, y: i32, seed: u32) -> f32 {
    let h = hash_u32(seed ^ (x as u32).wrapping_mul(0x9e3779b1) ^ (y as u32).wrapping_mul(0x85ebca6b));
    ((h & 0x00FF_FFFF) as f32) / 16_777_215.0
}

/// Smooth value noise in [0, 1]
pub fn value_noise2(x: f32, y: f32, seed: u32) -> f32 {
    let xi = x.floor() as i32;
    let yi = y.floor() as i32;
    let u = smoothstep(x - xi as f32);
    let v = smoothstep(y - yi as f32);

    let h00 = lattice(xi, yi, seed);
    let h10 = lattice(xi + 1, yi, seed);
    let h01 = lattice(xi, yi + 1, seed);
    let h11 = lattice(xi + 1, yi + 1, seed);

    let x0 = h00 + (h10 - h00) * u;
    let x1 = h01 + (h11 - h01) * u;
    (x0 + (x1 - x0) * v).clamp(0.0, 1.0)
}
