//! Error types for swarm-field

use std::path::PathBuf;

use thiserror::Error;

/// Failures while establishing the grid. These are fatal: the simulation
/// cannot start without geometry.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("no surface provided; the grid cannot be laid out")]
    MissingSurface,

    #[error("cell density must be a positive finite number, got {0}")]
    InvalidDensity(f32),

    #[error("surface {width}x{depth} holds no cells at density {density}")]
    EmptyGrid { width: f32, depth: f32, density: f32 },
}

/// Failures while loading or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures while starting the control listener
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to configure listener socket: {0}")]
    Socket(#[source] std::io::Error),

    #[error("failed to spawn listener thread: {0}")]
    Spawn(#[source] std::io::Error),
}
