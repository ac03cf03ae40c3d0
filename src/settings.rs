//! Engine settings
//!
//! Loaded from a JSON file at startup; every field has a default so partial
//! files are accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ACTUATOR_HEIGHT, DEFAULT_DENSITY, DEFAULT_PORT};
use crate::error::ConfigError;

/// Accepted damping range (exclusive on both ends)
pub const DAMPING_RANGE: (f32, f32) = (0.9, 0.999);

/// Accepted ripple edge margin in cells (inclusive)
pub const RIPPLE_RADIUS_RANGE: (usize, usize) = (1, 64);

/// Engine settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Network ===
    /// UDP port the control listener binds
    pub port: u16,

    // === Geometry ===
    /// Cell spacing in world units
    pub density: f32,
    /// Physical height of one actuator (step size for stepped shapes)
    pub actuator_height: f32,

    // === Simulation ===
    /// Wave damping, strictly inside (0.9, 0.999)
    pub damping: f32,
    /// Fixed tick rate of the headless runner
    pub tick_hz: u32,
    /// Ticks between obstacle snapshot refreshes
    pub obstacle_refresh_ticks: u32,
    /// Seed for idle ripples
    pub seed: u64,
    /// Seed for the terrain noise field
    pub noise_seed: u32,

    // === Gestures ===
    /// Whether pointer channels inject ripples
    pub gestures_enabled: bool,
    /// Ripple strength per tick while a pointer is active
    pub pointer_strength: f32,
    /// Minimum distance (in cells) a ripple must keep from every edge
    pub ripple_radius: usize,

    // === Idle overlays ===
    /// Chance per tick of a random ripple while HAPPY
    pub happy_ripple_chance: f32,
    /// Strength of a HAPPY ripple
    pub happy_ripple_strength: f32,
    /// Amplitude of the SLEEPY swell
    pub sleepy_amplitude: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,

            density: DEFAULT_DENSITY,
            actuator_height: DEFAULT_ACTUATOR_HEIGHT,

            damping: 0.97,
            tick_hz: 60,
            obstacle_refresh_ticks: 30,
            seed: 0x5eed,
            noise_seed: 7,

            gestures_enabled: true,
            pointer_strength: 0.4,
            ripple_radius: 2,

            happy_ripple_chance: 1.0 / 30.0,
            happy_ripple_strength: 1.0,
            sleepy_amplitude: 0.2,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Check value ranges the engine relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = DAMPING_RANGE;
        if !(self.damping > lo && self.damping < hi) {
            return Err(invalid("damping", format!("{} is outside ({lo}, {hi})", self.damping)));
        }
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(invalid("density", format!("{} must be positive", self.density)));
        }
        if !(self.actuator_height.is_finite() && self.actuator_height > 0.0) {
            return Err(invalid(
                "actuator_height",
                format!("{} must be positive", self.actuator_height),
            ));
        }
        if self.tick_hz == 0 {
            return Err(invalid("tick_hz", "must be at least 1".to_owned()));
        }
        if self.obstacle_refresh_ticks == 0 {
            return Err(invalid("obstacle_refresh_ticks", "must be at least 1".to_owned()));
        }
        let (min_radius, max_radius) = RIPPLE_RADIUS_RANGE;
        if !(min_radius..=max_radius).contains(&self.ripple_radius) {
            return Err(invalid(
                "ripple_radius",
                format!("{} is outside {min_radius}..={max_radius}", self.ripple_radius),
            ));
        }
        if !(0.0..=1.0).contains(&self.happy_ripple_chance) {
            return Err(invalid(
                "happy_ripple_chance",
                format!("{} is not a probability", self.happy_ripple_chance),
            ));
        }
        Ok(())
    }

    /// Seconds per tick
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_hz as f32
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.port, 5005);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "port": 6000, "damping": 0.95 }"#).unwrap();
        assert_eq!(settings.port, 6000);
        assert_eq!(settings.damping, 0.95);
        assert_eq!(settings.density, DEFAULT_DENSITY);
    }

    #[test]
    fn test_damping_out_of_range_rejected() {
        for damping in [0.9, 0.999, 1.2, 0.5] {
            let json = format!(r#"{{ "damping": {damping} }}"#);
            let err = Settings::from_json(&json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "damping", .. }));
        }
    }

    #[test]
    fn test_ripple_radius_bounded() {
        for radius in [0usize, 65, usize::MAX] {
            let json = format!(r#"{{ "ripple_radius": {radius} }}"#);
            let err = Settings::from_json(&json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "ripple_radius", .. }));
        }
        assert_eq!(Settings::from_json(r#"{ "ripple_radius": 64 }"#).unwrap().ripple_radius, 64);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let err = Settings::from_json("{ port: ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("swarm-field-settings-{}.json", std::process::id()));
        let settings = Settings {
            port: 7007,
            gestures_enabled: false,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
