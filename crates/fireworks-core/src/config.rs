//! Celebration tuning: burst shape, timings and overlap policy, loaded from JSON

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::palette::{Color, DEFAULT_PALETTE};
use crate::Millis;

/// What `celebrate` does when a session is already running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlapPolicy {
    /// Stop the running session (clearing its particles) before starting
    #[default]
    Restart,
    /// Let sessions run side by side, each with its own sustain timer
    Stack,
}

/// Tuning for a celebration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CelebrationConfig {
    /// Particles in one burst
    pub particles_per_burst: usize,
    /// Burst colors; each burst picks one
    pub palette: Vec<Color>,
    /// Shortest particle travel distance in pixels
    pub velocity_min: f64,
    /// Longest particle travel distance in pixels
    pub velocity_max: f64,
    /// Burst origins lie in the top `origin_height_fraction` of the surface
    pub origin_height_fraction: f64,
    /// Bursts in the opening salvo
    pub cascade_bursts: usize,
    pub cascade_spacing_ms: Millis,
    pub sustain_interval_ms: Millis,
    /// The sustain timer is cancelled this long after the session starts
    pub session_duration_ms: Millis,
    pub particle_lifetime_ms: Millis,
    pub overlap: OverlapPolicy,
}

impl Default for CelebrationConfig {
    fn default() -> Self {
        Self {
            particles_per_burst: 50,
            palette: DEFAULT_PALETTE.to_vec(),
            velocity_min: 150.0,
            velocity_max: 300.0,
            origin_height_fraction: 0.7,
            cascade_bursts: 15,
            cascade_spacing_ms: 250,
            sustain_interval_ms: 400,
            session_duration_ms: 5000,
            particle_lifetime_ms: 1500,
            overlap: OverlapPolicy::Restart,
        }
    }
}

impl CelebrationConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON file, falling back to defaults if the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: CelebrationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particles_per_burst == 0 {
            return Err(ConfigError::Validation("particlesPerBurst must be > 0".into()));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Validation("palette must not be empty".into()));
        }
        if !(self.velocity_min.is_finite() && self.velocity_max.is_finite())
            || self.velocity_min < 0.0
            || self.velocity_min > self.velocity_max
        {
            return Err(ConfigError::Validation(
                "velocity range must satisfy 0 <= velocityMin <= velocityMax".into(),
            ));
        }
        if !(self.origin_height_fraction > 0.0 && self.origin_height_fraction <= 1.0) {
            return Err(ConfigError::Validation(
                "originHeightFraction must be in (0, 1]".into(),
            ));
        }
        if self.sustain_interval_ms == 0 {
            return Err(ConfigError::Validation("sustainIntervalMs must be > 0".into()));
        }
        if self.particle_lifetime_ms == 0 {
            return Err(ConfigError::Validation("particleLifetimeMs must be > 0".into()));
        }
        Ok(())
    }

    /// Fire times of the opening salvo, relative to session start
    pub fn cascade_delays(&self) -> impl Iterator<Item = Millis> + '_ {
        (0..self.cascade_bursts as Millis)
            .map(move |k| k.saturating_mul(self.cascade_spacing_ms))
    }
}
