use std::path::PathBuf;

use crate::particle::{ParticleId, SurfaceSize};

/// Errors a rendering surface reports when it cannot take a particle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface rejected particle {0:?}: {1}")]
    Rejected(ParticleId, String),

    #[error("surface is detached from its host")]
    Detached,
}

/// Errors that can occur when starting a celebration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CelebrationError {
    #[error("rendering surface unavailable (size {0})")]
    SurfaceUnavailable(SurfaceSize),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_unavailable_display() {
        let err = CelebrationError::SurfaceUnavailable(SurfaceSize::new(0.0, 600.0));
        assert_eq!(err.to_string(), "rendering surface unavailable (size 0x600)");
    }

    #[test]
    fn test_surface_error_display() {
        let err = SurfaceError::Rejected(ParticleId(7), "container full".to_string());
        assert_eq!(
            err.to_string(),
            "surface rejected particle ParticleId(7): container full"
        );
    }
}
