//! Victory fireworks for a Connect Four front end.
//!
//! A celebration opens with a salvo of bursts, keeps bursting on a fixed
//! period until its deadline, and lets every particle finish its own flight
//! before it is removed. All timing runs on a virtual millisecond clock
//! driven by the host through [`CelebrationEngine::tick`].
//!
//! ```
//! use fireworks_core::{CelebrationEngine, MemorySurface};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut engine = CelebrationEngine::new(
//!     MemorySurface::new(1280.0, 720.0),
//!     StdRng::seed_from_u64(1),
//! );
//! let session = engine.celebrate(0).unwrap();
//! engine.tick(0);
//! assert_eq!(engine.surface().len(), 50);
//! engine.stop(session);
//! assert!(engine.surface().is_empty());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod outcome;
pub mod palette;
pub mod particle;
pub mod rng;
pub mod scheduler;
pub mod surface;

/// Milliseconds on the host's monotonic clock
pub type Millis = u64;

pub use config::{CelebrationConfig, OverlapPolicy};
pub use engine::{CelebrationEngine, SessionHandle, SessionInfo, SessionState, TickReport};
pub use error::{CelebrationError, ConfigError, SurfaceError};
pub use outcome::{CelebrationTrigger, GameStatus, Winner};
pub use palette::{Color, DEFAULT_PALETTE};
pub use particle::{Burst, BurstId, Particle, ParticleId, Point, SurfaceSize};
pub use rng::{RandomSource, ScriptedRandom};
pub use surface::{MemorySurface, Surface};
