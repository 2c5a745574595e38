//! Particles and bursts

use crate::config::CelebrationConfig;
use crate::palette::Color;
use crate::rng::RandomSource;
use crate::Millis;
use serde::Serialize;
use std::f64::consts::TAU;
use std::fmt;

/// Identifies one particle on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParticleId(pub u64);

/// Identifies one burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BurstId(pub u64);

/// Point in surface coordinates (pixels, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Extent of the rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both extents finite and positive
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single firework particle. Travels from `origin` by `displacement`
/// over `lifetime_ms`, then is removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub id: ParticleId,
    pub burst: BurstId,
    pub origin: Point,
    pub color: Color,
    /// Direction in radians
    pub angle: f64,
    /// Travel distance in pixels
    pub velocity: f64,
    pub displacement: Point,
    pub created_at: Millis,
    pub lifetime_ms: Millis,
}

impl Particle {
    pub fn expires_at(&self) -> Millis {
        self.created_at.saturating_add(self.lifetime_ms)
    }

    /// Linear animation progress in `[0, 1]`
    pub fn progress(&self, now: Millis) -> f64 {
        if self.lifetime_ms == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.created_at) as f64;
        (elapsed / self.lifetime_ms as f64).min(1.0)
    }

    /// Rendered position at `now` with an ease-out translation
    pub fn position_at(&self, now: Millis) -> Point {
        let eased = ease_out(self.progress(now));
        Point::new(
            self.origin.x + self.displacement.x * eased,
            self.origin.y + self.displacement.y * eased,
        )
    }

    /// Opacity for hosts that fade particles out: 1.0 at launch, 0.0 at expiry
    pub fn opacity(&self, now: Millis) -> f64 {
        1.0 - self.progress(now)
    }
}

/// CSS `ease-out`, i.e. `cubic-bezier(0, 0, 0.58, 1)`
pub fn ease_out(t: f64) -> f64 {
    const X1: f64 = 0.0;
    const X2: f64 = 0.58;
    const Y1: f64 = 0.0;
    const Y2: f64 = 1.0;

    let t = t.clamp(0.0, 1.0);
    let bezier = |p1: f64, p2: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    };
    let slope = |p1: f64, p2: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
    };

    // Solve x(s) = t for s with Newton steps, falling back to bisection
    let mut s = t;
    for _ in 0..8 {
        let err = bezier(X1, X2, s) - t;
        if err.abs() < 1e-7 {
            return bezier(Y1, Y2, s);
        }
        let d = slope(X1, X2, s);
        if d.abs() < 1e-6 {
            break;
        }
        s = (s - err / d).clamp(0.0, 1.0);
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..40 {
        let x = bezier(X1, X2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier(Y1, Y2, s)
}

/// Angle of particle `index` in a burst of `count`, evenly spaced around the circle
pub fn burst_angle(index: usize, count: usize) -> f64 {
    TAU * index as f64 / count as f64
}

/// Hands out particle and burst ids
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_particle: u64,
    next_burst: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particle(&mut self) -> ParticleId {
        let id = ParticleId(self.next_particle);
        self.next_particle += 1;
        id
    }

    pub fn burst(&mut self) -> BurstId {
        let id = BurstId(self.next_burst);
        self.next_burst += 1;
        id
    }
}

/// One radially symmetric explosion: shared origin and color
#[derive(Debug, Clone)]
pub struct Burst {
    pub id: BurstId,
    pub origin: Point,
    pub color: Color,
    pub particles: Vec<Particle>,
}

/// Generate a burst at a random point in the upper band of the surface.
///
/// Draw order: x, y, color, then one velocity per particle.
pub fn spawn_burst<R: RandomSource + ?Sized>(
    rng: &mut R,
    size: SurfaceSize,
    now: Millis,
    config: &CelebrationConfig,
    ids: &mut IdAllocator,
) -> Burst {
    let x = rng.next_unit() * size.width;
    let y = rng.next_unit() * (size.height * config.origin_height_fraction);
    let origin = Point::new(x, y);
    let color = config.palette[rng.gen_index(config.palette.len())];
    let burst = ids.burst();

    let count = config.particles_per_burst;
    let particles = (0..count)
        .map(|i| {
            let angle = burst_angle(i, count);
            let velocity = rng.gen_range_f64(config.velocity_min, config.velocity_max);
            Particle {
                id: ids.particle(),
                burst,
                origin,
                color,
                angle,
                velocity,
                displacement: Point::new(angle.cos() * velocity, angle.sin() * velocity),
                created_at: now,
                lifetime_ms: config.particle_lifetime_ms,
            }
        })
        .collect();

    Burst {
        id: burst,
        origin,
        color,
        particles,
    }
}
