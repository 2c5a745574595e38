use std::collections::{BTreeMap, BTreeSet};

use fireworks_core::{
    BurstId, CelebrationConfig, CelebrationEngine, CelebrationError, Color, MemorySurface, Millis, Particle,
    ParticleId, SessionState, Surface, SurfaceError, SurfaceSize, DEFAULT_PALETTE,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Memory surface that also keeps every particle it was ever given
struct RecordingSurface {
    inner: MemorySurface,
    history: Vec<Particle>,
    detaches: Vec<ParticleId>,
}

impl RecordingSurface {
    fn new(width: f64, height: f64) -> Self {
        Self {
            inner: MemorySurface::new(width, height),
            history: Vec::new(),
            detaches: Vec::new(),
        }
    }

    /// Burst id -> (created_at, color, particle count)
    fn bursts(&self) -> BTreeMap<BurstId, (Millis, BTreeSet<Color>, usize)> {
        let mut out: BTreeMap<BurstId, (Millis, BTreeSet<Color>, usize)> = BTreeMap::new();
        for p in &self.history {
            let entry = out
                .entry(p.burst)
                .or_insert_with(|| (p.created_at, BTreeSet::new(), 0));
            entry.1.insert(p.color);
            entry.2 += 1;
        }
        out
    }

    fn burst_times(&self) -> Vec<Millis> {
        let mut times: Vec<Millis> = self.bursts().values().map(|b| b.0).collect();
        times.sort_unstable();
        times
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.inner.size()
    }

    fn attach(&mut self, particle: &Particle) -> Result<(), SurfaceError> {
        self.inner.attach(particle)?;
        self.history.push(particle.clone());
        Ok(())
    }

    fn detach(&mut self, id: ParticleId) {
        if self.inner.get(id).is_some() {
            self.detaches.push(id);
        }
        self.inner.detach(id);
    }
}

fn engine(seed: u64) -> CelebrationEngine<RecordingSurface, StdRng> {
    CelebrationEngine::new(
        RecordingSurface::new(1280.0, 720.0),
        StdRng::seed_from_u64(seed),
    )
}

fn expected_burst_times() -> Vec<Millis> {
    let mut times: Vec<Millis> = (0..15).map(|k| k * 250).collect();
    times.extend((1..=12).map(|k| k * 400));
    times.sort_unstable();
    times
}

#[test]
fn full_session_timeline() {
    let mut engine = engine(1);
    let session = engine.celebrate(0).unwrap();

    // Step through in 10ms frames like a host would
    let mut now = 0;
    while now <= 4990 {
        engine.tick(now);
        now += 10;
    }
    assert_eq!(engine.session(session).unwrap().state, SessionState::Running);

    engine.tick(5000);
    assert_eq!(engine.session(session).unwrap().state, SessionState::Draining);
    assert_eq!(engine.surface().burst_times(), expected_burst_times());

    // Nothing new after the deadline
    engine.tick(20_000);
    assert_eq!(engine.surface().burst_times(), expected_burst_times());
    assert_eq!(engine.session(session).unwrap().state, SessionState::Finished);
    assert_eq!(engine.session(session).unwrap().bursts_fired, 27);
    assert!(engine.is_idle());
}

#[test]
fn last_sustain_particles_removed_at_6300() {
    let mut engine = engine(2);
    let session = engine.celebrate(0).unwrap();
    engine.tick(6299);

    let last: Vec<&Particle> = engine.live_particles().collect();
    assert_eq!(last.len(), 50);
    assert!(last.iter().all(|p| p.created_at == 4800));
    assert_eq!(engine.session(session).unwrap().state, SessionState::Draining);

    let report = engine.tick(6300);
    assert_eq!(report.particles_retired, 50);
    assert_eq!(report.sessions_finished, vec![session]);
    assert!(engine.surface().inner.is_empty());
}

#[test]
fn every_particle_removed_after_its_lifetime() {
    let mut engine = engine(3);
    engine.celebrate(0).unwrap();

    for now in (0..=7000).step_by(50) {
        engine.tick(now);
        for p in engine.live_particles() {
            assert!(now < p.created_at + 1500, "particle {:?} outlived its lifetime", p.id);
        }
    }
    let surface = engine.surface();
    assert_eq!(surface.history.len(), 27 * 50);
    assert_eq!(surface.detaches.len(), surface.history.len());
    let unique: BTreeSet<ParticleId> = surface.detaches.iter().copied().collect();
    assert_eq!(unique.len(), surface.detaches.len(), "particle detached twice");
}

#[test]
fn each_burst_has_one_palette_color() {
    let mut engine = engine(4);
    engine.celebrate(0).unwrap();
    engine.tick(5000);

    for (count, colors) in engine
        .surface()
        .bursts()
        .values()
        .map(|(_, colors, count)| (*count, colors))
    {
        assert_eq!(count, 50);
        assert_eq!(colors.len(), 1);
        assert!(colors.iter().all(|c| DEFAULT_PALETTE.contains(c)));
    }
}

#[test]
fn origins_and_velocities_in_range() {
    for seed in 0..20 {
        let mut engine = engine(seed);
        engine.celebrate(0).unwrap();
        engine.tick(5000);
        for p in &engine.surface().history {
            assert!((150.0..=300.0).contains(&p.velocity));
            assert!(p.origin.x >= 0.0 && p.origin.x <= 1280.0);
            assert!(p.origin.y >= 0.0 && p.origin.y <= 0.7 * 720.0);
        }
    }
}

#[test]
fn stop_before_deadline_halts_bursts() {
    let mut engine = engine(5);
    let session = engine.celebrate(0).unwrap();
    engine.tick(1000);
    // Cascade at 0..=1000 and sustain at 400, 800
    assert_eq!(engine.session(session).unwrap().bursts_fired, 7);

    assert!(engine.stop(session));
    assert!(engine.surface().inner.is_empty());
    engine.tick(10_000);
    let info = engine.session(session).unwrap();
    assert_eq!(info.bursts_fired, 7);
    assert_eq!(info.state, SessionState::Stopped);
    assert_eq!(engine.surface().burst_times().len(), 7);
    assert!(engine.is_idle());
}

#[test]
fn wind_down_keeps_fired_bursts_visible() {
    let mut engine = engine(6);
    let session = engine.celebrate(0).unwrap();
    engine.tick(600);
    let live_before = engine.live_particle_count();
    assert!(engine.wind_down(session));
    assert_eq!(engine.live_particle_count(), live_before);

    engine.tick(10_000);
    assert_eq!(engine.session(session).unwrap().state, SessionState::Finished);
    assert_eq!(engine.surface().burst_times(), vec![0, 250, 400, 500]);
}

#[test]
fn coarse_tick_catches_up() {
    let mut engine = engine(7);
    let session = engine.celebrate(100).unwrap();
    let report = engine.tick(10_000);
    assert_eq!(report.bursts_fired, 27);
    assert_eq!(report.particles_retired, 27 * 50);
    assert_eq!(report.sessions_finished, vec![session]);
}

#[test]
fn cascade_past_deadline_fires_while_draining() {
    let config = CelebrationConfig {
        cascade_bursts: 30,
        session_duration_ms: 1000,
        ..CelebrationConfig::default()
    };
    let mut engine = CelebrationEngine::with_config(
        RecordingSurface::new(1280.0, 720.0),
        StdRng::seed_from_u64(9),
        config,
    )
    .unwrap();
    let session = engine.celebrate(0).unwrap();

    engine.tick(1000);
    let info = engine.session(session).unwrap();
    assert_eq!(info.state, SessionState::Draining);
    assert_eq!(info.pending_cascade, 25);

    engine.tick(8749);
    let mut expected: Vec<Millis> = (0..30).map(|k| k * 250).collect();
    expected.extend([400, 800]);
    expected.sort_unstable();
    assert_eq!(engine.surface().burst_times(), expected);
    assert_eq!(engine.session(session).unwrap().state, SessionState::Draining);

    // Last cascade burst at 7250 lives until 8750
    let report = engine.tick(8750);
    assert_eq!(report.sessions_finished, vec![session]);
    assert!(engine.is_idle());
}

#[test]
fn zero_height_surface_is_rejected() {
    let mut engine = CelebrationEngine::new(
        RecordingSurface::new(1280.0, 0.0),
        StdRng::seed_from_u64(8),
    );
    assert!(matches!(
        engine.celebrate(0),
        Err(CelebrationError::SurfaceUnavailable(_))
    ));
}
