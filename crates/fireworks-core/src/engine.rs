//! Celebration sessions: opening salvo, sustained bursts, timed stop, and
//! per-particle retirement.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace, warn};

use crate::config::{CelebrationConfig, OverlapPolicy};
use crate::error::{CelebrationError, ConfigError};
use crate::particle::{spawn_burst, IdAllocator, Particle, ParticleId};
use crate::rng::RandomSource;
use crate::scheduler::{Scheduler, TimerId};
use crate::surface::Surface;
use crate::Millis;

/// Identifies one celebration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionHandle(u64);

/// Lifecycle of a celebration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Sustain timer armed, bursts still being created
    Running,
    /// No more sustained bursts; waiting for the salvo and live particles to finish
    Draining,
    /// Every burst fired and every particle removed
    Finished,
    /// Torn down by [`CelebrationEngine::stop`]
    Stopped,
}

impl SessionState {
    pub fn is_live(self) -> bool {
        matches!(self, SessionState::Running | SessionState::Draining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    CascadeBurst(SessionHandle),
    SustainBurst(SessionHandle),
    StopSustain(SessionHandle),
    Retire(ParticleId),
}

#[derive(Debug)]
struct Session {
    started_at: Millis,
    deadline: Millis,
    state: SessionState,
    sustain: Option<TimerId>,
    stop_timer: Option<TimerId>,
    cascade: BTreeSet<TimerId>,
    particles: BTreeSet<ParticleId>,
    bursts_fired: usize,
}

#[derive(Debug)]
struct LiveParticle {
    particle: Particle,
    session: SessionHandle,
    retire: TimerId,
}

/// Read-only view of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub handle: SessionHandle,
    pub state: SessionState,
    pub started_at: Millis,
    pub deadline: Millis,
    pub bursts_fired: usize,
    pub live_particles: usize,
    pub pending_cascade: usize,
}

/// What one call to [`CelebrationEngine::tick`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub bursts_fired: usize,
    pub particles_attached: usize,
    pub particles_retired: usize,
    pub attach_failures: usize,
    pub sessions_finished: Vec<SessionHandle>,
}

impl TickReport {
    pub fn is_quiet(&self) -> bool {
        *self == TickReport::default()
    }
}

/// Owns the surface, the randomness source, and every timer of every session.
///
/// All work happens inside [`tick`](Self::tick): the host calls it with a
/// monotonic millisecond clock (frame callback, poll loop, test) and each due
/// timer runs to completion in due order.
pub struct CelebrationEngine<S, R> {
    surface: S,
    rng: R,
    config: CelebrationConfig,
    scheduler: Scheduler<Event>,
    ids: IdAllocator,
    sessions: BTreeMap<SessionHandle, Session>,
    live: BTreeMap<ParticleId, LiveParticle>,
    /// Sessions finished since the last `tick` returned
    finished: Vec<SessionHandle>,
    next_session: u64,
    clock: Millis,
}

impl<S: Surface, R: RandomSource> CelebrationEngine<S, R> {
    pub fn new(surface: S, rng: R) -> Self {
        Self::build(surface, rng, CelebrationConfig::default())
    }

    /// Engine with custom tuning. The config is validated first.
    pub fn with_config(
        surface: S,
        rng: R,
        config: CelebrationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(surface, rng, config))
    }

    fn build(surface: S, rng: R, config: CelebrationConfig) -> Self {
        Self {
            surface,
            rng,
            config,
            scheduler: Scheduler::new(),
            ids: IdAllocator::new(),
            sessions: BTreeMap::new(),
            live: BTreeMap::new(),
            finished: Vec::new(),
            next_session: 0,
            clock: 0,
        }
    }

    pub fn config(&self) -> &CelebrationConfig {
        &self.config
    }

    /// Replace the tuning. Running sessions keep their already-armed timers.
    pub fn set_config(&mut self, config: CelebrationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Latest time seen by `celebrate` or `tick`
    pub fn clock(&self) -> Millis {
        self.clock
    }

    /// Start a celebration at `now`.
    ///
    /// Only schedules work; the first burst is created by the next `tick`.
    pub fn celebrate(&mut self, now: Millis) -> Result<SessionHandle, CelebrationError> {
        let size = self.surface.size();
        if !size.is_usable() {
            return Err(CelebrationError::SurfaceUnavailable(size));
        }
        self.clock = self.clock.max(now);

        if self.config.overlap == OverlapPolicy::Restart {
            let running: Vec<SessionHandle> = self
                .sessions
                .iter()
                .filter(|(_, s)| s.state.is_live())
                .map(|(h, _)| *h)
                .collect();
            for handle in running {
                debug!("restarting: stopping session {:?}", handle);
                self.stop(handle);
            }
        }

        let handle = SessionHandle(self.next_session);
        self.next_session += 1;

        let cascade: BTreeSet<TimerId> = self
            .config
            .cascade_delays()
            .collect::<Vec<_>>()
            .into_iter()
            .map(|delay| self.scheduler.after(now, delay, Event::CascadeBurst(handle)))
            .collect();
        let sustain = self.scheduler.every(
            now,
            self.config.sustain_interval_ms,
            Event::SustainBurst(handle),
        );
        let deadline = now.saturating_add(self.config.session_duration_ms);
        let stop_timer = self.scheduler.after(
            now,
            self.config.session_duration_ms,
            Event::StopSustain(handle),
        );

        self.sessions.insert(
            handle,
            Session {
                started_at: now,
                deadline,
                state: SessionState::Running,
                sustain: Some(sustain),
                stop_timer: Some(stop_timer),
                cascade,
                particles: BTreeSet::new(),
                bursts_fired: 0,
            },
        );
        debug!(
            "session {:?} started at {}ms, sustain stops at {}ms",
            handle, now, deadline
        );
        Ok(handle)
    }

    /// Run every timer due at or before `now`.
    pub fn tick(&mut self, now: Millis) -> TickReport {
        self.clock = self.clock.max(now);
        let mut report = TickReport::default();
        while let Some((due, timer, event)) = self.scheduler.pop_due(now) {
            match event {
                Event::CascadeBurst(handle) => {
                    if let Some(session) = self.sessions.get_mut(&handle) {
                        session.cascade.remove(&timer);
                    }
                    self.fire_burst(handle, due, &mut report);
                    self.finish_if_done(handle);
                }
                Event::SustainBurst(handle) => {
                    let past_deadline = self
                        .sessions
                        .get(&handle)
                        .map_or(true, |s| due >= s.deadline);
                    if past_deadline {
                        // Stop timer shares this instant; it wins
                        self.scheduler.cancel(timer);
                        if let Some(session) = self.sessions.get_mut(&handle) {
                            session.sustain = None;
                        }
                    } else {
                        self.fire_burst(handle, due, &mut report);
                    }
                }
                Event::StopSustain(handle) => {
                    if let Some(session) = self.sessions.get_mut(&handle) {
                        if let Some(sustain) = session.sustain.take() {
                            self.scheduler.cancel(sustain);
                        }
                        session.stop_timer = None;
                        if session.state == SessionState::Running {
                            session.state = SessionState::Draining;
                        }
                        debug!("session {:?} sustain stopped at {}ms", handle, due);
                    }
                    self.finish_if_done(handle);
                }
                Event::Retire(id) => {
                    if let Some(handle) = self.retire(id) {
                        report.particles_retired += 1;
                        self.finish_if_done(handle);
                    }
                }
            }
        }
        report.sessions_finished = std::mem::take(&mut self.finished);
        report
    }

    fn fire_burst(&mut self, handle: SessionHandle, at: Millis, report: &mut TickReport) {
        match self.sessions.get(&handle) {
            Some(session) if session.state.is_live() => {}
            _ => return,
        }
        let size = self.surface.size();
        if !size.is_usable() {
            warn!(
                "skipping burst for session {:?}: surface is {}x{}",
                handle, size.width, size.height
            );
            return;
        }

        let burst = spawn_burst(&mut self.rng, size, at, &self.config, &mut self.ids);
        trace!(
            "burst {:?} at {}ms: origin ({:.0}, {:.0}) color {}",
            burst.id,
            at,
            burst.origin.x,
            burst.origin.y,
            burst.color
        );

        let mut attached = Vec::with_capacity(burst.particles.len());
        for particle in burst.particles {
            if let Err(e) = self.surface.attach(&particle) {
                warn!("particle {:?} not shown: {}", particle.id, e);
                report.attach_failures += 1;
                continue;
            }
            let retire = self
                .scheduler
                .after(at, particle.lifetime_ms, Event::Retire(particle.id));
            attached.push(particle.id);
            self.live.insert(
                particle.id,
                LiveParticle {
                    particle,
                    session: handle,
                    retire,
                },
            );
        }

        report.bursts_fired += 1;
        report.particles_attached += attached.len();
        if let Some(session) = self.sessions.get_mut(&handle) {
            session.bursts_fired += 1;
            session.particles.extend(attached);
        }
    }

    /// Detach a live particle. Returns its session, or None if it was already gone.
    fn retire(&mut self, id: ParticleId) -> Option<SessionHandle> {
        let live = self.live.remove(&id)?;
        self.scheduler.cancel(live.retire);
        self.surface.detach(id);
        if let Some(session) = self.sessions.get_mut(&live.session) {
            session.particles.remove(&id);
        }
        Some(live.session)
    }

    fn finish_if_done(&mut self, handle: SessionHandle) {
        if let Some(session) = self.sessions.get_mut(&handle) {
            if session.state == SessionState::Draining
                && session.cascade.is_empty()
                && session.particles.is_empty()
            {
                session.state = SessionState::Finished;
                debug!(
                    "session {:?} finished after {} bursts",
                    handle, session.bursts_fired
                );
                self.finished.push(handle);
            }
        }
    }

    fn cancel_pending(&mut self, handle: SessionHandle) {
        if let Some(session) = self.sessions.get_mut(&handle) {
            for timer in std::mem::take(&mut session.cascade) {
                self.scheduler.cancel(timer);
            }
            if let Some(sustain) = session.sustain.take() {
                self.scheduler.cancel(sustain);
            }
            if let Some(stop) = session.stop_timer.take() {
                self.scheduler.cancel(stop);
            }
        }
    }

    /// Tear a session down now: no further bursts, and every particle it
    /// created is removed from the surface. Returns false if the session was
    /// not live.
    pub fn stop(&mut self, handle: SessionHandle) -> bool {
        match self.sessions.get(&handle) {
            Some(session) if session.state.is_live() => {}
            _ => return false,
        }
        self.cancel_pending(handle);

        let particles = self
            .sessions
            .get_mut(&handle)
            .map(|s| std::mem::take(&mut s.particles))
            .unwrap_or_default();
        let removed = particles.len();
        for id in particles {
            self.retire(id);
        }
        if let Some(session) = self.sessions.get_mut(&handle) {
            session.state = SessionState::Stopped;
        }
        debug!("session {:?} stopped, {} particles removed", handle, removed);
        true
    }

    /// Stop creating bursts for a session but let live particles finish
    /// their flight. Returns false if the session was not live.
    ///
    /// A session with nothing left on screen finishes right away; it is
    /// listed in the next [`TickReport::sessions_finished`].
    pub fn wind_down(&mut self, handle: SessionHandle) -> bool {
        match self.sessions.get(&handle) {
            Some(session) if session.state.is_live() => {}
            _ => return false,
        }
        self.cancel_pending(handle);
        if let Some(session) = self.sessions.get_mut(&handle) {
            session.state = SessionState::Draining;
        }
        self.finish_if_done(handle);
        debug!("session {:?} winding down", handle);
        true
    }

    /// Stop every live session
    pub fn stop_all(&mut self) -> usize {
        let live: Vec<SessionHandle> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.state.is_live())
            .map(|(h, _)| *h)
            .collect();
        live.into_iter().filter(|h| self.stop(*h)).count()
    }

    pub fn session(&self, handle: SessionHandle) -> Option<SessionInfo> {
        self.sessions.get(&handle).map(|s| SessionInfo {
            handle,
            state: s.state,
            started_at: s.started_at,
            deadline: s.deadline,
            bursts_fired: s.bursts_fired,
            live_particles: s.particles.len(),
            pending_cascade: s.cascade.len(),
        })
    }

    /// Most recently started session that is still live
    pub fn active_session(&self) -> Option<SessionHandle> {
        self.sessions
            .iter()
            .rev()
            .find(|(_, s)| s.state.is_live())
            .map(|(h, _)| *h)
    }

    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        self.live.values().map(|l| &l.particle)
    }

    pub fn live_particle_count(&self) -> usize {
        self.live.len()
    }

    /// No timers armed and nothing on the surface
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_empty() && self.live.is_empty()
    }

    /// When the next timer is due, for hosts that sleep between ticks
    pub fn next_wakeup(&mut self) -> Option<Millis> {
        self.scheduler.next_due()
    }

    /// Forget finished and stopped sessions
    pub fn prune_sessions(&mut self) {
        self.sessions.retain(|_, s| s.state.is_live());
    }
}
