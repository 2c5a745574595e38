//! Rendering surface seam

use std::collections::BTreeMap;

use crate::error::SurfaceError;
use crate::particle::{Particle, ParticleId, SurfaceSize};

/// A positioned surface the engine draws particles onto.
///
/// The host owns the actual pixels: a DOM container, a terminal, a canvas.
pub trait Surface {
    fn size(&self) -> SurfaceSize;

    /// Insert a particle at its origin and start its outward transition
    fn attach(&mut self, particle: &Particle) -> Result<(), SurfaceError>;

    /// Remove a particle. Ids that are not attached are ignored.
    fn detach(&mut self, id: ParticleId);
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> SurfaceSize {
        (**self).size()
    }

    fn attach(&mut self, particle: &Particle) -> Result<(), SurfaceError> {
        (**self).attach(particle)
    }

    fn detach(&mut self, id: ParticleId) {
        (**self).detach(id)
    }
}

/// In-memory surface. Keeps attached particles in id order.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    size: SurfaceSize,
    particles: BTreeMap<ParticleId, Particle>,
    accepting: bool,
    attached_total: u64,
    detached_total: u64,
}

impl MemorySurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            particles: BTreeMap::new(),
            accepting: true,
            attached_total: 0,
            detached_total: 0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = SurfaceSize::new(width, height);
    }

    /// When false, every `attach` fails with [`SurfaceError::Detached`]
    pub fn set_accepting(&mut self, accepting: bool) {
        self.accepting = accepting;
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.values()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(&id)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles ever attached
    pub fn attached_total(&self) -> u64 {
        self.attached_total
    }

    /// Particles actually removed (ignored detaches not counted)
    pub fn detached_total(&self) -> u64 {
        self.detached_total
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn attach(&mut self, particle: &Particle) -> Result<(), SurfaceError> {
        if !self.accepting {
            return Err(SurfaceError::Detached);
        }
        if self.particles.contains_key(&particle.id) {
            return Err(SurfaceError::Rejected(
                particle.id,
                "already attached".to_string(),
            ));
        }
        self.particles.insert(particle.id, particle.clone());
        self.attached_total += 1;
        Ok(())
    }

    fn detach(&mut self, id: ParticleId) {
        if self.particles.remove(&id).is_some() {
            self.detached_total += 1;
        }
    }
}
