//! Interaction actors: pluggable energy and force contributors.
//!
//! An [`Actor`] reads particles through a [`ParticleRange`] and reports
//! energy per [`Bucket`] and/or accumulates forces. It never owns particle
//! data. Actors are kept, in registration order, in an [`ActorRegistry`].

pub mod contribution;
pub mod registry;

pub use contribution::{Bucket, Contribution};
pub use registry::{ActorRegistry, RegistryError};

use ergo_particle::{ParticleId, ParticleRange, ParticleRangeMut};
use thiserror::Error;

/// Failure inside an actor's own evaluation.
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("particle {0} is referenced but not present in the range")]
    MissingParticle(ParticleId),

    #[error("{0}")]
    Failed(String),
}

/// What an actor can compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub energy: bool,
    pub force: bool,
}

impl Capabilities {
    pub const ENERGY: Self = Self {
        energy: true,
        force: false,
    };
    pub const FORCE: Self = Self {
        energy: false,
        force: true,
    };
    pub const BOTH: Self = Self {
        energy: true,
        force: true,
    };
}

/// A source of energy and/or force terms.
///
/// Contributions must not depend on the order in which actors are
/// evaluated.
pub trait Actor: Send + Sync {
    /// Human-readable name, used in logs and error reports.
    fn name(&self) -> &str;

    /// Which of [`Actor::energy`] and [`Actor::add_forces`] are meaningful.
    fn capabilities(&self) -> Capabilities;

    /// Energy contribution over the whole (possibly sharded) range.
    ///
    /// Only called when [`Capabilities::energy`] is set.
    fn energy(&self, _particles: ParticleRange<'_>) -> Result<Contribution, ActorError> {
        Ok(Contribution::default())
    }

    /// Accumulate forces (and torques) into the particles.
    ///
    /// Only called when [`Capabilities::force`] is set.
    fn add_forces(&self, _particles: &mut ParticleRangeMut<'_>) -> Result<(), ActorError> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actor")
            .field("name", &self.name())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
