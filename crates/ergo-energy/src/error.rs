//! Error types for ergo-energy.

use ergo_actor::{ActorError, Bucket, RegistryError};
use ergo_particle::ParticleId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnergyError {
    #[error("non-finite {bucket} energy ({value}) from {origin}")]
    NumericalFault {
        origin: String,
        bucket: Bucket,
        value: f64,
    },

    #[error("non-finite force or torque from {origin} on particle {particle}")]
    NonFiniteForce { origin: String, particle: ParticleId },

    #[error("no energy has been computed yet and the system holds no particles")]
    UninitializedState,

    #[error("actor '{actor}' failed: {error}")]
    Actor {
        actor: String,
        #[source]
        error: ActorError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, EnergyError>;
