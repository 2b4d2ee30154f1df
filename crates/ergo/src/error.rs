use ergo_actor::RegistryError;
use ergo_energy::EnergyError;
use ergo_galilei::GalileiError;
use ergo_particle::ParticleId;
use thiserror::Error;

/// Errors surfaced by [`crate::System`].
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Energy(#[from] EnergyError),

    #[error(transparent)]
    Galilei(#[from] GalileiError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown particle {0}")]
    UnknownParticle(ParticleId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
