//! Momentum correction for particle systems.
//!
//! Removes spurious bulk motion (center-of-mass drift) that accumulates from
//! integration error or from thermostats that do not conserve momentum.
//! Everything here is a free function over a particle range; the only state
//! is the optional [`MomentumMonitor`] baseline.

pub mod cms;
pub mod monitor;
pub mod transform;

pub use cms::{calc_system_cms_position, calc_system_cms_velocity, total_mass, total_momentum};
pub use monitor::MomentumMonitor;
pub use transform::{galilei_transform, kill_particle_forces, kill_particle_motion};

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GalileiError {
    #[error("center of mass is undefined: total mass is zero")]
    EmptySystem,
}

pub type Result<T> = std::result::Result<T, GalileiError>;
