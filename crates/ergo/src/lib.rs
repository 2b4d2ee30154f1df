//! ergo — energy accounting and momentum correction for particle simulations.
//!
//! This is the umbrella crate that provides the [`System`] state object and
//! re-exports the core types of the sub-crates.
//!
//! # Example
//!
//! ```
//! use ergo::{Particle, System, SystemConfig, Vec3};
//!
//! let mut system = System::new(SystemConfig::default()).unwrap();
//! system.add_particle(Particle::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), 1.0));
//! system.add_particle(Particle::new(Vec3::new(5.0, 0.0, 0.0), Vec3::zeros(), 2.0));
//!
//! let record = system.energy_calc().unwrap();
//! assert!((record.kinetic() - 0.5).abs() < 1e-12);
//!
//! let removed = system.galilei_transform().unwrap();
//! assert!((removed.x - 1.0 / 3.0).abs() < 1e-12);
//! assert!(system.total_momentum().norm() < 1e-12);
//! ```

pub mod config;
pub mod error;
pub mod system;

pub use config::{LennardJonesConfig, SystemConfig};
pub use error::{Error, Result};
pub use system::System;

pub use ergo_actor::{self, Actor, ActorError, ActorRegistry, Bucket, Capabilities, Contribution};
pub use ergo_energy::{
    self, Coupling, DirectCoulomb, EnergyAggregator, EnergyError, EnergyRecord, ExternalField,
    HarmonicBond, LennardJones, PairPotential,
};
pub use ergo_galilei::{self, GalileiError, MomentumMonitor};
pub use ergo_math::{self, PeriodicBox, Vec3};
pub use ergo_particle::{
    self, Particle, ParticleId, ParticleRange, ParticleRangeMut, ParticleStore, Reduce,
};
