//! Energy aggregation for particle simulations.
//!
//! The [`EnergyAggregator`] combines three sources into one categorized
//! [`EnergyRecord`]:
//! - kinetic energy, reduced shard by shard over the particle range,
//! - the built-in [`Interactions`] (non-bonded pairs and bonds),
//! - every actor in the [`ergo_actor::ActorRegistry`], in registration order.
//!
//! The last successful record is cached and reused by
//! [`EnergyAggregator::update_energy`] until the time changes or the cache
//! is invalidated.
//!
//! # Example
//!
//! ```
//! use ergo_energy::{EnergyAggregator, ExternalField};
//! use ergo_math::Vec3;
//! use ergo_particle::{Particle, ParticleStore};
//! use std::sync::Arc;
//!
//! let store = ParticleStore::from_particles(
//!     2,
//!     [Particle::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), 2.0)],
//! );
//!
//! let mut energy = EnergyAggregator::new();
//! energy
//!     .register(Arc::new(ExternalField::gravity(Vec3::new(0.0, 0.0, -9.81))))
//!     .unwrap();
//!
//! let record = energy.energy_calc(0.0, store.range()).unwrap();
//! assert!((record.kinetic() - 1.0).abs() < 1e-12);
//! assert!((record.potential() - 19.62).abs() < 1e-12);
//! ```

pub mod aggregator;
pub mod error;
pub mod long_range;
pub mod potentials;
pub mod record;
pub mod short_range;

pub use aggregator::{EnergyAggregator, EnergyCache, kinetic_energy};
pub use error::{EnergyError, Result};
pub use long_range::{Coupling, DirectCoulomb, ExternalField};
pub use potentials::{HarmonicBond, LennardJones, PairPotential};
pub use record::EnergyRecord;
pub use short_range::{Bond, Bonds, Interactions, NonBonded};
