//! Particle storage for the ergo energy core.
//!
//! Particles live in disjoint [`Shard`]s owned by a [`ParticleStore`]; every
//! shard is processed by its own rayon worker. Consumers never see the store
//! directly, only the [`ParticleRange`] and [`ParticleRangeMut`] views, and
//! every global quantity is computed through the [`Reduce`] primitive: fold
//! locally per shard, then combine the partials.
//!
//! # Example
//!
//! ```
//! use ergo_math::Vec3;
//! use ergo_particle::{MassWeighted, Particle, ParticleStore};
//!
//! let mut store = ParticleStore::new(2);
//! store.add(Particle::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), 1.0));
//! store.add(Particle::new(Vec3::new(3.0, 0.0, 0.0), Vec3::zeros(), 2.0));
//!
//! let cms = store
//!     .range()
//!     .reduce(|acc: MassWeighted, p| acc.push(p.mass, p.x))
//!     .mean()
//!     .unwrap();
//! assert!((cms.x - 2.0).abs() < 1e-12);
//! ```

pub mod particle;
pub mod range;
pub mod reduce;
pub mod store;

pub use particle::{Particle, ParticleId};
pub use range::{ParticleRange, ParticleRangeMut};
pub use reduce::{MassWeighted, Reduce};
pub use store::{ParticleStore, Shard};
