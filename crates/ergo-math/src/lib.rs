//! Math primitives for the ergo energy core.
//!
//! Thin aliases over nalgebra plus the periodic simulation box used by the
//! pairwise interactions.

pub mod periodic;

pub use periodic::PeriodicBox;

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;

/// Component-wise product `a ∘ b`.
#[inline]
pub fn hadamard(a: &Vec3, b: &Vec3) -> Vec3 {
    a.component_mul(b)
}

/// True if every component is finite.
#[inline]
pub fn is_finite(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}
