//! Reduction primitive shared by every global particle quantity.
//!
//! A reduction runs in two phases. Each shard folds its particles into a
//! local accumulator starting from [`Reduce::identity`]; the per-shard
//! partials are then merged with [`Reduce::combine`]. `combine` must be
//! commutative and associative (up to floating-point rounding), since the
//! merge order depends on the rayon schedule.

use ergo_math::Vec3;

/// Accumulator for a shard-parallel reduction.
pub trait Reduce: Send + Sized {
    /// Neutral element. Empty shards contribute exactly this.
    fn identity() -> Self;

    /// Merge two partials.
    fn combine(self, other: Self) -> Self;
}

impl Reduce for f64 {
    fn identity() -> Self {
        0.0
    }

    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl Reduce for usize {
    fn identity() -> Self {
        0
    }

    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl Reduce for Vec3 {
    fn identity() -> Self {
        Vec3::zeros()
    }

    fn combine(self, other: Self) -> Self {
        self + other
    }
}

impl<A: Reduce, B: Reduce> Reduce for (A, B) {
    fn identity() -> Self {
        (A::identity(), B::identity())
    }

    fn combine(self, other: Self) -> Self {
        (self.0.combine(other.0), self.1.combine(other.1))
    }
}

/// Mass-weighted first moment: total mass and `sum m_i * q_i`.
///
/// Used for center-of-mass position and velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassWeighted {
    /// Total mass.
    pub mass: f64,
    /// Sum of mass-weighted vectors.
    pub moment: Vec3,
}

impl MassWeighted {
    /// Fold one weighted sample.
    #[inline]
    pub fn push(mut self, mass: f64, q: Vec3) -> Self {
        self.mass += mass;
        self.moment += mass * q;
        self
    }

    /// Mass-weighted mean, or `None` when the total mass is zero.
    pub fn mean(&self) -> Option<Vec3> {
        if self.mass == 0.0 {
            None
        } else {
            Some(self.moment / self.mass)
        }
    }
}

impl Reduce for MassWeighted {
    fn identity() -> Self {
        Self::default()
    }

    fn combine(self, other: Self) -> Self {
        Self {
            mass: self.mass + other.mass,
            moment: self.moment + other.moment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mass_weighted_mean() {
        let acc = MassWeighted::identity()
            .push(1.0, Vec3::new(1.0, 0.0, 0.0))
            .push(2.0, Vec3::zeros());
        let mean = acc.mean().unwrap();
        assert_relative_eq!(mean.x, 1.0 / 3.0, epsilon = 1e-15);
        assert_eq!(mean.y, 0.0);
    }

    #[test]
    fn test_mass_weighted_zero_mass() {
        assert!(MassWeighted::identity().mean().is_none());
        let massless = MassWeighted::identity().push(0.0, Vec3::new(5.0, 5.0, 5.0));
        assert!(massless.mean().is_none());
    }

    #[test]
    fn test_identity_is_neutral() {
        let acc = MassWeighted::identity().push(3.0, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(acc.combine(MassWeighted::identity()), acc);
        assert_eq!((1.5_f64, 2usize).combine(Reduce::identity()), (1.5, 2));
    }
}
