//! Momentum drift monitoring.

use crate::cms::total_momentum;
use ergo_math::Vec3;
use ergo_particle::ParticleRange;
use log::warn;

/// Baseline total momentum to measure drift against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumMonitor {
    pub baseline: Vec3,
}

impl MomentumMonitor {
    /// Record the current momentum as the baseline.
    pub fn new(particles: ParticleRange<'_>) -> Self {
        Self {
            baseline: total_momentum(particles),
        }
    }

    /// Current momentum minus the baseline.
    pub fn drift(&self, particles: ParticleRange<'_>) -> Vec3 {
        total_momentum(particles) - self.baseline
    }

    /// True if `|drift|` exceeds `tol`.
    pub fn is_violated(&self, particles: ParticleRange<'_>, tol: f64) -> bool {
        let drift = self.drift(particles).norm();
        if drift > tol {
            warn!("momentum drift {drift:.3e} exceeds tolerance {tol:.3e}");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::galilei_transform;
    use approx::assert_relative_eq;
    use ergo_particle::{Particle, ParticleStore};

    #[test]
    fn test_drift_after_kick() {
        let mut store = ParticleStore::from_particles(
            2,
            [
                Particle::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), 1.0),
                Particle::new(Vec3::zeros(), Vec3::new(-1.0, 0.0, 0.0), 1.0),
            ],
        );
        let monitor = MomentumMonitor::new(store.range());
        assert_eq!(monitor.baseline, Vec3::zeros());
        assert!(!monitor.is_violated(store.range(), 1e-12));

        store.range_mut().for_each(|p| p.v.y += 0.5);
        assert_relative_eq!(monitor.drift(store.range()).y, 1.0, epsilon = 1e-15);
        assert!(monitor.is_violated(store.range(), 1e-3));

        galilei_transform(&mut store.range_mut()).unwrap();
        assert!(!monitor.is_violated(store.range(), 1e-12));
    }
}
