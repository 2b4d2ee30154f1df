//! Pair and bond potentials used by the built-in short-range evaluators.

use ergo_math::Vec3;

/// Isotropic pair potential.
pub trait PairPotential: Send + Sync {
    /// Interaction of particle i with particle j at `r_ij = r_j - r_i`.
    /// Returns (force on i, potential energy).
    fn compute(&self, r_ij: Vec3) -> (Vec3, f64);
}

/// Lennard-Jones 12-6 potential: V(r) = 4ε [(σ/r)^12 - (σ/r)^6] + shift.
#[derive(Clone, Debug, PartialEq)]
pub struct LennardJones {
    /// Well depth.
    pub epsilon: f64,
    /// Zero-crossing distance.
    pub sigma: f64,
    /// Cutoff radius.
    pub r_cut: f64,
    /// Constant added inside the cutoff.
    pub shift: f64,
}

impl LennardJones {
    /// Unshifted Lennard-Jones potential.
    pub fn new(epsilon: f64, sigma: f64, r_cut: f64) -> Self {
        Self {
            epsilon,
            sigma,
            r_cut,
            shift: 0.0,
        }
    }

    /// Shift so that V(r_cut) = 0.
    pub fn shifted(mut self) -> Self {
        let s_r6 = (self.sigma / self.r_cut).powi(6);
        self.shift = -4.0 * self.epsilon * (s_r6 * s_r6 - s_r6);
        self
    }

    /// Purely repulsive Weeks-Chandler-Andersen form, cut at the minimum.
    pub fn wca(epsilon: f64, sigma: f64) -> Self {
        Self::new(epsilon, sigma, 2f64.powf(1.0 / 6.0) * sigma).shifted()
    }
}

impl PairPotential for LennardJones {
    fn compute(&self, r_ij: Vec3) -> (Vec3, f64) {
        let r = r_ij.norm();
        if r > self.r_cut {
            return (Vec3::zeros(), 0.0);
        }

        let s_r = self.sigma / r;
        let s_r6 = s_r.powi(6);
        let s_r12 = s_r6 * s_r6;

        let potential = 4.0 * self.epsilon * (s_r12 - s_r6) + self.shift;

        // dV/dr = 24ε/r [(σ/r)^6 - 2(σ/r)^12]
        let dv_dr = 24.0 * self.epsilon / r * (s_r6 - 2.0 * s_r12);

        (dv_dr * r_ij / r, potential)
    }
}

/// Harmonic bond potential: V(r) = 0.5 k (r - r0)^2.
#[derive(Clone, Debug, PartialEq)]
pub struct HarmonicBond {
    /// Spring constant.
    pub k: f64,
    /// Equilibrium bond length.
    pub r0: f64,
}

impl HarmonicBond {
    /// Create harmonic bond potential.
    pub fn new(k: f64, r0: f64) -> Self {
        Self { k, r0 }
    }

    /// Force on i and potential for a bond vector `r_ij = r_j - r_i`.
    pub fn compute(&self, r_ij: Vec3) -> (Vec3, f64) {
        let r = r_ij.norm();
        let dr = r - self.r0;
        let potential = 0.5 * self.k * dr * dr;
        if r < 1e-12 {
            // direction undefined; no force
            return (Vec3::zeros(), potential);
        }

        let dv_dr = self.k * dr;
        (dv_dr * r_ij / r, potential)
    }
}
