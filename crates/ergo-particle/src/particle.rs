//! Particle representation.

use ergo_math::{Vec3, hadamard};
use serde::{Deserialize, Serialize};

/// Stable particle identifier, unique within a [`crate::ParticleStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Identifier, assigned by the store on insertion.
    pub id: ParticleId,
    /// Position.
    pub x: Vec3,
    /// Velocity.
    pub v: Vec3,
    /// Force accumulator.
    pub f: Vec3,
    /// Mass. Massless particles are allowed and drop out of every
    /// mass-weighted quantity.
    pub mass: f64,
    /// Charge.
    pub q: f64,
    /// Whether rotational degrees of freedom are integrated.
    pub rotation: bool,
    /// Angular velocity in the body frame.
    pub omega: Vec3,
    /// Torque accumulator.
    pub torque: Vec3,
    /// Principal moments of inertia (body frame, diagonal).
    pub rinertia: Vec3,
}

impl Particle {
    /// Create a new non-rotating, uncharged particle.
    pub fn new(x: Vec3, v: Vec3, mass: f64) -> Self {
        Self {
            id: ParticleId(0),
            x,
            v,
            f: Vec3::zeros(),
            mass,
            q: 0.0,
            rotation: false,
            omega: Vec3::zeros(),
            torque: Vec3::zeros(),
            rinertia: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Set the charge.
    pub fn with_charge(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    /// Enable rotation with body-frame angular velocity `omega` and principal
    /// moments `rinertia`.
    pub fn with_rotation(mut self, omega: Vec3, rinertia: Vec3) -> Self {
        self.rotation = true;
        self.omega = omega;
        self.rinertia = rinertia;
        self
    }

    /// Reset force accumulator.
    pub fn reset_force(&mut self) {
        self.f = Vec3::zeros();
    }

    /// Add force to accumulator.
    pub fn add_force(&mut self, f: Vec3) {
        self.f += f;
    }

    /// Momentum `m v`.
    pub fn momentum(&self) -> Vec3 {
        self.mass * self.v
    }

    /// Translational kinetic energy: 0.5 * m * v^2.
    pub fn translational_energy(&self) -> f64 {
        0.5 * self.mass * self.v.norm_squared()
    }

    /// Rotational kinetic energy: 0.5 * sum_k I_k * omega_k^2.
    ///
    /// Zero for particles without rotation.
    pub fn rotational_energy(&self) -> f64 {
        if !self.rotation {
            return 0.0;
        }
        0.5 * hadamard(&self.rinertia, &self.omega).dot(&self.omega)
    }

    /// Total kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        self.translational_energy() + self.rotational_energy()
    }
}
