//! Center-of-mass reductions.

use crate::{GalileiError, Result};
use ergo_math::Vec3;
use ergo_particle::{MassWeighted, Particle, ParticleRange};

fn mass_weighted(particles: ParticleRange<'_>, select: fn(&Particle) -> Vec3) -> Result<Vec3> {
    particles
        .reduce(|acc: MassWeighted, p| acc.push(p.mass, select(p)))
        .mean()
        .ok_or(GalileiError::EmptySystem)
}

/// Mass-weighted mean position. Positions are taken as stored (unfolded).
pub fn calc_system_cms_position(particles: ParticleRange<'_>) -> Result<Vec3> {
    mass_weighted(particles, |p| p.x)
}

/// Mass-weighted mean velocity.
pub fn calc_system_cms_velocity(particles: ParticleRange<'_>) -> Result<Vec3> {
    mass_weighted(particles, |p| p.v)
}

/// Total mass of all particles.
pub fn total_mass(particles: ParticleRange<'_>) -> f64 {
    particles.reduce(|acc: f64, p| acc + p.mass)
}

/// Total linear momentum: sum_i m_i * v_i
pub fn total_momentum(particles: ParticleRange<'_>) -> Vec3 {
    particles.reduce(|acc: Vec3, p| acc + p.momentum())
}
