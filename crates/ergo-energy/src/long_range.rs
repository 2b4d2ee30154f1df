//! Reference long-range and field actors.
//!
//! These are direct-summation stand-ins for mesh solvers, meant to be
//! registered with the aggregator at runtime.

use ergo_actor::{Actor, ActorError, Bucket, Capabilities, Contribution};
use ergo_math::periodic::distance;
use ergo_math::{PeriodicBox, Vec3};
use ergo_particle::{Particle, ParticleRange, ParticleRangeMut};
use rayon::prelude::*;

/// Direct all-pairs Coulomb sum: V = l_B q_i q_j / r.
///
/// With a periodic box only the minimum image is summed. Coincident charges
/// produce an infinite energy, which the aggregator reports as a numerical
/// fault.
#[derive(Clone, Debug)]
pub struct DirectCoulomb {
    /// Electrostatic prefactor (Bjerrum length times kT).
    pub prefactor: f64,
    pbox: Option<PeriodicBox>,
}

impl DirectCoulomb {
    /// Direct Coulomb sum with open boundaries.
    pub fn new(prefactor: f64) -> Self {
        Self {
            prefactor,
            pbox: None,
        }
    }

    /// Sum over minimum images in `pbox`.
    pub fn with_box(mut self, pbox: PeriodicBox) -> Self {
        self.pbox = Some(pbox);
        self
    }

    fn pair_energy(&self, pi: &Particle, pj: &Particle) -> f64 {
        let r = distance(&pi.x, &pj.x, self.pbox.as_ref()).norm();
        self.prefactor * pi.q * pj.q / r
    }

    fn pair_force(&self, pi: &Particle, pj: &Particle) -> Vec3 {
        let r_ij = distance(&pi.x, &pj.x, self.pbox.as_ref());
        let r = r_ij.norm();
        -self.prefactor * pi.q * pj.q * r_ij / (r * r * r)
    }
}

impl Actor for DirectCoulomb {
    fn name(&self) -> &str {
        "direct_coulomb"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    fn energy(&self, particles: ParticleRange<'_>) -> Result<Contribution, ActorError> {
        let e: f64 = particles.map_shards(|shard| {
            shard
                .particles()
                .iter()
                .filter(|pi| pi.q != 0.0)
                .map(|pi| {
                    particles
                        .iter()
                        .filter(|pj| pj.id > pi.id && pj.q != 0.0)
                        .map(|pj| self.pair_energy(pi, pj))
                        .sum::<f64>()
                })
                .sum::<f64>()
        });
        Ok(Contribution::of(Bucket::Coulomb, e))
    }

    fn add_forces(&self, particles: &mut ParticleRangeMut<'_>) -> Result<(), ActorError> {
        let forces: Vec<Vec3> = {
            let all: Vec<&Particle> = particles.as_range().iter().collect();
            all.par_iter()
                .map(|pi| {
                    if pi.q == 0.0 {
                        return Vec3::zeros();
                    }
                    all.iter()
                        .filter(|pj| pj.id != pi.id && pj.q != 0.0)
                        .fold(Vec3::zeros(), |acc, pj| acc + self.pair_force(pi, pj))
                })
                .collect()
        };
        for (p, f) in particles.iter_mut().zip(forces) {
            p.add_force(f);
        }
        Ok(())
    }
}

/// What a uniform field couples to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coupling {
    /// Force `m * field`, e.g. gravity.
    Mass,
    /// Force `q * field`, e.g. an electric field.
    Charge,
}

/// Uniform external field. V = -w * field · x with w the coupled quantity.
#[derive(Clone, Debug)]
pub struct ExternalField {
    name: String,
    /// Field vector.
    pub field: Vec3,
    /// Particle property the field couples to.
    pub coupling: Coupling,
}

impl ExternalField {
    /// Field with an explicit name and coupling.
    pub fn new(name: impl Into<String>, field: Vec3, coupling: Coupling) -> Self {
        Self {
            name: name.into(),
            field,
            coupling,
        }
    }

    /// Uniform gravitational acceleration `g`.
    pub fn gravity(g: Vec3) -> Self {
        Self::new("gravity", g, Coupling::Mass)
    }

    /// Uniform electric field `e`.
    pub fn electric(e: Vec3) -> Self {
        Self::new("electric_field", e, Coupling::Charge)
    }

    #[inline]
    fn weight(&self, p: &Particle) -> f64 {
        match self.coupling {
            Coupling::Mass => p.mass,
            Coupling::Charge => p.q,
        }
    }
}

impl Actor for ExternalField {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    fn energy(&self, particles: ParticleRange<'_>) -> Result<Contribution, ActorError> {
        let e: f64 = particles.reduce(|acc: f64, p| acc - self.weight(p) * self.field.dot(&p.x));
        Ok(Contribution::of(Bucket::External, e))
    }

    fn add_forces(&self, particles: &mut ParticleRangeMut<'_>) -> Result<(), ActorError> {
        particles.for_each(|p| {
            let f = self.weight(p) * self.field;
            p.add_force(f);
        });
        Ok(())
    }
}
