//! Built-in short-range evaluators: non-bonded pairs and bonds.
//!
//! Both speak the [`Actor`] protocol so the aggregator treats them exactly
//! like registered actors; they are owned by [`Interactions`] rather than
//! the registry.

use crate::potentials::{HarmonicBond, PairPotential};
use ergo_actor::{Actor, ActorError, Bucket, Capabilities, Contribution};
use ergo_math::periodic::distance;
use ergo_math::{PeriodicBox, Vec3};
use ergo_particle::{Particle, ParticleId, ParticleRange, ParticleRangeMut};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// All-pairs non-bonded interaction with a cutoff potential.
pub struct NonBonded {
    potential: Arc<dyn PairPotential>,
    pbox: Option<PeriodicBox>,
}

impl NonBonded {
    /// Non-bonded interaction with open boundaries.
    pub fn new(potential: Arc<dyn PairPotential>) -> Self {
        Self {
            potential,
            pbox: None,
        }
    }

    /// Use the minimum image convention in `pbox`.
    pub fn with_box(mut self, pbox: PeriodicBox) -> Self {
        self.pbox = Some(pbox);
        self
    }

    fn pair(&self, pi: &Particle, pj: &Particle) -> (Vec3, f64) {
        let r_ij = distance(&pi.x, &pj.x, self.pbox.as_ref());
        self.potential.compute(r_ij)
    }
}

impl Actor for NonBonded {
    fn name(&self) -> &str {
        "non_bonded"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    fn energy(&self, particles: ParticleRange<'_>) -> Result<Contribution, ActorError> {
        // Each shard owns the pairs whose lower id it holds.
        let e: f64 = particles.map_shards(|shard| {
            shard
                .particles()
                .iter()
                .map(|pi| {
                    particles
                        .iter()
                        .filter(|pj| pj.id > pi.id)
                        .map(|pj| self.pair(pi, pj).1)
                        .sum::<f64>()
                })
                .sum::<f64>()
        });
        Ok(Contribution::of(Bucket::NonBonded, e))
    }

    fn add_forces(&self, particles: &mut ParticleRangeMut<'_>) -> Result<(), ActorError> {
        let forces: Vec<Vec3> = {
            let all: Vec<&Particle> = particles.as_range().iter().collect();
            all.par_iter()
                .map(|pi| {
                    all.iter()
                        .filter(|pj| pj.id != pi.id)
                        .fold(Vec3::zeros(), |acc, pj| acc + self.pair(pi, pj).0)
                })
                .collect()
        };
        for (p, f) in particles.iter_mut().zip(forces) {
            p.add_force(f);
        }
        Ok(())
    }
}

/// Bond between two particles.
#[derive(Clone, Debug, PartialEq)]
pub struct Bond {
    pub a: ParticleId,
    pub b: ParticleId,
    pub potential: HarmonicBond,
}

/// Bond list.
#[derive(Clone, Debug, Default)]
pub struct Bonds {
    bonds: Vec<Bond>,
    pbox: Option<PeriodicBox>,
}

impl Bonds {
    /// Empty bond list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the minimum image convention in `pbox`.
    pub fn set_box(&mut self, pbox: Option<PeriodicBox>) {
        self.pbox = pbox;
    }

    /// Add a harmonic bond between `a` and `b`.
    pub fn add(&mut self, a: ParticleId, b: ParticleId, potential: HarmonicBond) {
        self.bonds.push(Bond { a, b, potential });
    }

    /// Drop every bond touching `id`.
    pub fn remove_particle(&mut self, id: ParticleId) {
        self.bonds.retain(|bond| bond.a != id && bond.b != id);
    }

    /// Number of bonds.
    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    /// True if there are no bonds.
    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    /// The bonds.
    pub fn iter(&self) -> impl Iterator<Item = &Bond> + '_ {
        self.bonds.iter()
    }

    /// Bond vector `r_b - r_a`.
    fn bond_vector(
        &self,
        bond: &Bond,
        positions: &HashMap<ParticleId, Vec3>,
    ) -> Result<Vec3, ActorError> {
        let xa = positions
            .get(&bond.a)
            .ok_or(ActorError::MissingParticle(bond.a))?;
        let xb = positions
            .get(&bond.b)
            .ok_or(ActorError::MissingParticle(bond.b))?;
        Ok(distance(xa, xb, self.pbox.as_ref()))
    }
}

fn positions(particles: ParticleRange<'_>) -> HashMap<ParticleId, Vec3> {
    particles.iter().map(|p| (p.id, p.x)).collect()
}

impl Actor for Bonds {
    fn name(&self) -> &str {
        "bonded"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::BOTH
    }

    fn energy(&self, particles: ParticleRange<'_>) -> Result<Contribution, ActorError> {
        if self.bonds.is_empty() {
            return Ok(Contribution::new());
        }
        let positions = positions(particles);
        let e = self
            .bonds
            .iter()
            .map(|bond| -> Result<f64, ActorError> {
                let r_ab = self.bond_vector(bond, &positions)?;
                Ok(bond.potential.compute(r_ab).1)
            })
            .sum::<Result<f64, ActorError>>()?;
        Ok(Contribution::of(Bucket::Bonded, e))
    }

    fn add_forces(&self, particles: &mut ParticleRangeMut<'_>) -> Result<(), ActorError> {
        if self.bonds.is_empty() {
            return Ok(());
        }
        let positions = positions(particles.as_range());
        let mut forces: HashMap<ParticleId, Vec3> = HashMap::new();
        for bond in &self.bonds {
            let (f_a, _) = bond.potential.compute(self.bond_vector(bond, &positions)?);
            *forces.entry(bond.a).or_insert_with(Vec3::zeros) += f_a;
            *forces.entry(bond.b).or_insert_with(Vec3::zeros) -= f_a;
        }
        for p in particles.iter_mut() {
            if let Some(f) = forces.get(&p.id) {
                p.add_force(*f);
            }
        }
        Ok(())
    }
}

/// The built-in evaluators owned by the aggregator.
#[derive(Default)]
pub struct Interactions {
    /// Pairwise short-range interaction, if any.
    pub non_bonded: Option<NonBonded>,
    /// Bonded interactions.
    pub bonds: Bonds,
}

impl Interactions {
    /// No non-bonded interaction and no bonds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-ins in evaluation order: non-bonded, then bonded.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Actor + 'static)> + '_ {
        self.non_bonded
            .iter()
            .map(|nb| nb as &(dyn Actor + 'static))
            .chain(std::iter::once(&self.bonds as &(dyn Actor + 'static)))
    }
}
