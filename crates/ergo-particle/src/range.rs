//! Views over the sharded particle population.

use crate::{Particle, Reduce, Shard};
use ergo_math::Vec3;
use rayon::prelude::*;

/// Read-only, restartable view over every particle of every shard.
///
/// Iteration order is shard by shard, and within a shard insertion order.
#[derive(Clone, Copy, Debug)]
pub struct ParticleRange<'a> {
    shards: &'a [Shard],
}

impl<'a> ParticleRange<'a> {
    /// View over the given shards.
    pub fn new(shards: &'a [Shard]) -> Self {
        Self { shards }
    }

    /// Underlying shards.
    pub fn shards(&self) -> &'a [Shard] {
        self.shards
    }

    /// Total number of particles.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    /// True if no shard holds a particle.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    /// Sequential traversal. Can be called any number of times.
    pub fn iter(self) -> impl Iterator<Item = &'a Particle> + 'a {
        self.shards.iter().flat_map(|s| s.particles.iter())
    }

    /// Compute one partial per shard in parallel and combine them.
    ///
    /// Blocks until every shard has contributed. Shards without particles
    /// still run `local`, which must return the identity for them.
    pub fn map_shards<A, F>(&self, local: F) -> A
    where
        A: Reduce,
        F: Fn(&'a Shard) -> A + Sync + Send,
    {
        self.shards
            .par_iter()
            .map(|shard| local(shard))
            .reduce(A::identity, A::combine)
    }

    /// Fold every particle into an accumulator, shard-parallel.
    pub fn reduce<A, F>(&self, fold: F) -> A
    where
        A: Reduce,
        F: Fn(A, &'a Particle) -> A + Sync + Send,
    {
        self.map_shards(|shard| shard.particles.iter().fold(A::identity(), &fold))
    }
}

/// Exclusive view over every particle of every shard.
#[derive(Debug)]
pub struct ParticleRangeMut<'a> {
    shards: &'a mut [Shard],
}

impl<'a> ParticleRangeMut<'a> {
    /// Exclusive view over the given shards.
    pub fn new(shards: &'a mut [Shard]) -> Self {
        Self { shards }
    }

    /// Shared view over the same particles.
    pub fn as_range(&self) -> ParticleRange<'_> {
        ParticleRange::new(&*self.shards)
    }

    /// Copy of every `(force, torque)` accumulator, in iteration order.
    pub fn save_forces(&self) -> Vec<(Vec3, Vec3)> {
        self.as_range().iter().map(|p| (p.f, p.torque)).collect()
    }

    /// Write back accumulators taken by [`ParticleRangeMut::save_forces`]
    /// on the same, unchanged population.
    pub fn restore_forces(&mut self, saved: &[(Vec3, Vec3)]) {
        for (p, &(f, torque)) in self.iter_mut().zip(saved) {
            p.f = f;
            p.torque = torque;
        }
    }

    /// Total number of particles.
    pub fn len(&self) -> usize {
        self.as_range().len()
    }

    /// True if no shard holds a particle.
    pub fn is_empty(&self) -> bool {
        self.as_range().is_empty()
    }

    /// Sequential mutable traversal, in the same order as
    /// [`ParticleRange::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> + '_ {
        self.shards.iter_mut().flat_map(|s| s.particles.iter_mut())
    }

    /// Visit every particle exactly once, shard-parallel.
    pub fn for_each<F>(&mut self, f: F)
    where
        F: Fn(&mut Particle) + Sync + Send,
    {
        self.shards
            .par_iter_mut()
            .for_each(|shard| shard.particles.iter_mut().for_each(&f));
    }
}
