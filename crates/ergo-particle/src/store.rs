//! Sharded particle storage.

use crate::{Particle, ParticleId, ParticleRange, ParticleRangeMut};
use log::info;

/// Disjoint partition of the particle population owned by one worker.
#[derive(Clone, Debug, Default)]
pub struct Shard {
    pub(crate) particles: Vec<Particle>,
}

impl Shard {
    /// Particles held by this shard.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles in this shard.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if the shard holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Owner of all particles, split into a fixed number of shards.
///
/// New particles go to the least populated shard, so shards stay balanced
/// under insertion. Identifiers are never reused.
#[derive(Clone, Debug)]
pub struct ParticleStore {
    shards: Vec<Shard>,
    next_id: u64,
}

impl ParticleStore {
    /// Create an empty store with `n_shards` shards (at least one).
    pub fn new(n_shards: usize) -> Self {
        Self {
            shards: vec![Shard::default(); n_shards.max(1)],
            next_id: 0,
        }
    }

    /// Create a store and insert `particles` in order.
    pub fn from_particles(n_shards: usize, particles: impl IntoIterator<Item = Particle>) -> Self {
        let mut store = Self::new(n_shards);
        for p in particles {
            store.add(p);
        }
        store
    }

    /// Number of shards.
    pub fn n_shards(&self) -> usize {
        self.shards.len()
    }

    /// The shards.
    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    /// Total number of particles.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    /// True if no shard holds a particle.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    /// Insert a particle and return its freshly assigned identifier.
    pub fn add(&mut self, mut particle: Particle) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        particle.id = id;

        let target = (0..self.shards.len())
            .min_by_key(|&i| self.shards[i].len())
            .unwrap_or(0);
        self.shards[target].particles.push(particle);
        id
    }

    /// Remove a particle by identifier.
    pub fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        self.shards.iter_mut().find_map(|shard| {
            shard
                .particles
                .iter()
                .position(|p| p.id == id)
                .map(|idx| shard.particles.remove(idx))
        })
    }

    /// Look up a particle.
    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.range().iter().find(|p| p.id == id)
    }

    /// Look up a particle for mutation.
    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.shards
            .iter_mut()
            .flat_map(|s| s.particles.iter_mut())
            .find(|p| p.id == id)
    }

    /// Drop all particles. Identifiers keep increasing.
    pub fn clear(&mut self) {
        for shard in &mut self.shards {
            shard.particles.clear();
        }
    }

    /// Redistribute all particles round-robin (in identifier order) over
    /// `n_shards` shards.
    pub fn reshard(&mut self, n_shards: usize) {
        let n_shards = n_shards.max(1);
        let mut all: Vec<Particle> = self
            .shards
            .drain(..)
            .flat_map(|s| s.particles)
            .collect();
        all.sort_by_key(|p| p.id);

        self.shards = vec![Shard::default(); n_shards];
        for (i, p) in all.into_iter().enumerate() {
            self.shards[i % n_shards].particles.push(p);
        }
        info!("resharded {} particles over {} shards", self.len(), n_shards);
    }

    /// Read-only view over every shard.
    pub fn range(&self) -> ParticleRange<'_> {
        ParticleRange::new(&self.shards)
    }

    /// Exclusive view over every shard.
    pub fn range_mut(&mut self) -> ParticleRangeMut<'_> {
        ParticleRangeMut::new(&mut self.shards)
    }
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergo_math::Vec3;
    use proptest::prelude::*;

    fn particle(x: f64, mass: f64) -> Particle {
        Particle::new(Vec3::new(x, 0.0, 0.0), Vec3::zeros(), mass)
    }

    #[test]
    fn test_add_balances_shards() {
        let store = ParticleStore::from_particles(3, (0..7).map(|i| particle(i as f64, 1.0)));

        assert_eq!(store.len(), 7);
        let sizes: Vec<usize> = store.shards().iter().map(Shard::len).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
    }

    #[test]
    fn test_ids_are_unique_and_stable() {
        let mut store = ParticleStore::new(2);
        let a = store.add(particle(0.0, 1.0));
        let b = store.add(particle(1.0, 1.0));
        assert_ne!(a, b);

        store.remove(a);
        let c = store.add(particle(2.0, 1.0));
        assert_ne!(a, c);
        assert_eq!(store.get(b).unwrap().x.x, 1.0);
        assert!(store.get(a).is_none());
    }

    #[test]
    fn test_remove_nonexistent() {
        let mut store = ParticleStore::new(2);
        store.add(particle(0.0, 1.0));
        assert!(store.remove(ParticleId(999)).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut store = ParticleStore::new(4);
        let id = store.add(particle(0.0, 1.0));
        store.get_mut(id).unwrap().v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(store.get(id).unwrap().v, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_reshard_preserves_particles() {
        let mut store = ParticleStore::from_particles(1, (0..10).map(|i| particle(i as f64, 1.0)));
        store.reshard(4);

        assert_eq!(store.n_shards(), 4);
        assert_eq!(store.len(), 10);
        for i in 0..10 {
            assert_eq!(store.get(ParticleId(i)).unwrap().x.x, i as f64);
        }
    }

    #[test]
    fn test_zero_shards_clamped() {
        let store = ParticleStore::new(0);
        assert_eq!(store.n_shards(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = ParticleStore::from_particles(2, (0..4).map(|i| particle(i as f64, 1.0)));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.n_shards(), 2);
    }

    proptest! {
        #[test]
        fn reshard_keeps_every_particle_once(n in 0usize..50, from in 1usize..8, to in 0usize..12) {
            let mut store = ParticleStore::from_particles(from, (0..n).map(|i| particle(i as f64, 1.0)));
            store.reshard(to);

            prop_assert_eq!(store.n_shards(), to.max(1));
            prop_assert_eq!(store.len(), n);
            let mut ids: Vec<u64> = store.range().iter().map(|p| p.id.0).collect();
            ids.sort_unstable();
            prop_assert_eq!(ids, (0..n as u64).collect::<Vec<_>>());

            let sizes: Vec<usize> = store.shards().iter().map(Shard::len).collect();
            let (min, max) = (sizes.iter().min().copied(), sizes.iter().max().copied());
            prop_assert!(max.unwrap_or(0) - min.unwrap_or(0) <= 1);
        }
    }
}
