//! Energy aggregation over built-in evaluators and registered actors.

use crate::error::{EnergyError, Result};
use crate::record::EnergyRecord;
use crate::short_range::Interactions;
use ergo_actor::{Actor, ActorRegistry, Bucket, Contribution};
use ergo_math::is_finite;
use ergo_particle::{ParticleRange, ParticleRangeMut};
use log::{debug, trace, warn};
use std::sync::Arc;

/// Last computed record plus a staleness flag.
#[derive(Clone, Debug, Default)]
pub struct EnergyCache {
    record: Option<EnergyRecord>,
    stale: bool,
}

impl EnergyCache {
    /// Last stored record, stale or not.
    pub fn get(&self) -> Option<&EnergyRecord> {
        self.record.as_ref()
    }

    /// The stored record if it is still valid for `time`.
    pub fn current(&self, time: f64) -> Option<&EnergyRecord> {
        self.record
            .as_ref()
            .filter(|record| !self.stale && record.time() == time)
    }

    /// Replace the stored record and mark it valid.
    pub fn store(&mut self, record: EnergyRecord) {
        self.record = Some(record);
        self.stale = false;
    }

    /// Force recomputation on the next query.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// True once invalidated and not yet recomputed.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Forget the stored record entirely.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Kinetic energy (translational plus rotational) of all particles.
pub fn kinetic_energy(particles: ParticleRange<'_>) -> f64 {
    particles.reduce(|acc: f64, p| acc + p.kinetic_energy())
}

/// Ask one actor for its energy and reject non-finite values.
fn evaluate(actor: &dyn Actor, particles: ParticleRange<'_>) -> Result<Contribution> {
    let contribution = actor
        .energy(particles)
        .map_err(|error| EnergyError::Actor {
            actor: actor.name().to_string(),
            error,
        })?;
    check_finite(actor.name(), &contribution)?;
    Ok(contribution)
}

fn check_finite(origin: &str, contribution: &Contribution) -> Result<()> {
    match contribution.first_non_finite() {
        Some((bucket, value)) => {
            warn!("numerical fault: {origin} produced {value} in bucket {bucket}");
            Err(EnergyError::NumericalFault {
                origin: origin.to_string(),
                bucket,
                value,
            })
        }
        None => Ok(()),
    }
}

/// Owns the actor registry, the built-in interactions and the energy cache.
///
/// Every mutation (registering actors, editing interactions) takes
/// `&mut self` and marks the cache stale, so it cannot overlap with a pass.
#[derive(Default)]
pub struct EnergyAggregator {
    actors: ActorRegistry,
    interactions: Interactions,
    cache: EnergyCache,
}

impl EnergyAggregator {
    /// Aggregator without actors or interactions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator with the given built-in interactions.
    pub fn with_interactions(interactions: Interactions) -> Self {
        Self {
            interactions,
            ..Self::default()
        }
    }

    /// Registered actors.
    pub fn actors(&self) -> &ActorRegistry {
        &self.actors
    }

    /// Register an actor and invalidate the cache.
    pub fn register(&mut self, actor: Arc<dyn Actor>) -> Result<()> {
        self.actors.register(actor)?;
        self.cache.invalidate();
        Ok(())
    }

    /// Unregister an actor and invalidate the cache.
    pub fn unregister(&mut self, actor: &Arc<dyn Actor>) -> Result<Arc<dyn Actor>> {
        let removed = self.actors.unregister(actor)?;
        self.cache.invalidate();
        Ok(removed)
    }

    /// Remove every actor.
    pub fn clear_actors(&mut self) {
        self.actors.clear();
        self.cache.invalidate();
    }

    /// Built-in interactions.
    pub fn interactions(&self) -> &Interactions {
        &self.interactions
    }

    /// Built-in interactions for editing. Invalidates the cache.
    pub fn interactions_mut(&mut self) -> &mut Interactions {
        self.cache.invalidate();
        &mut self.interactions
    }

    /// The cache.
    pub fn cache(&self) -> &EnergyCache {
        &self.cache
    }

    /// Last computed record, stale or not.
    pub fn cached(&self) -> Option<&EnergyRecord> {
        self.cache.get()
    }

    /// Mark the cache stale, e.g. after particles moved.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Drop actors, interactions and the cached record.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Full energy pass at `time`.
    ///
    /// Kinetic energy is reduced shard by shard, then the built-in
    /// interactions and the registered actors are evaluated in order. On
    /// success the record replaces the cache; on failure the cache keeps its
    /// previous value.
    pub fn energy_calc(&mut self, time: f64, particles: ParticleRange<'_>) -> Result<EnergyRecord> {
        let mut buckets = Contribution::of(Bucket::Kinetic, kinetic_energy(particles));
        check_finite("kinetic energy", &buckets)?;

        for actor in self.interactions.iter() {
            buckets.merge(&evaluate(actor, particles)?);
        }
        buckets.merge(&self.calc_long_range_energies(particles)?);
        check_finite("total", &buckets)?;

        let record = EnergyRecord::new(time, buckets);
        debug!(
            "energy pass at t={time}: total={:.8e} kinetic={:.8e} ({} particles, {} actors)",
            record.total(),
            record.kinetic(),
            particles.len(),
            self.actors.len()
        );
        self.cache.store(record);
        Ok(record)
    }

    /// Registered actors only, in registration order.
    ///
    /// Does not touch the cache, so it can be used for diagnostics of a
    /// single long-range solver. Actors without the energy capability are
    /// skipped.
    pub fn calc_long_range_energies(&self, particles: ParticleRange<'_>) -> Result<Contribution> {
        let mut total = Contribution::new();
        for actor in self.actors.iter().filter(|a| a.capabilities().energy) {
            total.merge(&evaluate(actor.as_ref(), particles)?);
        }
        Ok(total)
    }

    /// Cached record for `time`, recomputing only if it is stale or was
    /// computed for a different time.
    pub fn update_energy(&mut self, time: f64, particles: ParticleRange<'_>) -> Result<EnergyRecord> {
        if let Some(record) = self.cache.current(time) {
            trace!("energy cache hit at t={time}");
            return Ok(*record);
        }
        self.energy_calc(time, particles)
    }

    /// `total - kinetic` of the current record.
    pub fn calculate_current_potential_energy_of_system(
        &mut self,
        time: f64,
        particles: ParticleRange<'_>,
    ) -> Result<f64> {
        if self.cache.get().is_none() && particles.is_empty() {
            return Err(EnergyError::UninitializedState);
        }
        Ok(self.update_energy(time, particles)?.potential())
    }

    /// Accumulate forces and torques from built-ins and registered actors
    /// that have the force capability. The accumulators are not reset here.
    ///
    /// On failure every accumulator is restored to its value on entry, so no
    /// partial or non-finite force is left behind.
    pub fn apply_forces(&self, particles: &mut ParticleRangeMut<'_>) -> Result<()> {
        let saved = particles.save_forces();
        let result = self.accumulate_forces(particles);
        if result.is_err() {
            particles.restore_forces(&saved);
        }
        result
    }

    fn accumulate_forces(&self, particles: &mut ParticleRangeMut<'_>) -> Result<()> {
        let builtins = self.interactions.iter();
        let registered = self.actors.iter().map(|a| a.as_ref());
        for actor in builtins.chain(registered).filter(|a| a.capabilities().force) {
            actor
                .add_forces(particles)
                .map_err(|error| EnergyError::Actor {
                    actor: actor.name().to_string(),
                    error,
                })?;

            let range = particles.as_range();
            if let Some(p) = range
                .iter()
                .find(|p| !is_finite(&p.f) || !is_finite(&p.torque))
            {
                warn!("numerical fault: {} produced a non-finite force", actor.name());
                return Err(EnergyError::NonFiniteForce {
                    origin: actor.name().to_string(),
                    particle: p.id,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::long_range::{DirectCoulomb, ExternalField};
    use crate::potentials::LennardJones;
    use crate::short_range::NonBonded;
    use approx::assert_relative_eq;
    use ergo_actor::{ActorError, Capabilities};
    use ergo_math::Vec3;
    use ergo_particle::{Particle, ParticleStore};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fixed contribution, counting how often it was asked.
    struct Constant {
        name: String,
        contribution: Contribution,
        calls: AtomicUsize,
    }

    impl Constant {
        fn new(name: &str, bucket: Bucket, value: f64) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                contribution: Contribution::of(bucket, value),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Actor for Constant {
        fn name(&self) -> &str {
            &self.name
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::ENERGY
        }

        fn energy(&self, _particles: ParticleRange<'_>) -> std::result::Result<Contribution, ActorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.contribution)
        }
    }

    /// Force-only actor; must never be asked for energy.
    struct ForceOnly;

    impl Actor for ForceOnly {
        fn name(&self) -> &str {
            "force_only"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::FORCE
        }

        fn energy(&self, _particles: ParticleRange<'_>) -> std::result::Result<Contribution, ActorError> {
            Err(ActorError::Failed("asked for energy".into()))
        }
    }

    fn two_particles() -> ParticleStore {
        ParticleStore::from_particles(
            2,
            [
                Particle::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), 1.0),
                Particle::new(Vec3::new(5.0, 0.0, 0.0), Vec3::zeros(), 2.0),
            ],
        )
    }

    fn random_store(n: usize, n_shards: usize, seed: u64) -> ParticleStore {
        let mut rng = StdRng::seed_from_u64(seed);
        ParticleStore::from_particles(
            n_shards,
            (0..n).map(|i| {
                Particle::new(
                    Vec3::new(i as f64 * 1.2, rng.gen_range(0.0..0.5), 0.0),
                    Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.0),
                    rng.gen_range(0.5..2.0),
                )
                .with_charge(if i % 2 == 0 { 1.0 } else { -1.0 })
            }),
        )
    }

    fn assert_bucket_sum(record: &EnergyRecord) {
        let sum: f64 = record.buckets().iter().map(|(_, v)| v).sum();
        assert_relative_eq!(record.total(), sum, max_relative = 1e-9);
    }

    #[test]
    fn test_two_particle_scenario() {
        let store = two_particles();
        let mut aggregator = EnergyAggregator::new();

        let record = aggregator.energy_calc(0.0, store.range()).unwrap();
        assert_relative_eq!(record.kinetic(), 0.5, epsilon = 1e-15);
        assert_relative_eq!(record.total(), 0.5, epsilon = 1e-15);
        assert_eq!(record.potential(), 0.0);
        assert_bucket_sum(&record);
    }

    #[test]
    fn test_empty_system() {
        let store = ParticleStore::new(3);
        let mut aggregator = EnergyAggregator::new();

        let record = aggregator.energy_calc(0.0, store.range()).unwrap();
        assert_eq!(record.total(), 0.0);
        assert_eq!(record, EnergyRecord::empty(0.0));
    }

    #[test]
    fn test_rotational_kinetic_energy() {
        let store = ParticleStore::from_particles(
            1,
            [Particle::new(Vec3::zeros(), Vec3::zeros(), 1.0)
                .with_rotation(Vec3::new(2.0, 1.0, 4.0), Vec3::new(1.1, 1.3, 1.5))],
        );
        let mut aggregator = EnergyAggregator::new();
        let record = aggregator.energy_calc(0.0, store.range()).unwrap();
        assert_relative_eq!(record.kinetic(), 14.85, epsilon = 1e-12);
    }

    #[test]
    fn test_actor_contributions_land_in_buckets() {
        let store = two_particles();
        let mut aggregator = EnergyAggregator::new();
        aggregator
            .register(Constant::new("p3m", Bucket::Coulomb, -2.0))
            .unwrap();
        aggregator
            .register(Constant::new("dds", Bucket::Dipolar, 0.25))
            .unwrap();

        let record = aggregator.energy_calc(1.0, store.range()).unwrap();
        assert_eq!(record[Bucket::Coulomb], -2.0);
        assert_eq!(record[Bucket::Dipolar], 0.25);
        assert_relative_eq!(record.total(), 0.5 - 2.0 + 0.25, epsilon = 1e-15);
        assert_relative_eq!(record.potential(), -1.75, epsilon = 1e-15);
        assert_bucket_sum(&record);
    }

    #[test]
    fn test_actor_without_energy_capability_skipped() {
        let store = two_particles();
        let mut aggregator = EnergyAggregator::new();
        aggregator.register(Arc::new(ForceOnly)).unwrap();

        let record = aggregator.energy_calc(0.0, store.range()).unwrap();
        assert_relative_eq!(record.total(), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_calc_long_range_energies_standalone() {
        let store = two_particles();
        let mut aggregator = EnergyAggregator::new();
        aggregator
            .register(Constant::new("p3m", Bucket::Coulomb, -2.0))
            .unwrap();

        let long_range = aggregator.calc_long_range_energies(store.range()).unwrap();
        assert_eq!(long_range[Bucket::Coulomb], -2.0);
        assert_eq!(long_range[Bucket::Kinetic], 0.0);
        assert!(aggregator.cached().is_none());
    }

    #[test]
    fn test_update_energy_is_memoized() {
        let store = two_particles();
        let mut aggregator = EnergyAggregator::new();
        let actor = Constant::new("p3m", Bucket::Coulomb, -2.0);
        aggregator.register(actor.clone()).unwrap();

        let first = aggregator.update_energy(3.0, store.range()).unwrap();
        let second = aggregator.update_energy(3.0, store.range()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total().to_bits(), second.total().to_bits());
        assert_eq!(actor.calls.load(Ordering::SeqCst), 1);

        // new time: recompute
        aggregator.update_energy(4.0, store.range()).unwrap();
        assert_eq!(actor.calls.load(Ordering::SeqCst), 2);

        // explicit invalidation: recompute
        aggregator.invalidate();
        aggregator.update_energy(4.0, store.range()).unwrap();
        assert_eq!(actor.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_registry_mutation_invalidates_cache() {
        let store = two_particles();
        let mut aggregator = EnergyAggregator::new();
        aggregator.update_energy(0.0, store.range()).unwrap();
        assert!(!aggregator.cache().is_stale());

        let actor: Arc<dyn Actor> = Constant::new("field", Bucket::External, 1.0);
        aggregator.register(actor.clone()).unwrap();
        assert!(aggregator.cache().is_stale());
        let with_actor = aggregator.update_energy(0.0, store.range()).unwrap();
        assert_relative_eq!(with_actor.total(), 1.5, epsilon = 1e-15);

        aggregator.unregister(&actor).unwrap();
        assert!(aggregator.cache().is_stale());
        let without_actor = aggregator.update_energy(0.0, store.range()).unwrap();
        assert_relative_eq!(without_actor.total(), 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_duplicate_registration_surfaces() {
        let mut aggregator = EnergyAggregator::new();
        let actor: Arc<dyn Actor> = Constant::new("p3m", Bucket::Coulomb, 1.0);
        aggregator.register(actor.clone()).unwrap();
        let err = aggregator.register(actor).unwrap_err();
        assert!(matches!(err, EnergyError::Registry(_)));
    }

    #[test]
    fn test_numerical_fault_keeps_previous_cache() {
        let store = two_particles();
        let mut aggregator = EnergyAggregator::new();
        let good = aggregator.energy_calc(0.0, store.range()).unwrap();

        aggregator
            .register(Constant::new("broken", Bucket::Coulomb, f64::NAN))
            .unwrap();
        let err = aggregator.energy_calc(1.0, store.range()).unwrap_err();
        match err {
            EnergyError::NumericalFault { origin, bucket, value } => {
                assert_eq!(origin, "broken");
                assert_eq!(bucket, Bucket::Coulomb);
                assert!(value.is_nan());
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(aggregator.cached(), Some(&good));
    }

    #[test]
    fn test_infinite_contribution_is_a_fault() {
        let store = ParticleStore::from_particles(
            1,
            [
                Particle::new(Vec3::zeros(), Vec3::zeros(), 1.0).with_charge(1.0),
                Particle::new(Vec3::zeros(), Vec3::zeros(), 1.0).with_charge(1.0),
            ],
        );
        let mut aggregator = EnergyAggregator::new();
        aggregator.register(Arc::new(DirectCoulomb::new(1.0))).unwrap();
        let err = aggregator.energy_calc(0.0, store.range()).unwrap_err();
        assert!(matches!(err, EnergyError::NumericalFault { bucket: Bucket::Coulomb, .. }));
        assert!(aggregator.cached().is_none());
    }

    #[test]
    fn test_potential_energy_uninitialized() {
        let store = ParticleStore::new(2);
        let mut aggregator = EnergyAggregator::new();
        let err = aggregator
            .calculate_current_potential_energy_of_system(0.0, store.range())
            .unwrap_err();
        assert!(matches!(err, EnergyError::UninitializedState));

        // once a pass ran, an empty system is a valid zero
        aggregator.energy_calc(0.0, store.range()).unwrap();
        let pe = aggregator
            .calculate_current_potential_energy_of_system(0.0, store.range())
            .unwrap();
        assert_eq!(pe, 0.0);
    }

    #[test]
    fn test_potential_energy_with_interactions() {
        let r_min = 2f64.powf(1.0 / 6.0);
        let store = ParticleStore::from_particles(
            2,
            [
                Particle::new(Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0), 1.0),
                Particle::new(Vec3::new(r_min, 0.0, 0.0), Vec3::zeros(), 1.0),
            ],
        );
        let mut interactions = Interactions::new();
        interactions.non_bonded = Some(NonBonded::new(Arc::new(LennardJones::new(1.0, 1.0, 2.5))));
        let mut aggregator = EnergyAggregator::with_interactions(interactions);

        let pe = aggregator
            .calculate_current_potential_energy_of_system(0.0, store.range())
            .unwrap();
        assert_relative_eq!(pe, -1.0, epsilon = 1e-12);
        let record = aggregator.cached().unwrap();
        assert_relative_eq!(record.kinetic(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(record[Bucket::NonBonded], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_energies_independent_of_shard_count() {
        let mut interactions = Interactions::new();
        interactions.non_bonded = Some(NonBonded::new(Arc::new(LennardJones::new(1.0, 1.0, 2.5))));
        let mut aggregator = EnergyAggregator::with_interactions(interactions);
        aggregator.register(Arc::new(DirectCoulomb::new(0.7))).unwrap();
        aggregator
            .register(Arc::new(ExternalField::gravity(Vec3::new(0.0, -1.0, 0.0))))
            .unwrap();

        let mut store = random_store(40, 1, 11);
        let reference = aggregator.energy_calc(0.0, store.range()).unwrap();
        for n_shards in [2, 5, 8, 40, 64] {
            store.reshard(n_shards);
            let record = aggregator.energy_calc(0.0, store.range()).unwrap();
            for bucket in Bucket::ALL {
                assert_relative_eq!(
                    record[bucket],
                    reference[bucket],
                    epsilon = 1e-10,
                    max_relative = 1e-10
                );
            }
            assert_bucket_sum(&record);
        }
    }

    #[test]
    fn test_apply_forces_skips_energy_only_actors() {
        let mut store = two_particles();
        let mut aggregator = EnergyAggregator::new();
        aggregator
            .register(Constant::new("p3m", Bucket::Coulomb, 1.0))
            .unwrap();
        aggregator
            .register(Arc::new(ExternalField::gravity(Vec3::new(0.0, 0.0, -1.0))))
            .unwrap();

        aggregator.apply_forces(&mut store.range_mut()).unwrap();
        let fz: Vec<f64> = store.range().iter().map(|p| p.f.z).collect();
        assert_eq!(fz, vec![-1.0, -2.0]);
    }

    #[test]
    fn test_failed_force_pass_restores_accumulators() {
        let mut charged = Particle::new(Vec3::zeros(), Vec3::zeros(), 1.0).with_charge(1.0);
        charged.f = Vec3::new(0.5, 0.0, 0.0);
        charged.torque = Vec3::new(0.0, 0.0, 0.25);
        let mut store = ParticleStore::from_particles(1, [charged.clone(), charged]);

        // gravity succeeds first, then the coincident charges blow up
        let mut aggregator = EnergyAggregator::new();
        aggregator
            .register(Arc::new(ExternalField::gravity(Vec3::new(0.0, 0.0, -1.0))))
            .unwrap();
        aggregator.register(Arc::new(DirectCoulomb::new(1.0))).unwrap();

        let err = aggregator.apply_forces(&mut store.range_mut()).unwrap_err();
        match err {
            EnergyError::NonFiniteForce { origin, .. } => assert_eq!(origin, "direct_coulomb"),
            other => panic!("unexpected error {other}"),
        }
        for p in store.range().iter() {
            assert_eq!(p.f, Vec3::new(0.5, 0.0, 0.0));
            assert_eq!(p.torque, Vec3::new(0.0, 0.0, 0.25));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn total_independent_of_registration_order(
            values in proptest::collection::vec(-100.0..100.0_f64, 1..8),
            seed in any::<u64>(),
        ) {
            let store = two_particles();
            let actors: Vec<Arc<dyn Actor>> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let bucket = Bucket::ALL[1 + i % (Bucket::COUNT - 1)];
                    Constant::new(&format!("actor{i}"), bucket, v) as Arc<dyn Actor>
                })
                .collect();

            let mut forward = EnergyAggregator::new();
            for a in &actors {
                forward.register(a.clone()).unwrap();
            }

            let mut shuffled_actors = actors.clone();
            shuffled_actors.shuffle(&mut StdRng::seed_from_u64(seed));
            let mut shuffled = EnergyAggregator::new();
            for a in &shuffled_actors {
                shuffled.register(a.clone()).unwrap();
            }

            let r1 = forward.energy_calc(0.0, store.range()).unwrap();
            let r2 = shuffled.energy_calc(0.0, store.range()).unwrap();
            prop_assert!((r1.total() - r2.total()).abs() <= 1e-9 * (1.0 + r1.total().abs()));
            for bucket in Bucket::ALL {
                prop_assert!((r1[bucket] - r2[bucket]).abs() <= 1e-9 * (1.0 + r1[bucket].abs()));
            }
        }
    }
}
