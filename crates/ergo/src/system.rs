//! The process-wide simulation state object.

use crate::config::SystemConfig;
use crate::error::{Error, Result};
use ergo_actor::{Actor, ActorRegistry, Contribution};
use ergo_energy::{EnergyAggregator, EnergyRecord, HarmonicBond, Interactions, NonBonded};
use ergo_galilei as galilei;
use ergo_math::{PeriodicBox, Vec3};
use ergo_particle::{Particle, ParticleId, ParticleRange, ParticleRangeMut, ParticleStore};
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Particles, interactions, registered actors and the energy cache of one
/// simulation.
///
/// Every mutating operation takes `&mut self`, and every energy or momentum
/// pass borrows the particle storage, so passes never overlap with registry
/// or particle mutation. Independent systems share nothing.
pub struct System {
    config: SystemConfig,
    particles: ParticleStore,
    energy: EnergyAggregator,
    time: f64,
    step: u64,
}

impl System {
    /// Build an empty system from a validated configuration.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        let energy = EnergyAggregator::with_interactions(Self::interactions_from(&config));
        info!(
            "system created: {} shards, box {:?}, lennard-jones {}",
            config.shards,
            config.box_length,
            if config.lennard_jones.is_some() { "on" } else { "off" }
        );
        Ok(Self {
            particles: ParticleStore::new(config.shards),
            energy,
            time: config.time,
            step: 0,
            config,
        })
    }

    /// Build a system from a JSON configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(SystemConfig::from_file(path)?)
    }

    fn interactions_from(config: &SystemConfig) -> Interactions {
        let pbox = config.periodic_box();
        let mut interactions = Interactions::new();
        interactions.non_bonded = config.lennard_jones.map(|lj| {
            let nb = NonBonded::new(Arc::new(lj.potential()));
            match pbox {
                Some(pbox) => nb.with_box(pbox),
                None => nb,
            }
        });
        interactions.bonds.set_box(pbox);
        interactions
    }

    /// Drop all particles, bonds and actors; restore the configured time.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.energy.reset();
        *self.energy.interactions_mut() = Self::interactions_from(&self.config);
        self.time = self.config.time;
        self.step = 0;
        info!("system reset");
    }

    /// Configuration the system was built from, with the current shard count.
    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Periodic box, or `None` for open boundaries.
    pub fn periodic_box(&self) -> Option<PeriodicBox> {
        self.config.periodic_box()
    }


    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of [`System::advance`] calls since creation or reset.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Set the simulation time. Records stamped with another time are
    /// recomputed on the next query.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Advance the clock by one step of length `dt`.
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
        self.step += 1;
    }


    /// Add a particle; its id is assigned by the store.
    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        self.energy.invalidate();
        self.particles.add(particle)
    }

    /// Remove a particle together with every bond that references it.
    pub fn remove_particle(&mut self, id: ParticleId) -> Option<Particle> {
        let removed = self.particles.remove(id)?;
        self.energy.interactions_mut().bonds.remove_particle(id);
        Some(removed)
    }

    /// Particle by id.
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    /// Mutable access to one particle. Invalidates the energy cache.
    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.energy.invalidate();
        self.particles.get_mut(id)
    }

    /// Number of particles.
    pub fn n_particles(&self) -> usize {
        self.particles.len()
    }

    /// Read-only view over all particles.
    pub fn particles(&self) -> ParticleRange<'_> {
        self.particles.range()
    }

    /// Exclusive view over all particles. Invalidates the energy cache.
    pub fn particles_mut(&mut self) -> ParticleRangeMut<'_> {
        self.energy.invalidate();
        self.particles.range_mut()
    }

    /// Redistribute particles over `n_shards` shards.
    pub fn reshard(&mut self, n_shards: usize) {
        self.particles.reshard(n_shards);
        self.config.shards = self.particles.n_shards();
        self.energy.invalidate();
    }

    /// Bond two existing particles with a harmonic spring.
    pub fn add_bond(&mut self, a: ParticleId, b: ParticleId, bond: HarmonicBond) -> Result<()> {
        for id in [a, b] {
            if self.particles.get(id).is_none() {
                return Err(Error::UnknownParticle(id));
            }
        }
        self.energy.interactions_mut().bonds.add(a, b, bond);
        Ok(())
    }

    /// Built-in non-bonded and bonded interactions.
    pub fn interactions(&self) -> &Interactions {
        self.energy.interactions()
    }


    /// Register an actor. Fails if this instance is already registered.
    pub fn register_actor(&mut self, actor: Arc<dyn Actor>) -> Result<()> {
        Ok(self.energy.register(actor)?)
    }

    /// Unregister an actor and hand it back. Fails if it is not registered.
    pub fn unregister_actor(&mut self, actor: &Arc<dyn Actor>) -> Result<Arc<dyn Actor>> {
        Ok(self.energy.unregister(actor)?)
    }

    /// Registered actors, in registration order.
    pub fn actors(&self) -> &ActorRegistry {
        self.energy.actors()
    }


    /// Full energy pass at the current time; replaces the cache.
    pub fn energy_calc(&mut self) -> Result<EnergyRecord> {
        Ok(self.energy.energy_calc(self.time, self.particles.range())?)
    }

    /// Cached record for the current time, recomputed only when stale.
    pub fn update_energy(&mut self) -> Result<EnergyRecord> {
        Ok(self.energy.update_energy(self.time, self.particles.range())?)
    }

    /// Potential energy (`total - kinetic`) of the current record.
    ///
    /// Fails with `UninitializedState` when nothing was ever computed and
    /// there are no particles.
    pub fn calculate_current_potential_energy_of_system(&mut self) -> Result<f64> {
        Ok(self
            .energy
            .calculate_current_potential_energy_of_system(self.time, self.particles.range())?)
    }

    /// Registered actors only; leaves the cache untouched.
    pub fn calc_long_range_energies(&self) -> Result<Contribution> {
        Ok(self.energy.calc_long_range_energies(self.particles.range())?)
    }

    /// Last computed record, stale or not.
    pub fn cached_energy(&self) -> Option<&EnergyRecord> {
        self.energy.cached()
    }

    /// Reset forces and torques, then accumulate them from every
    /// force-capable interaction and actor.
    ///
    /// On failure the forces and torques of the previous pass are restored.
    pub fn force_calc(&mut self) -> Result<()> {
        let mut range = self.particles.range_mut();
        let saved = range.save_forces();
        galilei::kill_particle_forces(&mut range, true);
        if let Err(err) = self.energy.apply_forces(&mut range) {
            range.restore_forces(&saved);
            return Err(err.into());
        }
        Ok(())
    }


    /// Mass-weighted mean position. Fails when the total mass is zero.
    pub fn calc_system_cms_position(&self) -> Result<Vec3> {
        Ok(galilei::calc_system_cms_position(self.particles.range())?)
    }

    /// Mass-weighted mean velocity. Fails when the total mass is zero.
    pub fn calc_system_cms_velocity(&self) -> Result<Vec3> {
        Ok(galilei::calc_system_cms_velocity(self.particles.range())?)
    }

    /// Total linear momentum.
    pub fn total_momentum(&self) -> Vec3 {
        galilei::total_momentum(self.particles.range())
    }

    /// Zero all velocities, and angular velocities when `omega` is set.
    pub fn kill_particle_motion(&mut self, omega: bool) {
        galilei::kill_particle_motion(&mut self.particles_mut(), omega);
    }

    /// Zero all forces, and torques when `torque` is set.
    pub fn kill_particle_forces(&mut self, torque: bool) {
        galilei::kill_particle_forces(&mut self.particles.range_mut(), torque);
    }

    /// Remove the center-of-mass velocity. Returns the removed velocity.
    pub fn galilei_transform(&mut self) -> Result<Vec3> {
        let removed = galilei::galilei_transform(&mut self.particles.range_mut())?;
        self.energy.invalidate();
        Ok(removed)
    }
}

impl std::fmt::Debug for System {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("System")
            .field("time", &self.time)
            .field("step", &self.step)
            .field("particles", &self.particles.len())
            .field("shards", &self.particles.n_shards())
            .field("actors", self.energy.actors())
            .finish()
    }
}
