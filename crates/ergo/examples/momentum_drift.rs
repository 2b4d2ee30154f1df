//! Lennard-Jones gas in a gravitational field, with periodic Galilei
//! correction of the center-of-mass drift.
//!
//! Run with `RUST_LOG=debug` to see every energy pass and transform.

use env_logger::Env;
use ergo::{
    ExternalField, LennardJonesConfig, MomentumMonitor, Particle, System, SystemConfig, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn main() -> ergo::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let box_length = 10.0;
    let mut system = System::new(SystemConfig {
        box_length: Some([box_length; 3]),
        lennard_jones: Some(LennardJonesConfig {
            epsilon: 1.0,
            sigma: 1.0,
            cutoff: 2.5,
            shifted: true,
        }),
        ..SystemConfig::default()
    })?;

    // simple cubic lattice with random thermal velocities
    let mut rng = StdRng::seed_from_u64(42);
    let n_side = 6;
    let spacing = box_length / n_side as f64;
    for ix in 0..n_side {
        for iy in 0..n_side {
            for iz in 0..n_side {
                system.add_particle(Particle::new(
                    Vec3::new(ix as f64, iy as f64, iz as f64) * spacing,
                    Vec3::new(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    ),
                    1.0,
                ));
            }
        }
    }
    println!("{} particles on {} shards", system.n_particles(), system.config().shards);

    let removed = system.galilei_transform()?;
    println!("initial cms velocity removed: {removed:?}");
    let monitor = MomentumMonitor::new(system.particles());

    system.register_actor(Arc::new(ExternalField::gravity(Vec3::new(0.0, 0.0, -0.05))))?;

    let dt = 0.002;
    system.force_calc()?;
    for step in 1..=500 {
        // velocity Verlet
        system.particles_mut().for_each(|p| {
            p.v += 0.5 * dt * p.f / p.mass;
            p.x += dt * p.v;
        });
        system.force_calc()?;
        system.particles_mut().for_each(|p| p.v += 0.5 * dt * p.f / p.mass);
        system.advance(dt);

        if step % 100 == 0 {
            let drift = monitor.drift(system.particles());
            let record = system.update_energy()?;
            println!(
                "step {step:4}  t={:.3}  E={:+.5}  KE={:.5}  |dp|={:.3e}",
                system.time(),
                record.total(),
                record.kinetic(),
                drift.norm()
            );
            let removed = system.galilei_transform()?;
            println!("             removed cms velocity {:.3e}", removed.norm());
        }
    }

    println!("\n{}", system.update_energy()?);
    Ok(())
}
