//! In-place motion and force manipulation.

use crate::Result;
use crate::cms::calc_system_cms_velocity;
use ergo_math::Vec3;
use ergo_particle::ParticleRangeMut;
use log::debug;

/// Zero every velocity, and the angular velocity when `omega` is set.
pub fn kill_particle_motion(particles: &mut ParticleRangeMut<'_>, omega: bool) {
    particles.for_each(|p| {
        p.v = Vec3::zeros();
        if omega {
            p.omega = Vec3::zeros();
        }
    });
}

/// Zero every force, and the torque when `torque` is set.
pub fn kill_particle_forces(particles: &mut ParticleRangeMut<'_>, torque: bool) {
    particles.for_each(|p| {
        p.reset_force();
        if torque {
            p.torque = Vec3::zeros();
        }
    });
}

/// Subtract the center-of-mass velocity from every particle.
///
/// Runs one reduction and one update pass, so every particle sees the same
/// correction. Returns the velocity that was removed. On an empty or
/// massless system nothing is modified.
pub fn galilei_transform(particles: &mut ParticleRangeMut<'_>) -> Result<Vec3> {
    let cms_v = calc_system_cms_velocity(particles.as_range())?;
    particles.for_each(|p| p.v -= cms_v);
    debug!(
        "galilei transform removed cms velocity ({:.6e}, {:.6e}, {:.6e}) from {} particles",
        cms_v.x,
        cms_v.y,
        cms_v.z,
        particles.len()
    );
    Ok(cms_v)
}
