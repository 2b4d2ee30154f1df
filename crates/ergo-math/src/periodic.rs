//! Periodic boundary conditions.

use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Orthorhombic periodic box with edge lengths `l`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodicBox {
    /// Box edge lengths.
    pub l: Vec3,
}

impl PeriodicBox {
    /// Create a periodic box.
    pub fn new(l: Vec3) -> Self {
        Self { l }
    }

    /// Cubic box of edge `l`.
    pub fn cubic(l: f64) -> Self {
        Self::new(Vec3::new(l, l, l))
    }

    /// Apply the minimum image convention to a distance vector.
    pub fn minimum_image(&self, mut dr: Vec3) -> Vec3 {
        fn wrap(val: f64, size: f64) -> f64 {
            val - size * (val / size).round()
        }
        dr.x = wrap(dr.x, self.l.x);
        dr.y = wrap(dr.y, self.l.y);
        dr.z = wrap(dr.z, self.l.z);
        dr
    }
}

/// Distance vector `b - a`, minimum-imaged when a box is given.
#[inline]
pub fn distance(a: &Vec3, b: &Vec3, pbox: Option<&PeriodicBox>) -> Vec3 {
    let dr = b - a;
    match pbox {
        Some(pbox) => pbox.minimum_image(dr),
        None => dr,
    }
}
