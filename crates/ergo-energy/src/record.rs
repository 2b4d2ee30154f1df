//! Categorized result of one energy pass.

use ergo_actor::{Bucket, Contribution};
use serde::Serialize;
use std::fmt;
use std::ops::Index;

/// Per-bucket energies at one simulation time.
///
/// `total` is fixed at construction as the sum of the buckets and cannot be
/// changed afterwards; a new pass produces a new record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EnergyRecord {
    time: f64,
    buckets: Contribution,
    total: f64,
}

impl EnergyRecord {
    /// Seal `buckets` into a record stamped with `time`.
    pub fn new(time: f64, buckets: Contribution) -> Self {
        Self {
            time,
            total: buckets.sum(),
            buckets,
        }
    }

    /// All-zero record.
    pub fn empty(time: f64) -> Self {
        Self::new(time, Contribution::new())
    }

    /// Simulation time the record was computed for.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The bucket values.
    pub fn buckets(&self) -> &Contribution {
        &self.buckets
    }

    /// Value of one bucket.
    pub fn get(&self, bucket: Bucket) -> f64 {
        self.buckets.get(bucket)
    }

    /// Kinetic energy.
    pub fn kinetic(&self) -> f64 {
        self.get(Bucket::Kinetic)
    }

    /// Sum over all buckets.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Potential energy: `total - kinetic`.
    pub fn potential(&self) -> f64 {
        self.total - self.kinetic()
    }
}

impl Index<Bucket> for EnergyRecord {
    type Output = f64;

    fn index(&self, bucket: Bucket) -> &f64 {
        &self.buckets[bucket]
    }
}

impl fmt::Display for EnergyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "energies at t = {}", self.time)?;
        for (bucket, value) in self.buckets.iter() {
            writeln!(f, "  {:<12} {:>16.8e}", bucket.label(), value)?;
        }
        write!(f, "  {:<12} {:>16.8e}", "total", self.total)
    }
}
