//! Energy buckets and per-bucket contributions.

use ergo_particle::Reduce;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Named energy category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Translational plus rotational kinetic energy.
    Kinetic,
    /// Bonded interactions.
    Bonded,
    /// Short-range non-bonded pair interactions.
    NonBonded,
    /// Long-range electrostatics.
    Coulomb,
    /// Long-range magnetostatics.
    Dipolar,
    /// Everything else an actor supplies (external fields, constraints, ...).
    External,
}

impl Bucket {
    /// Number of buckets.
    pub const COUNT: usize = 6;

    /// Every bucket, in storage order.
    pub const ALL: [Bucket; Bucket::COUNT] = [
        Bucket::Kinetic,
        Bucket::Bonded,
        Bucket::NonBonded,
        Bucket::Coulomb,
        Bucket::Dipolar,
        Bucket::External,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Kinetic => "kinetic",
            Bucket::Bonded => "bonded",
            Bucket::NonBonded => "non_bonded",
            Bucket::Coulomb => "coulomb",
            Bucket::Dipolar => "dipolar",
            Bucket::External => "external",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One accumulator per [`Bucket`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    values: [f64; Bucket::COUNT],
}

impl Contribution {
    /// All-zero contribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contribution with a single non-zero bucket.
    pub fn of(bucket: Bucket, value: f64) -> Self {
        Self::new().with(bucket, value)
    }

    /// Builder form of [`Contribution::add`].
    pub fn with(mut self, bucket: Bucket, value: f64) -> Self {
        self.add(bucket, value);
        self
    }

    /// Add `value` to `bucket`.
    pub fn add(&mut self, bucket: Bucket, value: f64) {
        self.values[bucket.index()] += value;
    }

    /// Value of one bucket.
    pub fn get(&self, bucket: Bucket) -> f64 {
        self.values[bucket.index()]
    }

    /// Add every bucket of `other` into `self`.
    pub fn merge(&mut self, other: &Contribution) {
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += b;
        }
    }

    /// `(bucket, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, f64)> + '_ {
        Bucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }

    /// Sum over all buckets.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// First bucket holding NaN or an infinity.
    pub fn first_non_finite(&self) -> Option<(Bucket, f64)> {
        self.iter().find(|(_, v)| !v.is_finite())
    }
}

impl Index<Bucket> for Contribution {
    type Output = f64;

    fn index(&self, bucket: Bucket) -> &f64 {
        &self.values[bucket.index()]
    }
}

impl Reduce for Contribution {
    fn identity() -> Self {
        Self::default()
    }

    fn combine(mut self, other: Self) -> Self {
        self.merge(&other);
        self
    }
}
