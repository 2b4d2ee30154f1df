//! System configuration, loaded from JSON.

use crate::error::{Error, Result};
use ergo_energy::LennardJones;
use ergo_math::{PeriodicBox, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of the built-in Lennard-Jones interaction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LennardJonesConfig {
    /// Well depth.
    pub epsilon: f64,
    /// Zero-crossing distance.
    pub sigma: f64,
    /// Cutoff radius.
    pub cutoff: f64,
    /// Shift the potential to zero at the cutoff.
    #[serde(default)]
    pub shifted: bool,
}

impl LennardJonesConfig {
    /// The configured pair potential.
    pub fn potential(&self) -> LennardJones {
        let lj = LennardJones::new(self.epsilon, self.sigma, self.cutoff);
        if self.shifted { lj.shifted() } else { lj }
    }
}

/// Top-level configuration of a [`crate::System`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Number of particle shards (parallel workers).
    pub shards: usize,
    /// Periodic box edge lengths; `None` means open boundaries.
    pub box_length: Option<[f64; 3]>,
    /// Initial simulation time.
    pub time: f64,
    /// Built-in Lennard-Jones interaction; `None` disables it.
    pub lennard_jones: Option<LennardJonesConfig>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            shards: rayon::current_num_threads().max(1),
            box_length: None,
            time: 0.0,
            lennard_jones: None,
        }
    }
}

impl SystemConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject zero shards, a non-finite time, and non-positive or
    /// non-finite box lengths or Lennard-Jones parameters.
    pub fn validate(&self) -> Result<()> {
        if self.shards == 0 {
            return Err(Error::config("shards must be at least 1"));
        }
        if !self.time.is_finite() {
            return Err(Error::config(format!("time must be finite, got {}", self.time)));
        }
        if let Some(l) = self.box_length
            && l.iter().any(|&x| !(x.is_finite() && x > 0.0))
        {
            return Err(Error::config(format!(
                "box lengths must be positive and finite, got {l:?}"
            )));
        }
        if let Some(lj) = &self.lennard_jones {
            for (name, value) in [
                ("epsilon", lj.epsilon),
                ("sigma", lj.sigma),
                ("cutoff", lj.cutoff),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(Error::config(format!(
                        "lennard_jones.{name} must be positive and finite, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Periodic box built from `box_length`.
    pub fn periodic_box(&self) -> Option<PeriodicBox> {
        self.box_length
            .map(|[x, y, z]| PeriodicBox::new(Vec3::new(x, y, z)))
    }
}
