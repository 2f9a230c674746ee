//! Run-time configuration consumed by the extraction and relation passes.
//!
//! Both structs are plain data with `Default`, and derive `serde` so a driver
//! can load them from whatever format it already uses for run parameters.

use serde::{Deserialize, Serialize};

/// Parameters of the per-step puncture extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// `0` is quiet; `> 0` logs step summaries at `info`.
    pub verbose: i32,
    /// Ambient magnetic field `B`.
    pub magnetic_field: [f64; 3],
    /// Coupling constant `Kex` of the gauge term along x.
    pub kex: f64,
    /// Subtract the gauge term from each edge phase difference.
    pub gauge: bool,
    /// Flux contribution added to every face's phase shift.
    ///
    /// Reserved: no flux model is implemented, and the documented default is zero.
    pub flux: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            magnetic_field: [0.0; 3],
            kex: 0.0,
            gauge: false,
            flux: 0.0,
        }
    }
}

/// Parameters of the temporal correspondence between consecutive steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelateConfig {
    /// Two lines correspond when their closest points are at most this far apart.
    pub distance_threshold: f64,
}

impl Default for RelateConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 1.0,
        }
    }
}
