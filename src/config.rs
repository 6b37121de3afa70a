// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Meshzip Contributors

//! Zippering configuration
//!
//! All resolution-derived thresholds flow from a single characteristic
//! sample spacing, scaled by the active level of detail. The configuration
//! is a plain value passed into every operation so that different mesh
//! pairs can be processed with different settings in one program.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of precomputed detail levels a scan may carry.
pub const MAX_MESH_LEVELS: usize = 4;

/// Zippering parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZipperConfig {
    /// Active level of detail: 0 (finest) ..= 3 (coarsest)
    pub mesh_level: usize,
    /// Characteristic sample spacing of the range data
    pub resolution: f64,
    /// Admissible triangle edge length, as a multiple of the sample spacing
    pub max_edge_length_factor: f64,
    /// Reject intersections between triangles whose unit normals satisfy
    /// |n1 . n2| > tangency_cos
    pub tangency_cos: f64,
    /// Slack on the strict-interior barycentric test of the segment
    /// primitive (dimensionless)
    pub interior_epsilon: f64,
}

impl Default for ZipperConfig {
    fn default() -> Self {
        Self {
            mesh_level: 3,
            resolution: 5e-4,
            max_edge_length_factor: 4.0,
            tangency_cos: 0.8,
            interior_epsilon: 1e-6,
        }
    }
}

/// Range-image subsample stride for a level of detail. Level 3 uses every
/// 8th range image point.
pub fn level_to_inc(level: usize) -> usize {
    match level {
        0 => 1,
        1 => 2,
        2 => 4,
        _ => 8,
    }
}

impl ZipperConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ZipperConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Maximum admissible triangle edge length at the active level of
    /// detail. Doubles as the spatial hash cell size and the proximity
    /// query radius.
    pub fn edge_length_max(&self) -> f64 {
        self.max_edge_length_factor * self.resolution * level_to_inc(self.mesh_level) as f64
    }
}
