//! Per-runtime-ID light properties injected into the engine.

use strata_voxel::{BlockRegistry, MAX_LIGHT};

/// Emission, filter and opacity lookups indexed by runtime ID.
///
/// Every lookup is total: air and runtime IDs past the end of a table behave
/// like air (no emission, no filtering, not opaque).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightTables {
    air: u32,
    emission: Vec<u8>,
    filter: Vec<u8>,
    opaque: Vec<bool>,
}

impl LightTables {
    /// Builds tables from raw per-runtime-ID levels.
    ///
    /// # Panics
    ///
    /// Panics if any level exceeds 15.
    pub fn new(air: u32, emission: Vec<u8>, filter: Vec<u8>) -> Self {
        assert!(
            emission.iter().chain(&filter).all(|&l| l <= MAX_LIGHT),
            "light levels must be in 0..=15"
        );
        Self {
            air,
            emission,
            filter,
            opaque: Vec::new(),
        }
    }

    /// Marks blocks that obstruct sky light for the heightmap even when their
    /// filter level is zero.
    pub fn with_opacity(mut self, opaque: Vec<bool>) -> Self {
        self.opaque = opaque;
        self
    }

    /// Builds tables from every block in `registry`.
    pub fn from_registry(registry: &BlockRegistry) -> Self {
        let blocks = registry.blocks();
        Self {
            air: registry.air(),
            emission: blocks.iter().map(|b| b.light_emission).collect(),
            filter: blocks.iter().map(|b| b.light_filter).collect(),
            opaque: blocks.iter().map(|b| b.opaque).collect(),
        }
    }

    pub fn air(&self) -> u32 {
        self.air
    }

    /// Light level emitted by `runtime_id`.
    pub fn emission(&self, runtime_id: u32) -> u8 {
        if runtime_id == self.air {
            return 0;
        }
        self.emission.get(runtime_id as usize).copied().unwrap_or(0)
    }

    /// Light levels absorbed by `runtime_id`.
    pub fn filter(&self, runtime_id: u32) -> u8 {
        if runtime_id == self.air {
            return 0;
        }
        self.filter.get(runtime_id as usize).copied().unwrap_or(0)
    }

    /// Returns `true` if `runtime_id` counts towards the heightmap: opaque, or
    /// filtering any light.
    pub fn obstructs(&self, runtime_id: u32) -> bool {
        if runtime_id == self.air {
            return false;
        }
        self.opaque.get(runtime_id as usize).copied().unwrap_or(false)
            || self.filter(runtime_id) > 0
    }
}
