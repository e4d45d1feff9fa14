//! Block registry: assigns dense runtime IDs to named block states and records
//! their light properties.
//!
//! The registry is built once at startup. Air is always runtime ID 0.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::light::MAX_LIGHT;

/// Runtime ID of air in every registry.
pub const AIR_RUNTIME_ID: u32 = 0;

/// Light-relevant description of a block state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Unique name (e.g. "stone", "glowstone").
    pub name: String,
    /// Light level emitted by the block (0 = none, 15 = max).
    pub light_emission: u8,
    /// Light levels absorbed when light passes through (0 = clear, 15 = blocks all).
    pub light_filter: u8,
    /// Whether the block obstructs sky light for the heightmap regardless of
    /// its filter level.
    #[serde(default)]
    pub opaque: bool,
}

impl BlockDef {
    /// A fully opaque, non-emitting block.
    pub fn solid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            light_emission: 0,
            light_filter: MAX_LIGHT,
            opaque: true,
        }
    }
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// Every 16-bit runtime ID is taken.
    #[error("block registry is full (max 65536 entries)")]
    RegistryFull,
    /// Emission or filter level above 15.
    #[error("block {name} has light level {level} (max 15)")]
    InvalidLightLevel {
        /// Block name.
        name: String,
        /// Offending level.
        level: u8,
    },
}

/// Maps runtime IDs to [`BlockDef`]s, with reverse lookup by name.
pub struct BlockRegistry {
    /// Dense array where `index == runtime ID`.
    blocks: Vec<BlockDef>,
    name_to_id: HashMap<String, u32>,
}

impl BlockRegistry {
    /// Creates a registry with air pre-registered as runtime ID 0.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            light_emission: 0,
            light_filter: 0,
            opaque: false,
        };
        let mut name_to_id = HashMap::new();
        name_to_id.insert(air.name.clone(), AIR_RUNTIME_ID);
        Self {
            blocks: vec![air],
            name_to_id,
        }
    }

    /// Registers a block and returns its runtime ID. IDs are sequential.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] for a repeated name,
    /// [`RegistryError::InvalidLightLevel`] for levels above 15, and
    /// [`RegistryError::RegistryFull`] once 65 536 blocks exist.
    pub fn register(&mut self, def: BlockDef) -> Result<u32, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        let level = def.light_emission.max(def.light_filter);
        if level > MAX_LIGHT {
            return Err(RegistryError::InvalidLightLevel {
                name: def.name,
                level,
            });
        }
        if self.blocks.len() > usize::from(u16::MAX) {
            return Err(RegistryError::RegistryFull);
        }

        let id = self.blocks.len() as u32;
        self.name_to_id.insert(def.name.clone(), id);
        self.blocks.push(def);
        Ok(id)
    }

    /// Definition for `runtime_id`, if registered.
    pub fn get(&self, runtime_id: u32) -> Option<&BlockDef> {
        self.blocks.get(runtime_id as usize)
    }

    /// Runtime ID for a block name.
    pub fn lookup_by_name(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(name).copied()
    }

    /// All definitions, indexed by runtime ID.
    pub fn blocks(&self) -> &[BlockDef] {
        &self.blocks
    }

    /// Total number of registered blocks (including air).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() <= 1
    }

    pub fn air(&self) -> u32 {
        AIR_RUNTIME_ID
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
