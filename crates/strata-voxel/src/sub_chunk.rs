//! A 16×16×16 band of a chunk: layered block storages plus light.

use crate::block_storage::BlockStorage;
use crate::light::{LightArray, VoxelLight};

/// Highest number of storage layers a sub-chunk may hold.
pub const MAX_LAYERS: usize = 8;

/// Ordered block storage layers sharing one 16×16×16 extent.
///
/// Layer 0 holds regular blocks; higher layers hold blocks occupying the same
/// cell (e.g. water in a waterlogged block).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubChunk {
    air: u32,
    storages: Vec<BlockStorage>,
    light: LightArray,
}

impl SubChunk {
    /// Creates a sub-chunk without layers. Every cell starts with sky light
    /// `sky_light` and no block light.
    pub fn new(air: u32, sky_light: u8) -> Self {
        let mut light = VoxelLight::default();
        light.set_sky_light(sky_light);
        Self {
            air,
            storages: Vec::new(),
            light: LightArray::filled(light),
        }
    }

    /// Builds a sub-chunk from decoded layers, with no light.
    pub(crate) fn from_layers(air: u32, storages: Vec<BlockStorage>) -> Self {
        Self {
            air,
            storages,
            light: LightArray::filled(VoxelLight::default()),
        }
    }

    /// Returns layer `n`, creating air-filled layers up to and including `n`
    /// when missing.
    ///
    /// # Panics
    ///
    /// Panics if `n >= MAX_LAYERS`.
    pub fn layer(&mut self, n: usize) -> &mut BlockStorage {
        assert!(n < MAX_LAYERS, "layer {n} out of range (max {MAX_LAYERS})");
        while self.storages.len() <= n {
            self.storages.push(BlockStorage::new(self.air));
        }
        &mut self.storages[n]
    }

    /// All present layers, lowest first.
    pub fn layers(&self) -> &[BlockStorage] {
        &self.storages
    }

    /// Runtime ID at `(x, y, z)` in `layer`; air if the layer does not exist.
    pub fn runtime_id(&self, x: u8, y: u8, z: u8, layer: usize) -> u32 {
        match self.storages.get(layer) {
            Some(storage) => storage.runtime_id(x, y, z),
            None => self.air,
        }
    }

    pub fn set_runtime_id(&mut self, x: u8, y: u8, z: u8, layer: usize, runtime_id: u32) {
        self.layer(layer).set_runtime_id(x, y, z, runtime_id);
    }

    /// Compacts every layer, then keeps only layers that hold something other
    /// than air. Remaining layers keep their relative order.
    pub fn compact(&mut self) {
        let air = self.air;
        for storage in &mut self.storages {
            storage.compact();
        }
        self.storages.retain(|storage| !storage.is_uniform(air));
    }

    /// Returns `true` if the sub-chunk holds no blocks: no layers, or a single
    /// layer whose palette is exactly air.
    pub fn is_empty(&self) -> bool {
        match self.storages.as_slice() {
            [] => true,
            [only] => only.is_uniform(self.air),
            _ => false,
        }
    }

    /// Returns `true` if every cell has full sky light and no block light,
    /// the implicit light of a band above the top of a chunk.
    pub fn has_ambient_light(&self) -> bool {
        self.light.is_uniform(VoxelLight::SKY)
    }

    pub fn air(&self) -> u32 {
        self.air
    }

    pub fn block_light(&self, x: u8, y: u8, z: u8) -> u8 {
        self.light.get(x, y, z).block_light()
    }

    pub fn sky_light(&self, x: u8, y: u8, z: u8) -> u8 {
        self.light.get(x, y, z).sky_light()
    }

    pub fn set_block_light(&mut self, x: u8, y: u8, z: u8, level: u8) {
        let mut light = self.light.get(x, y, z);
        light.set_block_light(level);
        self.light.set(x, y, z, light);
    }

    pub fn set_sky_light(&mut self, x: u8, y: u8, z: u8, level: u8) {
        let mut light = self.light.get(x, y, z);
        light.set_sky_light(level);
        self.light.set(x, y, z, light);
    }

    /// Resets both channels of every cell to zero.
    pub fn clear_light(&mut self) {
        self.light.fill(VoxelLight::default());
    }
}
