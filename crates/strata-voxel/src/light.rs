//! Per-cell light storage for a sub-chunk.
//!
//! Each cell stores two 4-bit light levels packed into a single byte:
//! the high nibble for sky light and the low nibble for block light.

use crate::palette::STORAGE_VOLUME;

/// Maximum light level for either channel.
pub const MAX_LIGHT: u8 = 15;

/// Packed light value: high nibble = sky light, low nibble = block light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoxelLight(pub u8);

impl VoxelLight {
    /// Light of a cell open to the sky with no block light.
    pub const SKY: VoxelLight = VoxelLight(MAX_LIGHT << 4);

    /// Returns the sky light level (0–15).
    pub fn sky_light(self) -> u8 {
        (self.0 >> 4) & 0xF
    }

    /// Returns the block light level (0–15).
    pub fn block_light(self) -> u8 {
        self.0 & 0xF
    }

    /// Sets the sky light level (0–15).
    pub fn set_sky_light(&mut self, level: u8) {
        debug_assert!(level <= MAX_LIGHT);
        self.0 = (self.0 & 0x0F) | (level << 4);
    }

    /// Sets the block light level (0–15).
    pub fn set_block_light(&mut self, level: u8) {
        debug_assert!(level <= MAX_LIGHT);
        self.0 = (self.0 & 0xF0) | (level & 0x0F);
    }
}

/// One [`VoxelLight`] per cell of a 16×16×16 region, indexed like
/// [`BlockStorage`](crate::BlockStorage).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightArray {
    data: Box<[VoxelLight; STORAGE_VOLUME]>,
}

impl LightArray {
    /// Creates an array with every cell set to `light`.
    pub fn filled(light: VoxelLight) -> Self {
        Self {
            data: Box::new([light; STORAGE_VOLUME]),
        }
    }

    /// Light at `(x, y, z)`. Coordinates are masked to `0..16`.
    pub fn get(&self, x: u8, y: u8, z: u8) -> VoxelLight {
        self.data[Self::index(x, y, z)]
    }

    pub fn set(&mut self, x: u8, y: u8, z: u8, light: VoxelLight) {
        self.data[Self::index(x, y, z)] = light;
    }

    /// Overwrites every cell.
    pub fn fill(&mut self, light: VoxelLight) {
        self.data.fill(light);
    }

    /// Returns `true` if every cell equals `light`.
    pub fn is_uniform(&self, light: VoxelLight) -> bool {
        self.data.iter().all(|&l| l == light)
    }

    fn index(x: u8, y: u8, z: u8) -> usize {
        (usize::from(x & 15) << 8) | (usize::from(z & 15) << 4) | usize::from(y & 15)
    }
}
