//! A full 16×256×16 world column.
//!
//! The column is a stack of 16 optional [`SubChunk`] bands indexed by
//! `y >> 4`, a 256-entry biome array indexed by `(x << 4) | z`, and a map of
//! block entities keyed by absolute position. An absent band reads as air.
//!
//! Light in an absent band is implicit: no block light, and full sky light if
//! the band lies above the highest present band (zero otherwise). Bands are
//! materialised so that this implicit light is preserved.

use rustc_hash::FxHashMap;

use crate::light::MAX_LIGHT;
use crate::nbt::{BlockNbt, BlockPos};
use crate::sub_chunk::SubChunk;

/// Number of vertical bands in a chunk.
pub const SUB_CHUNK_COUNT: usize = 16;

/// Height of a chunk in blocks.
pub const CHUNK_HEIGHT: usize = SUB_CHUNK_COUNT * 16;

/// Number of columns (and biome entries) in a chunk.
pub const CHUNK_AREA: usize = 256;

/// One 16×256×16 column of blocks, biomes, block entities and light.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    air: u32,
    sub: [Option<Box<SubChunk>>; SUB_CHUNK_COUNT],
    biomes: [u8; CHUNK_AREA],
    block_nbt: FxHashMap<BlockPos, BlockNbt>,
}

impl Chunk {
    /// Creates an empty chunk. `air` is the runtime ID reported for cells no
    /// block was ever set in.
    pub fn new(air: u32) -> Self {
        Self {
            air,
            sub: Default::default(),
            biomes: [0; CHUNK_AREA],
            block_nbt: FxHashMap::default(),
        }
    }

    /// The runtime ID this chunk treats as air.
    pub fn air(&self) -> u32 {
        self.air
    }

    /// Runtime ID at `(x, y, z)` in `layer`. `x` and `z` are masked to `0..16`.
    pub fn runtime_id(&self, x: u8, y: u8, z: u8, layer: usize) -> u32 {
        match &self.sub[usize::from(y >> 4)] {
            Some(sub) => sub.runtime_id(x, y & 15, z, layer),
            None => self.air,
        }
    }

    /// Writes `runtime_id` at `(x, y, z)` in `layer`, materialising the band
    /// and layer if needed.
    pub fn set_runtime_id(&mut self, x: u8, y: u8, z: u8, layer: usize, runtime_id: u32) {
        self.sub_or_create(usize::from(y >> 4))
            .set_runtime_id(x, y & 15, z, layer, runtime_id);
    }

    /// Biome ID of column `(x, z)`.
    pub fn biome_id(&self, x: u8, z: u8) -> u8 {
        self.biomes[column_index(x, z)]
    }

    pub fn set_biome_id(&mut self, x: u8, z: u8, biome: u8) {
        self.biomes[column_index(x, z)] = biome;
    }

    /// All biome IDs, indexed by `(x << 4) | z`.
    pub fn biomes(&self) -> &[u8; CHUNK_AREA] {
        &self.biomes
    }

    pub(crate) fn set_biomes(&mut self, biomes: [u8; CHUNK_AREA]) {
        self.biomes = biomes;
    }

    /// Block entity data stored at `pos`.
    pub fn block_nbt(&self, pos: BlockPos) -> Option<&BlockNbt> {
        self.block_nbt.get(&pos)
    }

    /// Stores block entity data at `pos`; `None` removes the entry.
    pub fn set_block_nbt(&mut self, pos: BlockPos, nbt: Option<BlockNbt>) {
        match nbt {
            Some(nbt) => {
                self.block_nbt.insert(pos, nbt);
            }
            None => {
                self.block_nbt.remove(&pos);
            }
        }
    }

    /// Iterates every stored block entity.
    pub fn block_entities(&self) -> impl Iterator<Item = (&BlockPos, &BlockNbt)> {
        self.block_nbt.iter()
    }

    /// Compacts every present band and drops bands left without layers.
    ///
    /// Light held by dropped bands is discarded; run a fill pass afterwards if
    /// the chunk stays loaded.
    pub fn compact(&mut self) {
        for slot in &mut self.sub {
            if let Some(sub) = slot {
                sub.compact();
                if sub.layers().is_empty() {
                    *slot = None;
                }
            }
        }
    }

    /// All 16 band slots, lowest first.
    pub fn sub_chunks(&self) -> &[Option<Box<SubChunk>>; SUB_CHUNK_COUNT] {
        &self.sub
    }

    /// Band `index`, if present.
    pub fn sub(&self, index: usize) -> Option<&SubChunk> {
        self.sub[index].as_deref()
    }

    pub fn sub_mut(&mut self, index: usize) -> Option<&mut SubChunk> {
        self.sub[index].as_deref_mut()
    }

    pub(crate) fn set_sub(&mut self, index: usize, sub: SubChunk) {
        self.sub[index] = Some(Box::new(sub));
    }

    /// Index of the highest present band.
    pub fn highest_sub_chunk(&self) -> Option<usize> {
        self.sub.iter().rposition(Option::is_some)
    }

    /// Returns band `index`, creating it when absent.
    ///
    /// A band created above the current top starts with full sky light, and
    /// the absent bands between the old top and it are materialised the same
    /// way. A band created below the top starts dark.
    pub fn sub_or_create(&mut self, index: usize) -> &mut SubChunk {
        let air = self.air;
        let sky_light = match self.highest_sub_chunk() {
            Some(top) if index < top => 0,
            top => {
                let first_gap = top.map_or(0, |t| t + 1);
                for gap in first_gap..index {
                    self.sub[gap] = Some(Box::new(SubChunk::new(air, MAX_LIGHT)));
                }
                MAX_LIGHT
            }
        };
        self.sub[index].get_or_insert_with(|| Box::new(SubChunk::new(air, sky_light)))
    }

    /// Block light at `(x, y, z)`.
    pub fn block_light(&self, x: u8, y: u8, z: u8) -> u8 {
        match &self.sub[usize::from(y >> 4)] {
            Some(sub) => sub.block_light(x, y & 15, z),
            None => 0,
        }
    }

    /// Sky light at `(x, y, z)`.
    pub fn sky_light(&self, x: u8, y: u8, z: u8) -> u8 {
        let index = usize::from(y >> 4);
        match &self.sub[index] {
            Some(sub) => sub.sky_light(x, y & 15, z),
            None => self.implicit_sky_light(index),
        }
    }

    /// The brighter of block and sky light at `(x, y, z)`.
    pub fn light(&self, x: u8, y: u8, z: u8) -> u8 {
        self.block_light(x, y, z).max(self.sky_light(x, y, z))
    }

    pub fn set_block_light(&mut self, x: u8, y: u8, z: u8, level: u8) {
        self.sub_or_create(usize::from(y >> 4))
            .set_block_light(x, y & 15, z, level);
    }

    pub fn set_sky_light(&mut self, x: u8, y: u8, z: u8, level: u8) {
        self.sub_or_create(usize::from(y >> 4))
            .set_sky_light(x, y & 15, z, level);
    }

    /// Zeroes both light channels in every present band.
    pub fn clear_light(&mut self) {
        for sub in self.sub.iter_mut().flatten() {
            sub.clear_light();
        }
    }

    /// Removes empty bands from the top of the column down, stopping at the
    /// first band that holds blocks or non-ambient light. Bands below that
    /// point are kept even when empty.
    pub fn remove_empty_sub_chunks(&mut self) {
        for slot in self.sub.iter_mut().rev() {
            let Some(sub) = slot else { continue };
            if !sub.is_empty() || !sub.has_ambient_light() {
                break;
            }
            *slot = None;
        }
    }

    fn implicit_sky_light(&self, index: usize) -> u8 {
        match self.highest_sub_chunk() {
            Some(top) if index < top => 0,
            _ => MAX_LIGHT,
        }
    }
}

fn column_index(x: u8, z: u8) -> usize {
    (usize::from(x & 15) << 4) | usize::from(z & 15)
}
