//! Bit-packed palette indices for one 16×16×16 region at a single layer.
//!
//! Indices are packed into little-endian `u32` words. Each word holds
//! `32 / bits` whole indices; for widths that do not divide 32 (3, 5, 6) the
//! leftover high bits of every word stay zero and one extra word holds the
//! remainder. This layout is shared with peers reading the same encoding and
//! must not change.
//!
//! Cells are addressed `(x << 8) | (z << 4) | y`.

use crate::palette::{BitsPerBlock, Palette, STORAGE_VOLUME};

/// Palette-compressed storage of 4096 runtime IDs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockStorage {
    bits_per_block: BitsPerBlock,
    /// `(1 << bits) - 1`, cached.
    block_mask: u32,
    /// Bits of each word used for indices, cached.
    filled_bits_per_word: u32,
    words: Vec<u32>,
    palette: Palette,
}

impl BlockStorage {
    /// Creates a 1-bit storage where every cell holds `runtime_id`.
    pub fn new(runtime_id: u32) -> Self {
        let bits = BitsPerBlock::One;
        Self {
            bits_per_block: bits,
            block_mask: bits.mask(),
            filled_bits_per_word: bits.filled_bits_per_word(),
            words: vec![0; bits.word_count()],
            palette: Palette::new(bits, vec![runtime_id]),
        }
    }

    /// Assembles a storage from already-validated parts.
    ///
    /// `words` must hold exactly `palette.size().word_count()` entries and
    /// every packed index must be below `palette.len()`.
    pub(crate) fn from_raw(words: Vec<u32>, palette: Palette) -> Self {
        let bits = palette.size();
        debug_assert_eq!(words.len(), bits.word_count());
        Self {
            bits_per_block: bits,
            block_mask: bits.mask(),
            filled_bits_per_word: bits.filled_bits_per_word(),
            words,
            palette,
        }
    }

    /// Runtime ID at `(x, y, z)`. Coordinates are masked to `0..16`.
    pub fn runtime_id(&self, x: u8, y: u8, z: u8) -> u32 {
        let index = self.index_at(cell_index(x, y, z));
        self.palette.runtime_id(index as usize)
    }

    /// Writes `runtime_id` at `(x, y, z)`, growing the palette and the index
    /// width when the value is new.
    pub fn set_runtime_id(&mut self, x: u8, y: u8, z: u8, runtime_id: u32) {
        let index = match self.palette.index(runtime_id) {
            Some(index) => index,
            None => {
                let index = self.palette.add(runtime_id);
                if self.palette.needs_resize() {
                    self.palette.increase_size();
                    self.resize(self.palette.size());
                }
                index
            }
        };
        self.set_index_at(cell_index(x, y, z), index as u32);
    }

    /// Current index width.
    pub fn bits_per_block(&self) -> BitsPerBlock {
        self.bits_per_block
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Raw packed words, in wire order.
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Returns `true` if the palette is exactly `[runtime_id]`.
    pub fn is_uniform(&self, runtime_id: u32) -> bool {
        self.palette.values() == [runtime_id]
    }

    /// Repacks every cell at `new_size`. No-op when the width is unchanged.
    ///
    /// The new buffer is built completely before it replaces the old one.
    pub(crate) fn resize(&mut self, new_size: BitsPerBlock) {
        if new_size == self.bits_per_block {
            return;
        }
        tracing::trace!(
            from = self.bits_per_block.bits(),
            to = new_size.bits(),
            palette_len = self.palette.len(),
            "resizing block storage"
        );

        let mut resized = Self {
            bits_per_block: new_size,
            block_mask: new_size.mask(),
            filled_bits_per_word: new_size.filled_bits_per_word(),
            words: vec![0; new_size.word_count()],
            palette: Palette::new(new_size, Vec::new()),
        };
        for cell in 0..STORAGE_VOLUME as u32 {
            resized.set_index_at(cell, self.index_at(cell));
        }

        self.bits_per_block = resized.bits_per_block;
        self.block_mask = resized.block_mask;
        self.filled_bits_per_word = resized.filled_bits_per_word;
        self.words = resized.words;
    }

    /// Removes palette entries no cell references and rewrites every cell
    /// through the resulting remap. The index width never shrinks.
    ///
    /// Scans all 4096 cells twice; meant to run before serialisation rather
    /// than on every write.
    pub fn compact(&mut self) {
        let mut used = vec![false; self.palette.len()];
        for cell in 0..STORAGE_VOLUME as u32 {
            used[self.index_at(cell) as usize] = true;
        }
        if used.iter().all(|&u| u) {
            return;
        }

        let remap = self.palette.compact(&used);
        for cell in 0..STORAGE_VOLUME as u32 {
            let old = self.index_at(cell) as usize;
            self.set_index_at(cell, u32::from(remap[old]));
        }
    }

    /// Palette index stored for a flat cell number.
    pub(crate) fn index_at(&self, cell: u32) -> u32 {
        let offset = cell * self.bits_per_block.bits();
        let word = (offset / self.filled_bits_per_word) as usize;
        let shift = offset % self.filled_bits_per_word;
        (self.words[word] >> shift) & self.block_mask
    }

    fn set_index_at(&mut self, cell: u32, index: u32) {
        assert!(
            index <= self.block_mask,
            "palette index {index} does not fit in {} bits",
            self.bits_per_block.bits()
        );
        let offset = cell * self.bits_per_block.bits();
        let word = (offset / self.filled_bits_per_word) as usize;
        let shift = offset % self.filled_bits_per_word;
        let w = &mut self.words[word];
        *w = (*w & !(self.block_mask << shift)) | (index << shift);
    }
}

/// Flat cell number for masked coordinates.
fn cell_index(x: u8, y: u8, z: u8) -> u32 {
    (u32::from(x & 15) << 8) | (u32::from(z & 15) << 4) | u32::from(y & 15)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_distinct(storage: &mut BlockStorage, distinct: u32) {
        for x in 0..16u8 {
            for y in 0..16u8 {
                for z in 0..16u8 {
                    let cell = cell_index(x, y, z);
                    storage.set_runtime_id(x, y, z, cell % distinct);
                }
            }
        }
    }

    #[test]
    fn test_new_storage_is_one_bit_uniform() {
        let storage = BlockStorage::new(0);
        assert_eq!(storage.bits_per_block(), BitsPerBlock::One);
        assert_eq!(storage.words().len(), 128);
        assert!(storage.is_uniform(0));
        assert_eq!(storage.runtime_id(15, 15, 15), 0);
    }

    #[test]
    fn test_coordinates_are_masked() {
        let mut storage = BlockStorage::new(0);
        storage.set_runtime_id(17, 3, 33, 9);
        assert_eq!(storage.runtime_id(1, 3, 1), 9);
    }

    #[test]
    fn test_third_value_grows_to_two_bits() {
        let mut storage = BlockStorage::new(0);
        storage.set_runtime_id(0, 0, 0, 1);
        assert_eq!(storage.bits_per_block(), BitsPerBlock::One);
        storage.set_runtime_id(1, 0, 0, 2);
        assert_eq!(storage.bits_per_block(), BitsPerBlock::Two);
        assert_eq!(storage.words().len(), 256);
        assert_eq!(storage.runtime_id(0, 0, 0), 1);
        assert_eq!(storage.runtime_id(1, 0, 0), 2);
        assert_eq!(storage.runtime_id(2, 0, 0), 0);
    }

    #[test]
    fn test_every_width_round_trips_all_cells() {
        // Distinct counts chosen so each lands on a different width.
        let cases = [
            (2, BitsPerBlock::One),
            (4, BitsPerBlock::Two),
            (8, BitsPerBlock::Three),
            (16, BitsPerBlock::Four),
            (32, BitsPerBlock::Five),
            (64, BitsPerBlock::Six),
            (256, BitsPerBlock::Eight),
            (4096, BitsPerBlock::Sixteen),
        ];
        for (distinct, bits) in cases {
            let mut storage = BlockStorage::new(0);
            fill_distinct(&mut storage, distinct);
            assert_eq!(storage.bits_per_block(), bits, "{distinct} distinct values");
            assert_eq!(storage.words().len(), bits.word_count());
            for x in 0..16u8 {
                for y in 0..16u8 {
                    for z in 0..16u8 {
                        assert_eq!(
                            storage.runtime_id(x, y, z),
                            cell_index(x, y, z) % distinct,
                            "mismatch at ({x}, {y}, {z}) with {bits:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_padding_bits_stay_zero() {
        let mut storage = BlockStorage::new(0);
        fill_distinct(&mut storage, 8);
        assert_eq!(storage.bits_per_block(), BitsPerBlock::Three);
        for word in storage.words() {
            assert_eq!(word >> 30, 0);
        }
    }

    #[test]
    fn test_resize_same_width_is_noop() {
        let mut storage = BlockStorage::new(0);
        storage.set_runtime_id(3, 4, 5, 1);
        let before = storage.clone();
        storage.resize(BitsPerBlock::One);
        assert_eq!(storage, before);
    }

    #[test]
    fn test_compact_drops_unused_entries() {
        let mut storage = BlockStorage::new(0);
        storage.set_runtime_id(0, 0, 0, 1);
        storage.set_runtime_id(0, 1, 0, 2);
        storage.set_runtime_id(0, 0, 0, 0);
        storage.compact();
        assert_eq!(storage.palette().values(), &[0, 2]);
        assert_eq!(storage.bits_per_block(), BitsPerBlock::Two);
        assert_eq!(storage.runtime_id(0, 1, 0), 2);
        assert_eq!(storage.runtime_id(0, 0, 0), 0);
    }

    #[test]
    fn test_compact_without_unused_entries_changes_nothing() {
        let mut storage = BlockStorage::new(0);
        fill_distinct(&mut storage, 5);
        let before = storage.clone();
        storage.compact();
        assert_eq!(storage, before);
    }

    #[test]
    fn test_compact_twice_equals_once() {
        let mut storage = BlockStorage::new(0);
        fill_distinct(&mut storage, 12);
        for z in 0..16u8 {
            for y in 0..16u8 {
                for x in 0..16u8 {
                    storage.set_runtime_id(x, y, z, 99);
                }
            }
        }
        storage.set_runtime_id(7, 7, 7, 3);
        storage.compact();
        let once = storage.clone();
        storage.compact();
        assert_eq!(storage, once);
        assert_eq!(once.palette().values(), &[3, 99]);
    }

    #[test]
    #[should_panic]
    fn test_reading_unknown_palette_index_panics() {
        let palette = Palette::new(BitsPerBlock::One, vec![0]);
        let mut words = vec![0; BitsPerBlock::One.word_count()];
        words[0] = 1;
        let storage = BlockStorage::from_raw(words, palette);
        storage.runtime_id(0, 0, 0);
    }
}
