//! Block palettes: the local index space a [`BlockStorage`](crate::BlockStorage)
//! packs into its words.
//!
//! A palette is an append-only list of runtime IDs together with the index
//! width ([`BitsPerBlock`]) the owning storage currently uses. Growth follows the
//! fixed progression 1, 2, 3, 4, 5, 6, 8, 16 bits.

use serde::{Deserialize, Serialize};

/// Number of cells in one 16×16×16 storage.
pub const STORAGE_VOLUME: usize = 4096;

/// Width of a single packed palette index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BitsPerBlock {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Eight,
    Sixteen,
}

impl BitsPerBlock {
    /// Every supported width, narrowest first.
    pub const ALL: [BitsPerBlock; 8] = [
        BitsPerBlock::One,
        BitsPerBlock::Two,
        BitsPerBlock::Three,
        BitsPerBlock::Four,
        BitsPerBlock::Five,
        BitsPerBlock::Six,
        BitsPerBlock::Eight,
        BitsPerBlock::Sixteen,
    ];

    /// Returns the width in bits.
    pub const fn bits(self) -> u32 {
        match self {
            BitsPerBlock::One => 1,
            BitsPerBlock::Two => 2,
            BitsPerBlock::Three => 3,
            BitsPerBlock::Four => 4,
            BitsPerBlock::Five => 5,
            BitsPerBlock::Six => 6,
            BitsPerBlock::Eight => 8,
            BitsPerBlock::Sixteen => 16,
        }
    }

    /// Parses a width in bits, returning `None` for unsupported widths.
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.bits() == u32::from(bits))
    }

    /// Returns the next wider width, or `None` at 16 bits.
    pub fn next(self) -> Option<Self> {
        match self {
            BitsPerBlock::One => Some(BitsPerBlock::Two),
            BitsPerBlock::Two => Some(BitsPerBlock::Three),
            BitsPerBlock::Three => Some(BitsPerBlock::Four),
            BitsPerBlock::Four => Some(BitsPerBlock::Five),
            BitsPerBlock::Five => Some(BitsPerBlock::Six),
            BitsPerBlock::Six => Some(BitsPerBlock::Eight),
            BitsPerBlock::Eight => Some(BitsPerBlock::Sixteen),
            BitsPerBlock::Sixteen => None,
        }
    }

    /// Number of whole indices that fit into one 32-bit word.
    pub const fn blocks_per_word(self) -> u32 {
        32 / self.bits()
    }

    /// Bits of each word actually holding indices. Widths that do not divide
    /// 32 leave the top bits of every word unused.
    pub const fn filled_bits_per_word(self) -> u32 {
        self.blocks_per_word() * self.bits()
    }

    /// Exact number of words needed for 4096 indices at this width. Widths 3,
    /// 5 and 6 carry one extra word for the remainder.
    pub const fn word_count(self) -> usize {
        let per_word = self.blocks_per_word() as usize;
        let mut count = STORAGE_VOLUME / per_word;
        if 32 % self.bits() != 0 {
            count += 1;
        }
        count
    }

    /// Largest palette this width can address (`2^bits`).
    pub const fn capacity(self) -> usize {
        1 << self.bits()
    }

    /// Mask selecting one index from a shifted word.
    pub const fn mask(self) -> u32 {
        ((1u64 << self.bits()) - 1) as u32
    }
}

/// Ordered runtime IDs addressable by a [`BlockStorage`](crate::BlockStorage).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    size: BitsPerBlock,
    values: Vec<u32>,
}

impl Palette {
    /// Creates a palette with the given width and initial entries.
    pub fn new(size: BitsPerBlock, values: Vec<u32>) -> Self {
        Self { size, values }
    }

    /// Index of `runtime_id` in the palette, if present.
    pub fn index(&self, runtime_id: u32) -> Option<usize> {
        self.values.iter().position(|&v| v == runtime_id)
    }

    /// Appends `runtime_id` and returns its index. Does not deduplicate:
    /// callers check [`Palette::index`] first.
    pub fn add(&mut self, runtime_id: u32) -> usize {
        self.values.push(runtime_id);
        self.values.len() - 1
    }

    /// Runtime ID stored at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not produced by this palette.
    pub fn runtime_id(&self, index: usize) -> u32 {
        self.values[index]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current index width.
    pub fn size(&self) -> BitsPerBlock {
        self.size
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Returns `true` if the palette holds more entries than its width can address.
    pub fn needs_resize(&self) -> bool {
        self.values.len() > self.size.capacity()
    }

    /// Advances the width to the next step of the progression.
    ///
    /// # Panics
    ///
    /// Panics when already at 16 bits; a palette that large means runtime IDs
    /// are being added without deduplication.
    pub fn increase_size(&mut self) {
        self.size = match self.size.next() {
            Some(next) => next,
            None => panic!(
                "palette cannot grow past 16 bits per block ({} entries)",
                self.values.len()
            ),
        };
    }

    /// Drops every entry whose `used` flag is unset and returns the remap
    /// table from old index to new index. Unused slots map to `u16::MAX`.
    ///
    /// The width is left untouched.
    pub fn compact(&mut self, used: &[bool]) -> Vec<u16> {
        debug_assert_eq!(used.len(), self.values.len());
        let mut remap = vec![u16::MAX; self.values.len()];
        let mut kept = Vec::with_capacity(self.values.len());
        for (old, (&id, &is_used)) in self.values.iter().zip(used).enumerate() {
            if is_used {
                remap[old] = kept.len() as u16;
                kept.push(id);
            }
        }
        self.values = kept;
        remap
    }
}
