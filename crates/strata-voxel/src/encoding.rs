//! Wire encoding of sub-chunks and chunks.
//!
//! ## Sub-chunk layout
//!
//! | Size | Field |
//! |------|-------|
//! | 1 | Version (`u8`, currently 8) |
//! | 1 | Layer count (`u8`) |
//!
//! Followed, per layer, by:
//!
//! | Size | Field |
//! |------|-------|
//! | 1 | Header: `bits_per_block << 1 \| 1` (low bit marks a runtime-ID palette) |
//! | W×4 | Packed words (`u32`, little-endian), W = [`BitsPerBlock::word_count`] |
//! | var | Palette length (zig-zag varint32) |
//! | var | Palette entries (zig-zag varint32 each) |
//!
//! A chunk is encoded as one optional blob per band plus the raw biome array.
//! Absent bands have no blob. Light is not encoded; receivers recompute it.

use thiserror::Error;

use crate::block_storage::BlockStorage;
use crate::chunk::{CHUNK_AREA, Chunk, SUB_CHUNK_COUNT};
use crate::palette::{BitsPerBlock, Palette, STORAGE_VOLUME};
use crate::sub_chunk::{MAX_LAYERS, SubChunk};

/// Current sub-chunk format version.
pub const SUB_CHUNK_VERSION: u8 = 8;

/// Errors that can occur while decoding sub-chunks or chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The data ended before a field was complete.
    #[error("data truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum byte count needed.
        expected: usize,
        /// Byte count available.
        actual: usize,
    },
    /// The version byte is not supported by this build.
    #[error("unsupported sub-chunk version: {0}")]
    UnsupportedVersion(u8),
    /// More layers than a sub-chunk may hold.
    #[error("sub-chunk declares {0} layers (max {MAX_LAYERS})")]
    TooManyLayers(u8),
    /// The layer header does not mark a runtime-ID palette.
    #[error("layer header {0:#04x} does not describe a runtime palette")]
    PersistentPalette(u8),
    /// The header encodes an unsupported index width.
    #[error("invalid bits per block: {0}")]
    InvalidBitsPerBlock(u8),
    /// The palette is empty or larger than its width can address.
    #[error("invalid palette length {len} for {bits} bits per block")]
    InvalidPaletteLength {
        /// Declared length.
        len: i64,
        /// Index width.
        bits: u32,
    },
    /// A packed index points past the end of the palette.
    #[error("palette index {index} out of range (palette has {palette_len} entries)")]
    IndexOutOfPalette {
        /// Offending index.
        index: u32,
        /// Palette length.
        palette_len: usize,
    },
    /// A varint ran longer than 5 bytes.
    #[error("varint32 too long")]
    VarIntTooLong,
    /// The biome array is not 256 bytes.
    #[error("biome data must be {CHUNK_AREA} bytes, got {0}")]
    InvalidBiomeLength(usize),
}

/// Encoded form of a [`Chunk`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedChunk {
    /// One blob per band, `None` where the band is absent.
    pub sub_chunks: [Option<Vec<u8>>; SUB_CHUNK_COUNT],
    /// Biome IDs, indexed by `(x << 4) | z`.
    pub biomes: Vec<u8>,
}

/// Encodes a single sub-chunk.
pub fn encode_sub_chunk(sub: &SubChunk) -> Vec<u8> {
    let layers = sub.layers();
    let mut buf = Vec::with_capacity(2 + layers.iter().map(layer_len_hint).sum::<usize>());
    buf.push(SUB_CHUNK_VERSION);
    buf.push(layers.len() as u8);
    for storage in layers {
        encode_storage(storage, &mut buf);
    }
    buf
}

/// Decodes a sub-chunk, returning it with the number of bytes consumed.
/// The decoded sub-chunk has no light.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the data is truncated, has an unknown version
/// or header, or references palette entries that do not exist.
pub fn decode_sub_chunk(air: u32, data: &[u8]) -> Result<(SubChunk, usize), DecodeError> {
    let mut reader = Reader::new(data);
    let version = reader.u8()?;
    if version != SUB_CHUNK_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let layer_count = reader.u8()?;
    if usize::from(layer_count) > MAX_LAYERS {
        return Err(DecodeError::TooManyLayers(layer_count));
    }

    let mut storages = Vec::with_capacity(usize::from(layer_count));
    for _ in 0..layer_count {
        storages.push(decode_storage(&mut reader)?);
    }
    Ok((SubChunk::from_layers(air, storages), reader.pos))
}

/// Encodes every present band and the biome array.
pub fn encode_chunk(chunk: &Chunk) -> EncodedChunk {
    let mut encoded = EncodedChunk {
        biomes: chunk.biomes().to_vec(),
        ..Default::default()
    };
    for (slot, sub) in encoded.sub_chunks.iter_mut().zip(chunk.sub_chunks()) {
        *slot = sub.as_deref().map(encode_sub_chunk);
    }
    encoded
}

/// Rebuilds a chunk from its encoded form. Block entities are not part of
/// the encoding and the result carries no light.
///
/// # Errors
///
/// Returns the first [`DecodeError`] hit by any band, or
/// [`DecodeError::InvalidBiomeLength`].
pub fn decode_chunk(air: u32, encoded: &EncodedChunk) -> Result<Chunk, DecodeError> {
    let biomes: [u8; CHUNK_AREA] = encoded
        .biomes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::InvalidBiomeLength(encoded.biomes.len()))?;

    let mut chunk = Chunk::new(air);
    chunk.set_biomes(biomes);
    for (index, blob) in encoded.sub_chunks.iter().enumerate() {
        let Some(blob) = blob else { continue };
        let (sub, read) = decode_sub_chunk(air, blob)?;
        if read != blob.len() {
            tracing::warn!(
                band = index,
                trailing = blob.len() - read,
                "ignoring trailing bytes after sub-chunk"
            );
        }
        chunk.set_sub(index, sub);
    }
    Ok(chunk)
}

fn layer_len_hint(storage: &BlockStorage) -> usize {
    1 + storage.words().len() * 4 + 5 * (storage.palette().len() + 1)
}

fn encode_storage(storage: &BlockStorage, buf: &mut Vec<u8>) {
    buf.push(((storage.bits_per_block().bits() as u8) << 1) | 1);
    for word in storage.words() {
        buf.extend_from_slice(&word.to_le_bytes());
    }
    let palette = storage.palette();
    write_varint32(buf, palette.len() as i32);
    for &id in palette.values() {
        write_varint32(buf, id as i32);
    }
}

fn decode_storage(reader: &mut Reader<'_>) -> Result<BlockStorage, DecodeError> {
    let header = reader.u8()?;
    if header & 1 == 0 {
        return Err(DecodeError::PersistentPalette(header));
    }
    let bits = BitsPerBlock::from_bits(header >> 1)
        .ok_or(DecodeError::InvalidBitsPerBlock(header >> 1))?;

    let word_bytes = reader.take(bits.word_count() * 4)?;
    let words = word_bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    let len = reader.varint32()?;
    if len < 1 || len as usize > bits.capacity() {
        return Err(DecodeError::InvalidPaletteLength {
            len: i64::from(len),
            bits: bits.bits(),
        });
    }
    let mut values = Vec::with_capacity(len as usize);
    for _ in 0..len {
        values.push(reader.varint32()? as u32);
    }

    let storage = BlockStorage::from_raw(words, Palette::new(bits, values));
    let palette_len = storage.palette().len();
    for cell in 0..STORAGE_VOLUME as u32 {
        let index = storage.index_at(cell);
        if index as usize >= palette_len {
            return Err(DecodeError::IndexOutOfPalette { index, palette_len });
        }
    }
    Ok(storage)
}

/// Writes a zig-zag encoded signed 32-bit varint.
fn write_varint32(buf: &mut Vec<u8>, value: i32) {
    let mut zigzag = ((value << 1) ^ (value >> 31)) as u32;
    while zigzag >= 0x80 {
        buf.push((zigzag as u8 & 0x7F) | 0x80);
        zigzag >>= 7;
    }
    buf.push(zigzag as u8);
}

/// Cursor over a byte slice.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos + n;
        if end > self.data.len() {
            return Err(DecodeError::Truncated {
                expected: end,
                actual: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn varint32(&mut self) -> Result<i32, DecodeError> {
        let mut value = 0u32;
        for i in 0..5 {
            let byte = self.u8()?;
            value |= u32::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok((value >> 1) as i32 ^ -((value & 1) as i32));
            }
        }
        Err(DecodeError::VarIntTooLong)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIR: u32 = 0;

    fn varint_bytes(value: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint32(&mut buf, value);
        buf
    }

    #[test]
    fn test_varint_zigzag_values() {
        assert_eq!(varint_bytes(0), vec![0x00]);
        assert_eq!(varint_bytes(-1), vec![0x01]);
        assert_eq!(varint_bytes(1), vec![0x02]);
        assert_eq!(varint_bytes(64), vec![0x80, 0x01]);
        for value in [0, 1, -1, 300, -300, i32::MAX, i32::MIN, 0x7FFF_FFFF] {
            let bytes = varint_bytes(value);
            let mut reader = Reader::new(&bytes);
            assert_eq!(reader.varint32().unwrap(), value);
            assert_eq!(reader.pos, bytes.len());
        }
    }

    #[test]
    fn test_sub_chunk_header_layout() {
        let mut sub = SubChunk::new(AIR, 0);
        sub.set_runtime_id(0, 0, 0, 0, 5);
        let bytes = encode_sub_chunk(&sub);
        assert_eq!(bytes[0], SUB_CHUNK_VERSION);
        assert_eq!(bytes[1], 1);
        assert_eq!(bytes[2], (1 << 1) | 1);
        // 128 words, then palette length 2 and entries 0 and 5.
        let palette_start = 3 + 128 * 4;
        assert_eq!(&bytes[palette_start..], &[0x04, 0x00, 0x0A]);
        // Cell 0 holds palette index 1.
        assert_eq!(bytes[3], 1);
    }

    #[test]
    fn test_sub_chunk_round_trip_all_widths() {
        for distinct in [2u32, 3, 5, 9, 17, 33, 65, 300] {
            let mut sub = SubChunk::new(AIR, 0);
            for cell in 0..4096u32 {
                let (x, z, y) = ((cell >> 8) as u8, ((cell >> 4) & 15) as u8, (cell & 15) as u8);
                sub.set_runtime_id(x, y, z, 0, cell % distinct * 7);
            }
            sub.set_runtime_id(3, 3, 3, 1, 1234);
            let bytes = encode_sub_chunk(&sub);
            let (decoded, read) = decode_sub_chunk(AIR, &bytes).expect("decodes");
            assert_eq!(read, bytes.len());
            assert_eq!(decoded.layers(), sub.layers(), "{distinct} distinct values");
        }
    }

    #[test]
    fn test_chunk_omits_absent_bands() {
        let mut chunk = Chunk::new(AIR);
        chunk.set_sub(3, SubChunk::new(AIR, 0));
        chunk.set_runtime_id(1, 50, 1, 0, 9);
        chunk.set_biome_id(4, 4, 21);
        let encoded = encode_chunk(&chunk);
        assert!(encoded.sub_chunks[3].is_some());
        assert!(encoded.sub_chunks[0].is_none());
        assert!(encoded.sub_chunks[4].is_none());

        let decoded = decode_chunk(AIR, &encoded).expect("decodes");
        assert_eq!(decoded.runtime_id(1, 50, 1, 0), 9);
        assert_eq!(decoded.biome_id(4, 4), 21);
        assert_eq!(decoded.highest_sub_chunk(), Some(3));
        assert!(decoded.sub(0).is_none());
    }

    #[test]
    fn test_corrupted_data_returns_error() {
        assert_eq!(
            decode_sub_chunk(AIR, &[]).unwrap_err(),
            DecodeError::Truncated {
                expected: 1,
                actual: 0
            }
        );
        assert_eq!(
            decode_sub_chunk(AIR, &[1, 0]).unwrap_err(),
            DecodeError::UnsupportedVersion(1)
        );
        assert_eq!(
            decode_sub_chunk(AIR, &[SUB_CHUNK_VERSION, 9]).unwrap_err(),
            DecodeError::TooManyLayers(9)
        );
        assert_eq!(
            decode_sub_chunk(AIR, &[SUB_CHUNK_VERSION, 1, 2]).unwrap_err(),
            DecodeError::PersistentPalette(2)
        );
        assert_eq!(
            decode_sub_chunk(AIR, &[SUB_CHUNK_VERSION, 1, (7 << 1) | 1]).unwrap_err(),
            DecodeError::InvalidBitsPerBlock(7)
        );
        assert!(matches!(
            decode_sub_chunk(AIR, &[SUB_CHUNK_VERSION, 1, 3, 0, 0]).unwrap_err(),
            DecodeError::Truncated { .. }
        ));
    }

    #[test]
    fn test_palette_length_validated() {
        let mut bytes = vec![SUB_CHUNK_VERSION, 1, 3];
        bytes.extend(std::iter::repeat_n(0, 128 * 4));
        let mut too_long = bytes.clone();
        write_varint32(&mut too_long, 3);
        assert_eq!(
            decode_sub_chunk(AIR, &too_long).unwrap_err(),
            DecodeError::InvalidPaletteLength { len: 3, bits: 1 }
        );
        write_varint32(&mut bytes, 0);
        assert!(matches!(
            decode_sub_chunk(AIR, &bytes).unwrap_err(),
            DecodeError::InvalidPaletteLength { len: 0, .. }
        ));
    }

    #[test]
    fn test_index_outside_palette_rejected() {
        let mut bytes = vec![SUB_CHUNK_VERSION, 1, 3, 0b10, 0, 0, 0];
        bytes.extend(std::iter::repeat_n(0, 127 * 4));
        write_varint32(&mut bytes, 1);
        write_varint32(&mut bytes, 0);
        assert_eq!(
            decode_sub_chunk(AIR, &bytes).unwrap_err(),
            DecodeError::IndexOutOfPalette {
                index: 1,
                palette_len: 1
            }
        );
    }

    #[test]
    fn test_bad_biome_length() {
        let encoded = EncodedChunk {
            biomes: vec![0; 10],
            ..Default::default()
        };
        assert_eq!(
            decode_chunk(AIR, &encoded).unwrap_err(),
            DecodeError::InvalidBiomeLength(10)
        );
    }
}
