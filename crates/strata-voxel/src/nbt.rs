//! Block entity data: NBT-like values keyed by absolute block position.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Absolute integer block position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A single NBT tag value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NbtValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<i8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    List(Vec<NbtValue>),
    Compound(BlockNbt),
}

/// The root compound of a block entity (chest contents, sign text, ...).
pub type BlockNbt = FxHashMap<String, NbtValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_entity_ron_round_trip() {
        let mut item = BlockNbt::default();
        item.insert("Count".to_string(), NbtValue::Byte(3));
        let mut nbt = BlockNbt::default();
        nbt.insert("id".to_string(), NbtValue::String("Sign".to_string()));
        nbt.insert("Text".to_string(), NbtValue::List(vec![NbtValue::String("hi".to_string())]));
        nbt.insert("Item".to_string(), NbtValue::Compound(item));
        nbt.insert("Scale".to_string(), NbtValue::Float(1.5));
        nbt.insert("Stamps".to_string(), NbtValue::LongArray(vec![-1, i64::MAX]));
        let entry = (BlockPos::new(-3, 64, 17), nbt);

        let text = ron::to_string(&entry).unwrap();
        let back: (BlockPos, BlockNbt) = ron::from_str(&text).unwrap();
        assert_eq!(back, entry);
    }
}
