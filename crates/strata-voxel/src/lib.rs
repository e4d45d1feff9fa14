//! Chunk voxel storage: palettes, bit-packed block storages, sub-chunks,
//! chunk columns with light, block entities and the sub-chunk wire encoding.

pub mod block_storage;
pub mod chunk;
pub mod encoding;
pub mod light;
pub mod nbt;
pub mod palette;
pub mod registry;
pub mod sub_chunk;

pub use block_storage::BlockStorage;
pub use chunk::{CHUNK_AREA, CHUNK_HEIGHT, Chunk, SUB_CHUNK_COUNT};
pub use encoding::{
    DecodeError, EncodedChunk, SUB_CHUNK_VERSION, decode_chunk, decode_sub_chunk, encode_chunk,
    encode_sub_chunk,
};
pub use light::{LightArray, MAX_LIGHT, VoxelLight};
pub use nbt::{BlockNbt, BlockPos, NbtValue};
pub use palette::{BitsPerBlock, Palette, STORAGE_VOLUME};
pub use registry::{AIR_RUNTIME_ID, BlockDef, BlockRegistry, RegistryError};
pub use sub_chunk::{MAX_LAYERS, SubChunk};
