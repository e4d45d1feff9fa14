//! A grid of loaded chunks lit as a whole.

use rustc_hash::FxHashMap;
use strata_config::SuperflatLayer;
use strata_lighting::{LightEngine, LightStats, NEIGHBOUR_OFFSETS};
use strata_voxel::{BlockDef, BlockRegistry, CHUNK_HEIGHT, Chunk, RegistryError};
use thiserror::Error;

/// Column coordinates of a chunk, in chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The eight surrounding positions, in the order the light engine expects.
    pub fn neighbours(self) -> [ChunkPos; 8] {
        NEIGHBOUR_OFFSETS.map(|(dx, dz)| ChunkPos::new(self.x + dx, self.z + dz))
    }
}

/// Errors raised while building a world.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A superflat layer names a block the registry does not know.
    #[error("unknown block in superflat layers: {0}")]
    UnknownBlock(String),
    /// Superflat layers stack above the top of the world.
    #[error("superflat layers are {height} blocks tall (max {CHUNK_HEIGHT})")]
    TooTall { height: usize },
}

/// Registers the blocks the demo world uses. Air is runtime ID 0.
pub fn default_registry() -> Result<BlockRegistry, RegistryError> {
    let mut registry = BlockRegistry::new();
    for name in ["stone", "dirt", "grass", "bedrock"] {
        registry.register(BlockDef::solid(name))?;
    }
    let translucent = [
        // name, emission, filter, opaque
        ("glowstone", 15, 15, true),
        ("leaves", 0, 1, false),
        ("water", 0, 2, false),
        ("glass", 0, 0, false),
        ("torch", 14, 0, false),
    ];
    for (name, light_emission, light_filter, opaque) in translucent {
        registry.register(BlockDef {
            name: name.to_string(),
            light_emission,
            light_filter,
            opaque,
        })?;
    }
    Ok(registry)
}

/// Loaded chunks keyed by position.
pub struct World {
    air: u32,
    chunks: FxHashMap<ChunkPos, Chunk>,
}

impl World {
    pub fn new(air: u32) -> Self {
        Self {
            air,
            chunks: FxHashMap::default(),
        }
    }

    /// Builds a square of `(2 * radius + 1)²` identical superflat chunks
    /// centred on the origin.
    pub fn superflat(
        registry: &BlockRegistry,
        layers: &[SuperflatLayer],
        radius: u32,
    ) -> Result<Self, WorldError> {
        let height: usize = layers.iter().map(|l| usize::from(l.thickness)).sum();
        if height > CHUNK_HEIGHT {
            return Err(WorldError::TooTall { height });
        }

        let mut template = Chunk::new(registry.air());
        let mut y = 0usize;
        for layer in layers {
            let id = registry
                .lookup_by_name(&layer.block)
                .ok_or_else(|| WorldError::UnknownBlock(layer.block.clone()))?;
            for _ in 0..layer.thickness {
                for x in 0..16 {
                    for z in 0..16 {
                        template.set_runtime_id(x, y as u8, z, 0, id);
                    }
                }
                y += 1;
            }
        }

        let mut world = World::new(registry.air());
        let r = radius as i32;
        for x in -r..=r {
            for z in -r..=r {
                world.insert(ChunkPos::new(x, z), template.clone());
            }
        }
        Ok(world)
    }

    pub fn insert(&mut self, pos: ChunkPos, chunk: Chunk) {
        self.chunks.insert(pos, chunk);
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sets a block by world coordinates, loading an empty chunk if needed.
    pub fn set_block(&mut self, x: i32, y: u8, z: i32, runtime_id: u32) {
        let pos = ChunkPos::new(x.div_euclid(16), z.div_euclid(16));
        let air = self.air;
        self.chunks
            .entry(pos)
            .or_insert_with(|| Chunk::new(air))
            .set_runtime_id(x.rem_euclid(16) as u8, y, z.rem_euclid(16) as u8, 0, runtime_id);
    }

    /// Fills every chunk, then spreads around every chunk whose eight
    /// neighbours are all loaded.
    pub fn light_all(&mut self, engine: &mut LightEngine) -> LightStats {
        let mut stats = LightStats::default();
        for chunk in self.chunks.values_mut() {
            add(&mut stats, engine.fill(chunk));
        }

        let mut positions: Vec<ChunkPos> = self.chunks.keys().copied().collect();
        positions.sort();
        for pos in positions {
            if let Some(spread) = self.spread_at(engine, pos) {
                add(&mut stats, spread);
            }
        }
        stats
    }

    /// Spreads light around `pos`. Returns `None` without touching anything if
    /// the chunk or any neighbour is not loaded.
    pub fn spread_at(&mut self, engine: &mut LightEngine, pos: ChunkPos) -> Option<LightStats> {
        let around = pos.neighbours();
        if !self.chunks.contains_key(&pos) || !around.iter().all(|p| self.chunks.contains_key(p)) {
            return None;
        }

        let mut centre = self.chunks.remove(&pos)?;
        let air = self.air;
        let mut neighbours = around.map(|p| self.chunks.remove(&p).unwrap_or_else(|| Chunk::new(air)));
        let stats = engine.spread(&mut centre, neighbours.each_mut());

        self.chunks.insert(pos, centre);
        for (p, chunk) in around.into_iter().zip(neighbours) {
            self.chunks.insert(p, chunk);
        }
        Some(stats)
    }
}

fn add(total: &mut LightStats, pass: LightStats) {
    total.block_nodes += pass.block_nodes;
    total.sky_nodes += pass.sky_nodes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_lighting::LightTables;

    fn flat() -> Vec<SuperflatLayer> {
        vec![
            SuperflatLayer::new("bedrock", 1),
            SuperflatLayer::new("dirt", 2),
            SuperflatLayer::new("grass", 1),
        ]
    }

    #[test]
    fn test_neighbours_follow_engine_order() {
        let around = ChunkPos::new(5, -2).neighbours();
        assert_eq!(around[0], ChunkPos::new(4, -3));
        assert_eq!(around[6], ChunkPos::new(6, -2));
        assert_eq!(around[7], ChunkPos::new(6, -1));
    }

    #[test]
    fn test_default_registry() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.lookup_by_name("stone"), Some(1));
        assert_eq!(registry.len(), 10);
        let torch = registry.lookup_by_name("torch").unwrap();
        assert_eq!(registry.get(torch).unwrap().light_emission, 14);
    }

    #[test]
    fn test_superflat_grid() {
        let registry = default_registry().unwrap();
        let world = World::superflat(&registry, &flat(), 1).unwrap();
        assert_eq!(world.len(), 9);
        let grass = registry.lookup_by_name("grass").unwrap();
        let chunk = world.chunk(ChunkPos::new(-1, 1)).unwrap();
        assert_eq!(chunk.runtime_id(3, 3, 3, 0), grass);
        assert_eq!(chunk.runtime_id(3, 4, 3, 0), registry.air());
    }

    #[test]
    fn test_superflat_rejects_unknown_block() {
        let registry = default_registry().unwrap();
        let layers = vec![SuperflatLayer::new("marble", 1)];
        let err = World::superflat(&registry, &layers, 0).err().unwrap();
        assert!(matches!(err, WorldError::UnknownBlock(name) if name == "marble"));
    }

    #[test]
    fn test_superflat_rejects_too_tall() {
        let registry = default_registry().unwrap();
        let layers = vec![SuperflatLayer::new("stone", 200), SuperflatLayer::new("dirt", 100)];
        assert!(matches!(
            World::superflat(&registry, &layers, 0),
            Err(WorldError::TooTall { height: 300 })
        ));
    }

    #[test]
    fn test_set_block_by_world_coordinates() {
        let mut world = World::new(0);
        world.set_block(-1, 10, 17, 4);
        let chunk = world.chunk(ChunkPos::new(-1, 1)).unwrap();
        assert_eq!(chunk.runtime_id(15, 10, 1, 0), 4);
    }

    #[test]
    fn test_light_all_crosses_chunk_borders() {
        let registry = default_registry().unwrap();
        let mut world = World::superflat(&registry, &flat(), 1).unwrap();
        let torch = registry.lookup_by_name("torch").unwrap();
        let stone = registry.lookup_by_name("stone").unwrap();
        // A stone roof over the whole grid, torch just inside the centre's -x edge.
        for x in -16..32 {
            for z in -16..32 {
                world.set_block(x, 8, z, stone);
            }
        }
        world.set_block(0, 4, 8, torch);

        let mut engine = LightEngine::new(LightTables::from_registry(&registry));
        let stats = world.light_all(&mut engine);
        assert!(stats.block_nodes > 0);

        let west = world.chunk(ChunkPos::new(-1, 0)).unwrap();
        assert_eq!(west.block_light(15, 4, 8), 13);
        assert_eq!(west.sky_light(15, 4, 8), 0);
        let centre = world.chunk(ChunkPos::new(0, 0)).unwrap();
        assert_eq!(centre.sky_light(0, 9, 8), 15);
    }

    #[test]
    fn test_spread_skips_edge_chunks() {
        let registry = default_registry().unwrap();
        let mut world = World::superflat(&registry, &flat(), 1).unwrap();
        let mut engine = LightEngine::new(LightTables::from_registry(&registry));
        assert!(world.spread_at(&mut engine, ChunkPos::new(1, 1)).is_none());
        assert_eq!(world.len(), 9);
        assert!(world.spread_at(&mut engine, ChunkPos::new(0, 0)).is_some());
        assert_eq!(world.len(), 9);
    }
}
