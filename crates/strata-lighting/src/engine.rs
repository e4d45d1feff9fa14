//! The light engine: Fill a chunk on its own, then Spread once its
//! neighbours are filled.

use strata_voxel::Chunk;

use crate::fill::{block_light_fill, sky_light_fill};
use crate::node::QueuePool;
use crate::propagate::LightChannel;
use crate::spread::{Neighbourhood, spread_channel};
use crate::tables::LightTables;

/// Nodes visited by one Fill or Spread call, per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightStats {
    pub block_nodes: usize,
    pub sky_nodes: usize,
}

impl LightStats {
    pub fn total(&self) -> usize {
        self.block_nodes + self.sky_nodes
    }
}

/// Computes block and sky light for chunks using injected [`LightTables`].
///
/// Not thread-safe; callers serialise access to the chunks they pass in.
#[derive(Debug)]
pub struct LightEngine {
    tables: LightTables,
    pool: QueuePool,
}

impl LightEngine {
    /// Creates an engine with a default-sized queue pool.
    pub fn new(tables: LightTables) -> Self {
        Self {
            tables,
            pool: QueuePool::default(),
        }
    }

    /// Creates an engine keeping up to `pool_size` idle queues of `capacity`
    /// nodes each.
    pub fn with_pool(tables: LightTables, pool_size: usize, capacity: usize) -> Self {
        Self {
            tables,
            pool: QueuePool::new(pool_size, capacity),
        }
    }

    pub fn tables(&self) -> &LightTables {
        &self.tables
    }

    pub fn pool(&self) -> &QueuePool {
        &self.pool
    }

    /// Changes the order neighbours are visited in. The light computed is the
    /// same for every order; only the amount of work differs.
    pub fn set_visit_order(&mut self, order: [usize; 6]) {
        self.pool.set_visit_order(order);
    }

    /// Recomputes all light of `chunk` from its own blocks, ignoring
    /// neighbours, then drops empty bands from the top.
    pub fn fill(&mut self, chunk: &mut Chunk) -> LightStats {
        chunk.clear_light();
        let mut queue = self.pool.acquire();
        let block_nodes = block_light_fill(chunk, &self.tables, &mut queue);
        queue.reset();
        let sky_nodes = sky_light_fill(chunk, &self.tables, &mut queue);
        self.pool.release(queue);
        chunk.remove_empty_sub_chunks();

        let stats = LightStats {
            block_nodes,
            sky_nodes,
        };
        tracing::debug!(block_nodes, sky_nodes, "light fill");
        stats
    }

    /// Carries light across every border inside the 3×3 group formed by
    /// `chunk` and its eight `neighbours`, then drops empty top bands from
    /// all nine chunks.
    ///
    /// `neighbours` are ordered by offset (-1,-1), (-1,0), (-1,1), (0,-1),
    /// (0,1), (1,-1), (1,0), (1,1). Every chunk must have been filled first.
    pub fn spread(&mut self, chunk: &mut Chunk, neighbours: [&mut Chunk; 8]) -> LightStats {
        let mut hood = Neighbourhood::new(chunk, neighbours);
        let mut queue = self.pool.acquire();
        let block_nodes = spread_channel(&mut hood, &self.tables, LightChannel::Block, &mut queue);
        queue.reset();
        let sky_nodes = spread_channel(&mut hood, &self.tables, LightChannel::Sky, &mut queue);
        self.pool.release(queue);
        hood.remove_empty_sub_chunks();

        let stats = LightStats {
            block_nodes,
            sky_nodes,
        };
        tracing::debug!(block_nodes, sky_nodes, "light spread");
        stats
    }
}
