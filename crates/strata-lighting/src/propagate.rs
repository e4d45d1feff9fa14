//! The BFS step shared by fill and spread.
//!
//! Nodes carry the level of the cell they come from. The destination cell
//! absorbs `filter + 1` levels; if nothing is left the node dies there. A cell
//! is only written when the new level beats what it already holds, so the
//! result is the same fixed point whatever order nodes are visited in.

use strata_voxel::Chunk;

use crate::node::NodeQueue;
use crate::tables::LightTables;

/// Which of the two independent light channels a pass works on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightChannel {
    Block,
    Sky,
}

impl LightChannel {
    pub fn get(self, chunk: &Chunk, x: u8, y: u8, z: u8) -> u8 {
        match self {
            LightChannel::Block => chunk.block_light(x, y, z),
            LightChannel::Sky => chunk.sky_light(x, y, z),
        }
    }

    pub fn set(self, chunk: &mut Chunk, x: u8, y: u8, z: u8, level: u8) {
        match self {
            LightChannel::Block => chunk.set_block_light(x, y, z, level),
            LightChannel::Sky => chunk.set_sky_light(x, y, z, level),
        }
    }
}

/// Maps a node's chunk-relative column to the chunk that holds it.
pub(crate) trait ResolveColumn {
    /// Returns the chunk owning column `(x, z)` and the column's local
    /// coordinates, or `None` if the column lies outside the lit area.
    fn resolve(&mut self, x: i8, z: i8) -> Option<(&mut Chunk, u8, u8)>;
}

/// Highest filter level among the layers at `(x, y, z)`.
pub(crate) fn cell_filter(chunk: &Chunk, tables: &LightTables, x: u8, y: u8, z: u8) -> u8 {
    chunk.sub(usize::from(y >> 4)).map_or(0, |sub| {
        sub.layers()
            .iter()
            .map(|storage| tables.filter(storage.runtime_id(x, y & 15, z)))
            .max()
            .unwrap_or(0)
    })
}

/// Highest emission level among the layers at `(x, y, z)`.
pub(crate) fn cell_emission(chunk: &Chunk, tables: &LightTables, x: u8, y: u8, z: u8) -> u8 {
    chunk.sub(usize::from(y >> 4)).map_or(0, |sub| {
        sub.layers()
            .iter()
            .map(|storage| tables.emission(storage.runtime_id(x, y & 15, z)))
            .max()
            .unwrap_or(0)
    })
}

/// Whether any layer at `(x, y, z)` stops direct sky light.
pub(crate) fn cell_obstructs(chunk: &Chunk, tables: &LightTables, x: u8, y: u8, z: u8) -> bool {
    chunk.sub(usize::from(y >> 4)).is_some_and(|sub| {
        sub.layers()
            .iter()
            .any(|storage| tables.obstructs(storage.runtime_id(x, y & 15, z)))
    })
}

/// Drains `queue`, spreading `channel` light through `grid`.
///
/// Returns the number of nodes popped.
pub(crate) fn propagate<G: ResolveColumn>(
    grid: &mut G,
    tables: &LightTables,
    channel: LightChannel,
    queue: &mut NodeQueue,
) -> usize {
    let mut visited = 0;
    while let Some(node) = queue.pop_front() {
        visited += 1;
        let Some((chunk, x, z)) = grid.resolve(node.x, node.z) else {
            continue;
        };
        let stored = channel.get(chunk, x, node.y, z);

        let level = if node.first {
            if node.level > stored {
                channel.set(chunk, x, node.y, z, node.level);
            }
            node.level.max(stored)
        } else {
            let cost = cell_filter(chunk, tables, x, node.y, z) + 1;
            if cost >= node.level {
                continue;
            }
            let level = node.level - cost;
            if stored >= level {
                continue;
            }
            channel.set(chunk, x, node.y, z, level);
            level
        };

        // A level-1 cell cannot light anything.
        if level > 1 {
            queue.push_neighbours(node.x, node.y, node.z, level);
        }
    }
    visited
}
