//! Light propagation confined to a single chunk.
//!
//! Nodes that leave the chunk's x/z range are dropped; light reaching a
//! neighbour is the spread pass's concern.

use strata_voxel::{Chunk, MAX_LIGHT, SUB_CHUNK_COUNT};

use crate::heightmap::Heightmap;
use crate::node::{LightNode, NodeQueue};
use crate::propagate::{LightChannel, ResolveColumn, cell_emission, cell_filter, propagate};
use crate::tables::LightTables;

/// Filter levels that let full sky light into the cell above the block.
const SKY_PASSING_FILTER: std::ops::RangeInclusive<u8> = 1..=13;

/// A grid made of one chunk.
struct SingleChunk<'a>(&'a mut Chunk);

impl ResolveColumn for SingleChunk<'_> {
    fn resolve(&mut self, x: i8, z: i8) -> Option<(&mut Chunk, u8, u8)> {
        let x = u8::try_from(x).ok().filter(|&x| x < 16)?;
        let z = u8::try_from(z).ok().filter(|&z| z < 16)?;
        Some((&mut *self.0, x, z))
    }
}

/// Seeds every emitting cell at its emission level and floods block light.
///
/// Returns the number of nodes visited.
pub(crate) fn block_light_fill(chunk: &mut Chunk, tables: &LightTables, queue: &mut NodeQueue) -> usize {
    for index in 0..SUB_CHUNK_COUNT {
        if chunk.sub(index).is_none() {
            continue;
        }
        let base = (index * 16) as u8;
        for x in 0..16u8 {
            for z in 0..16u8 {
                for dy in 0..16u8 {
                    let y = base + dy;
                    let emission = cell_emission(chunk, tables, x, y, z);
                    if emission > 0 {
                        queue.push_back(LightNode::seed(x as i8, y, z as i8, emission));
                    }
                }
            }
        }
    }
    let seeds = queue.len();
    let visited = propagate(&mut SingleChunk(chunk), tables, LightChannel::Block, queue);
    tracing::trace!(seeds, visited, "block light fill");
    visited
}

/// Lights every column from the sky down to its heightmap, then floods the
/// light sideways and under filtering blocks.
///
/// Expects the chunk's sky light to have been cleared. Returns the number of
/// nodes visited.
pub(crate) fn sky_light_fill(chunk: &mut Chunk, tables: &LightTables, queue: &mut NodeQueue) -> usize {
    let Some(top) = chunk.highest_sub_chunk() else {
        return 0;
    };
    let ceiling = (top * 16 + 15) as u16;
    let heightmap = Heightmap::calculate(chunk, tables);

    for x in 0..16u8 {
        for z in 0..16u8 {
            let start = heightmap.sky_start(x, z);
            for y in start..=ceiling {
                chunk.set_sky_light(x, y as u8, z, MAX_LIGHT);
            }
        }
    }

    for x in 0..16u8 {
        for z in 0..16u8 {
            let start = heightmap.sky_start(x, z);
            let tallest = neighbour_columns(x, z)
                .map(|(nx, nz)| heightmap.sky_start(nx, nz))
                .max()
                .unwrap_or(0)
                .min(ceiling + 1);
            for y in start..tallest {
                queue.push_back(LightNode::seed(x as i8, y as u8, z as i8, MAX_LIGHT));
            }

            // The seed may sit in the implicit band above the top one.
            let height = heightmap.at(x, z);
            if start > 0
                && start <= u16::from(u8::MAX)
                && SKY_PASSING_FILTER.contains(&cell_filter(chunk, tables, x, height, z))
            {
                queue.push_back(LightNode::seed(x as i8, start as u8, z as i8, MAX_LIGHT));
            }
        }
    }

    let seeds = queue.len();
    let visited = propagate(&mut SingleChunk(chunk), tables, LightChannel::Sky, queue);
    tracing::trace!(seeds, visited, "sky light fill");
    visited
}

/// The up to four orthogonal neighbours of column `(x, z)` inside the chunk.
fn neighbour_columns(x: u8, z: u8) -> impl Iterator<Item = (u8, u8)> {
    [(-1i8, 0i8), (1, 0), (0, -1), (0, 1)]
        .into_iter()
        .filter_map(move |(dx, dz)| {
            let nx = x.checked_add_signed(dx).filter(|&v| v < 16)?;
            let nz = z.checked_add_signed(dz).filter(|&v| v < 16)?;
            Some((nx, nz))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIR: u32 = 0;
    const STONE: u32 = 1;
    const TORCH: u32 = 2;
    const LEAVES: u32 = 3;

    fn tables() -> LightTables {
        LightTables::new(AIR, vec![0, 0, 14, 0], vec![0, 15, 0, 1])
            .with_opacity(vec![false, true, false, false])
    }

    fn fill_both(chunk: &mut Chunk) {
        let tables = tables();
        let mut queue = NodeQueue::default();
        chunk.clear_light();
        block_light_fill(chunk, &tables, &mut queue);
        queue.reset();
        sky_light_fill(chunk, &tables, &mut queue);
    }

    fn floor(chunk: &mut Chunk, y: u8) {
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_runtime_id(x, y, z, 0, STONE);
            }
        }
    }

    #[test]
    fn test_neighbour_columns_at_edges() {
        assert_eq!(neighbour_columns(0, 0).count(), 2);
        assert_eq!(neighbour_columns(15, 7).count(), 3);
        assert_eq!(neighbour_columns(5, 5).count(), 4);
    }

    #[test]
    fn test_torch_lights_room() {
        let mut chunk = Chunk::new(AIR);
        floor(&mut chunk, 0);
        floor(&mut chunk, 10);
        chunk.set_runtime_id(8, 1, 8, 0, TORCH);
        fill_both(&mut chunk);
        assert_eq!(chunk.block_light(8, 1, 8), 14);
        assert_eq!(chunk.block_light(8, 2, 8), 13);
        assert_eq!(chunk.block_light(11, 1, 8), 11);
        // Floors absorb.
        assert_eq!(chunk.block_light(8, 0, 8), 0);
        assert_eq!(chunk.block_light(8, 11, 8), 0);
    }

    #[test]
    fn test_sky_stops_at_roof() {
        let mut chunk = Chunk::new(AIR);
        floor(&mut chunk, 10);
        fill_both(&mut chunk);
        assert_eq!(chunk.sky_light(3, 11, 3), 15);
        assert_eq!(chunk.sky_light(3, 15, 3), 15);
        assert_eq!(chunk.sky_light(3, 10, 3), 0);
        assert_eq!(chunk.sky_light(3, 9, 3), 0);
    }

    #[test]
    fn test_sky_leaks_sideways_from_open_column() {
        let mut chunk = Chunk::new(AIR);
        floor(&mut chunk, 10);
        // Hole in the roof at (5, 5).
        chunk.set_runtime_id(5, 10, 5, 0, AIR);
        fill_both(&mut chunk);
        assert_eq!(chunk.sky_light(5, 3, 5), 15);
        assert_eq!(chunk.sky_light(6, 3, 5), 14);
        assert_eq!(chunk.sky_light(8, 3, 5), 12);
    }

    #[test]
    fn test_leaves_let_sky_through() {
        let mut chunk = Chunk::new(AIR);
        floor(&mut chunk, 0);
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_runtime_id(x, 8, z, 0, LEAVES);
            }
        }
        fill_both(&mut chunk);
        assert_eq!(chunk.sky_light(4, 9, 4), 15);
        assert_eq!(chunk.sky_light(4, 8, 4), 13);
        assert_eq!(chunk.sky_light(4, 7, 4), 12);
    }

    #[test]
    fn test_leaves_at_top_of_highest_band() {
        let mut chunk = Chunk::new(AIR);
        floor(&mut chunk, 0);
        for x in 0..16 {
            for z in 0..16 {
                chunk.set_runtime_id(x, 15, z, 0, LEAVES);
            }
        }
        fill_both(&mut chunk);
        assert_eq!(chunk.sky_light(4, 16, 4), 15);
        assert_eq!(chunk.sky_light(4, 15, 4), 13);
        assert_eq!(chunk.sky_light(4, 14, 4), 12);
        assert_eq!(chunk.highest_sub_chunk(), Some(0));
    }

    #[test]
    fn test_empty_chunk_needs_no_sky_work() {
        let mut chunk = Chunk::new(AIR);
        let mut queue = NodeQueue::default();
        assert_eq!(sky_light_fill(&mut chunk, &tables(), &mut queue), 0);
        assert_eq!(chunk.sky_light(0, 100, 0), 15);
    }
}
