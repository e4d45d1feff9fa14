//! Cross-chunk light propagation over a 3×3 neighbourhood.
//!
//! Nodes are addressed relative to the centre chunk. A node whose x or z
//! leaves `0..16` is redirected to one of the eight neighbours by quadrant:
//! each axis falls below, inside or above the centre, giving a 3×3 grid whose
//! middle cell is the centre itself. Nodes stepping off the outer edge of the
//! 48×48 area are dropped.

use strata_voxel::{CHUNK_HEIGHT, Chunk};

use crate::node::{LightNode, NodeQueue};
use crate::propagate::{LightChannel, ResolveColumn, propagate};
use crate::tables::LightTables;

/// Offsets of the eight neighbours, in the order callers must pass them.
pub const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Centre-relative x/z covered by the neighbourhood.
const AREA: std::ops::Range<i8> = -16..32;

/// Centre-relative x (or z) of the columns on either side of the two
/// internal borders along that axis.
const BORDER_COLUMNS: [i8; 4] = [-1, 0, 15, 16];

/// A centre chunk and its eight neighbours in [`NEIGHBOUR_OFFSETS`] order.
pub(crate) struct Neighbourhood<'a> {
    centre: &'a mut Chunk,
    neighbours: [&'a mut Chunk; 8],
}

impl<'a> Neighbourhood<'a> {
    pub(crate) fn new(centre: &'a mut Chunk, neighbours: [&'a mut Chunk; 8]) -> Self {
        Self { centre, neighbours }
    }

    /// Removes empty top bands from all nine chunks.
    pub(crate) fn remove_empty_sub_chunks(&mut self) {
        self.centre.remove_empty_sub_chunks();
        for neighbour in &mut self.neighbours {
            neighbour.remove_empty_sub_chunks();
        }
    }
}

impl ResolveColumn for Neighbourhood<'_> {
    fn resolve(&mut self, x: i8, z: i8) -> Option<(&mut Chunk, u8, u8)> {
        if !AREA.contains(&x) || !AREA.contains(&z) {
            // One step past the edge; anything further is left to the assert.
            if (-17..=32).contains(&x) && (-17..=32).contains(&z) {
                return None;
            }
        }
        let chunk = match neighbour_index(x, z) {
            Some(index) => &mut *self.neighbours[index],
            None => &mut *self.centre,
        };
        Some((chunk, x.rem_euclid(16) as u8, z.rem_euclid(16) as u8))
    }
}

/// Position in [`NEIGHBOUR_OFFSETS`] of the chunk holding centre-relative
/// column `(x, z)`, or `None` for the centre.
///
/// # Panics
///
/// Panics if either coordinate lies outside `-16..32`. Propagation never
/// travels further than one chunk from the centre, so such a node means the
/// BFS state is corrupt.
pub(crate) fn neighbour_index(x: i8, z: i8) -> Option<usize> {
    assert!(
        AREA.contains(&x) && AREA.contains(&z),
        "light node at ({x}, {z}) is outside the 3x3 neighbourhood"
    );
    let quadrant = |v: i8| match v {
        ..0 => 0,
        0..16 => 1,
        _ => 2,
    };
    match quadrant(x) * 3 + quadrant(z) {
        4 => None,
        index if index > 4 => Some(index - 1),
        index => Some(index),
    }
}

/// Seeds `queue` with every lit cell on both sides of each internal border
/// of the neighbourhood, then propagates `channel`.
///
/// Each chunk already holds its own filled light, so light can only be
/// missing where it has to cross a border. That includes the borders between
/// two neighbours, which light from a diagonal neighbour crosses on its way
/// to the centre.
///
/// Returns the number of nodes visited.
pub(crate) fn spread_channel(
    hood: &mut Neighbourhood<'_>,
    tables: &LightTables,
    channel: LightChannel,
    queue: &mut NodeQueue,
) -> usize {
    for y in 0..CHUNK_HEIGHT {
        let y = y as u8;
        for border in BORDER_COLUMNS {
            for along in AREA {
                seed(hood, channel, queue, border, y, along);
                // Crossing columns are already seeded by the x borders.
                if !BORDER_COLUMNS.contains(&along) {
                    seed(hood, channel, queue, along, y, border);
                }
            }
        }
    }
    let seeds = queue.len();
    let visited = propagate(hood, tables, channel, queue);
    tracing::trace!(?channel, seeds, visited, "light spread");
    visited
}

fn seed(
    hood: &mut Neighbourhood<'_>,
    channel: LightChannel,
    queue: &mut NodeQueue,
    x: i8,
    y: u8,
    z: i8,
) {
    let Some((chunk, lx, lz)) = hood.resolve(x, z) else {
        return;
    };
    let level = channel.get(chunk, lx, y, lz);
    if level > 1 {
        queue.push_back(LightNode::seed(x, y, z, level));
    }
}
