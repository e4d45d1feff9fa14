//! Per-column height of the highest sky-obstructing block.

use strata_voxel::{CHUNK_AREA, Chunk};

use crate::propagate::cell_obstructs;
use crate::tables::LightTables;

/// Highest obstructing block of each column of a chunk, indexed by
/// `(x << 4) | z`.
///
/// A block obstructs when it is opaque or filters any light. Columns with no
/// such block report height 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heightmap {
    columns: [Option<u8>; CHUNK_AREA],
}

impl Heightmap {
    /// Scans every column of `chunk` downward from the ceiling of its highest
    /// present band. A chunk without bands yields an all-zero heightmap.
    pub fn calculate(chunk: &Chunk, tables: &LightTables) -> Self {
        let mut columns = [None; CHUNK_AREA];
        let Some(top) = chunk.highest_sub_chunk() else {
            return Self { columns };
        };
        let ceiling = (top * 16 + 15) as u8;
        for x in 0..16u8 {
            for z in 0..16u8 {
                columns[column_index(x, z)] =
                    (0..=ceiling).rev().find(|&y| cell_obstructs(chunk, tables, x, y, z));
            }
        }
        Self { columns }
    }

    /// Height of column `(x, z)`.
    pub fn at(&self, x: u8, z: u8) -> u8 {
        self.columns[column_index(x, z)].unwrap_or(0)
    }

    /// Lowest Y of column `(x, z)` that sees the sky directly. May be 256 when
    /// the top cell of the world obstructs.
    pub fn sky_start(&self, x: u8, z: u8) -> u16 {
        self.columns[column_index(x, z)].map_or(0, |h| u16::from(h) + 1)
    }
}

fn column_index(x: u8, z: u8) -> usize {
    (usize::from(x & 15) << 4) | usize::from(z & 15)
}
