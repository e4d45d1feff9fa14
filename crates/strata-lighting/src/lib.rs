//! Block and sky light propagation for chunk columns.
//!
//! A chunk is first filled on its own ([`LightEngine::fill`]), then, once its
//! eight neighbours are filled too, light is spread across the borders
//! ([`LightEngine::spread`]). Both passes run a breadth-first flood over
//! [`LightNode`]s held in pooled [`NodeQueue`]s.

mod engine;
mod fill;
pub mod heightmap;
pub mod node;
mod propagate;
mod spread;
pub mod tables;


pub use engine::{LightEngine, LightStats};
pub use heightmap::Heightmap;
pub use node::{LightNode, NodeQueue, QueuePool};
pub use propagate::LightChannel;
pub use spread::NEIGHBOUR_OFFSETS;
pub use tables::LightTables;
