//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Chunk storage and lighting host")]
pub struct CliArgs {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Chunks generated around the origin in each direction.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Idle light queues kept for reuse.
    #[arg(long)]
    pub queue_pool_size: Option<usize>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(radius) = args.radius {
            self.world.neighbourhood_radius = radius;
        }
        if let Some(size) = args.queue_pool_size {
            self.lighting.queue_pool_size = size;
        }
    }
}
