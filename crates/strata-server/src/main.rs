mod world;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use strata_config::{CliArgs, Config};
use strata_lighting::{LightEngine, LightTables};
use strata_voxel::{BlockRegistry, decode_chunk, encode_chunk};
use thiserror::Error;
use tracing::{error, info, warn};

use world::{ChunkPos, World, WorldError, default_registry};

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Decode(#[from] strata_voxel::DecodeError),
    #[error("origin chunk is not loaded")]
    MissingOrigin,
    #[error("origin chunk changed across an encode/decode round trip")]
    RoundTripMismatch,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), RunError> {
    let registry = default_registry().map_err(WorldError::from)?;
    let tables = LightTables::from_registry(&registry);
    let mut engine = LightEngine::with_pool(
        tables,
        config.lighting.queue_pool_size,
        config.lighting.initial_queue_capacity,
    );

    let radius = config.world.neighbourhood_radius;
    let mut world = World::superflat(&registry, &config.world.superflat_layers, radius)?;
    if radius == 0 {
        warn!("neighbourhood radius 0 leaves no chunk with a full neighbourhood; spread is skipped");
    }
    let surface = config
        .world
        .superflat_layers
        .iter()
        .map(|l| i32::from(l.thickness))
        .sum::<i32>();
    place_features(&mut world, &registry, surface)?;
    info!(chunks = world.len(), surface, "world generated");

    let stats = world.light_all(&mut engine);
    info!(
        block_nodes = stats.block_nodes,
        sky_nodes = stats.sky_nodes,
        pooled_queues = engine.pool().free_count(),
        "world lit"
    );

    let origin = world
        .chunk_mut(ChunkPos::new(0, 0))
        .ok_or(RunError::MissingOrigin)?;
    origin.compact();
    let encoded = encode_chunk(origin);
    let bands = encoded.sub_chunks.iter().flatten().count();
    let bytes: usize = encoded.sub_chunks.iter().flatten().map(Vec::len).sum();
    let decoded = decode_chunk(registry.air(), &encoded)?;
    // Light is not part of the encoding, so compare blocks only.
    for y in 0..=255u8 {
        for x in 0..16 {
            for z in 0..16 {
                if decoded.runtime_id(x, y, z, 0) != origin.runtime_id(x, y, z, 0) {
                    return Err(RunError::RoundTripMismatch);
                }
            }
        }
    }
    info!(bands, bytes, "origin chunk encoded");
    Ok(())
}

/// A torch, a leaf canopy and a pond around the origin, sitting on the
/// superflat surface at height `surface`.
fn place_features(world: &mut World, registry: &BlockRegistry, surface: i32) -> Result<(), WorldError> {
    let lookup = |name: &str| {
        registry
            .lookup_by_name(name)
            .ok_or_else(|| WorldError::UnknownBlock(name.to_string()))
    };
    let torch = lookup("torch")?;
    let leaves = lookup("leaves")?;
    let water = lookup("water")?;
    let glowstone = lookup("glowstone")?;

    let Ok(base) = u8::try_from(surface) else {
        return Ok(());
    };
    if base > 240 {
        return Ok(());
    }

    world.set_block(0, base, 0, torch);
    for x in 4..9 {
        for z in -2..3 {
            world.set_block(x, base + 5, z, leaves);
        }
    }
    if base > 0 {
        for x in -8..-3 {
            for z in 6..10 {
                world.set_block(x, base - 1, z, water);
            }
        }
    }
    world.set_block(15, base, 15, glowstone);
    Ok(())
}
