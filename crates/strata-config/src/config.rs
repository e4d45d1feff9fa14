//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Light engine settings.
    pub lighting: LightingConfig,
    /// Demo world settings.
    pub world: WorldConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Light engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Idle node queues kept between Fill/Spread calls.
    pub queue_pool_size: usize,
    /// Nodes reserved by each newly allocated queue.
    pub initial_queue_capacity: usize,
}

/// One horizontal slab of a superflat world, listed bottom-up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuperflatLayer {
    /// Registered block name.
    pub block: String,
    /// Thickness in blocks.
    pub thickness: u8,
}

impl SuperflatLayer {
    pub fn new(block: &str, thickness: u8) -> Self {
        Self {
            block: block.to_string(),
            thickness,
        }
    }
}

/// Demo world configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunks generated around the origin in each direction. The light
    /// engine only ever looks one chunk out, so 1 covers a full spread.
    pub neighbourhood_radius: u32,
    /// Superflat layers from the bottom of the world up.
    pub superflat_layers: Vec<SuperflatLayer>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to a file in debug builds.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            queue_pool_size: 4,
            initial_queue_capacity: 4096,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            neighbourhood_radius: 1,
            superflat_layers: vec![
                SuperflatLayer::new("bedrock", 1),
                SuperflatLayer::new("dirt", 3),
                SuperflatLayer::new("grass", 1),
            ],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .map_err(|source| ConfigError::read(&config_path, source))?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::write(config_dir, source))?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized)
            .map_err(|source| ConfigError::write(&config_path, source))?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path)
            .map_err(|source| ConfigError::read(&config_path, source))?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        assert!(ron_str.contains("queue_pool_size: 4"));
        assert!(ron_str.contains("\"bedrock\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `world` section entirely
        let ron_str = "(lighting: (queue_pool_size: 9), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.world, WorldConfig::default());
        assert_eq!(config.lighting.queue_pool_size, 9);
        assert_eq!(config.lighting.initial_queue_capacity, 4096);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_custom_superflat_layers() {
        let ron_str = r#"(world: (superflat_layers: [(block: "stone", thickness: 60)]))"#;
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(
            config.world.superflat_layers,
            vec![SuperflatLayer::new("stone", 60)]
        );
        assert_eq!(config.world.neighbourhood_radius, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.lighting.queue_pool_size = 16;
        config.world.neighbourhood_radius = 3;
        config.debug.log_level = "trace".to_string();

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.lighting.initial_queue_capacity = 128;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().lighting.initial_queue_capacity, 128);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_reload_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("config.ron"));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_ron_comments_preserved() {
        let ron_str = "// This is a comment\n(\n  // Another comment\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
