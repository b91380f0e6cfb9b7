//! # Configuration
//!
//! Plain-value configuration for world generation, chunk streaming and
//! lighting. Every field has a documented default, and a configuration is
//! validated once, before any worker is spawned, so that misconfiguration
//! surfaces at startup instead of as load/unload thrashing at runtime.
//!
//! ## Usage
//! ```rust
//! use voxel_world::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "render_distance": 2, "unload_distance": 4 }"#)
//!     .unwrap();
//! assert_eq!(config.world.seed, 12345);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{engine_state::rendering::meshing::MeshingStrategy, error::ConfigError};

/// The highest light level a block can hold.
pub const MAX_LIGHT_LEVEL: u8 = 15;

/// Parameters of the deterministic terrain generator.
///
/// Changing these never touches chunks that already exist; only chunks
/// generated afterwards see the new values.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Seed for the noise permutation table. Fully determines the terrain.
    pub seed: u32,
    /// Height of the water surface in world units.
    pub sea_level: f64,
    /// Horizontal noise frequency. Smaller values give broader hills.
    pub terrain_scale: f64,
    /// Height amplitude of the terrain around the sea level.
    pub terrain_height: f64,
    /// World-space Y of the bedrock plane.
    pub floor_y: i32,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            sea_level: 5.0,
            terrain_scale: 0.05,
            terrain_height: 10.0,
            floor_y: 0,
        }
    }
}

/// Parameters of the lighting engine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// When false the sun contributes its full intensity everywhere (daytime).
    pub shadows_enabled: bool,
    /// Sun light level at noon.
    pub sun_intensity: u8,
    /// Ambient level the sun contributes at night.
    pub night_floor: u8,
    /// Number of discrete samples along a shadow ray.
    pub shadow_ray_steps: u32,
    /// Length of a shadow ray in world units.
    pub shadow_max_distance: f32,
    /// Base of the exponential light-level to brightness curve.
    pub brightness_base: f32,
    /// Sun direction Y component below which it counts as night.
    pub night_elevation: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            shadows_enabled: true,
            sun_intensity: MAX_LIGHT_LEVEL,
            night_floor: 4,
            shadow_ray_steps: 40,
            shadow_max_distance: 20.0,
            brightness_base: 0.8,
            night_elevation: -0.1,
        }
    }
}

impl LightingConfig {
    /// Checks light levels, the shadow ray shape and the brightness curve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sun_intensity > MAX_LIGHT_LEVEL {
            return Err(ConfigError::InvalidLightLevel {
                name: "sun_intensity",
                value: self.sun_intensity,
            });
        }
        if self.night_floor > MAX_LIGHT_LEVEL {
            return Err(ConfigError::InvalidLightLevel {
                name: "night_floor",
                value: self.night_floor,
            });
        }
        if self.night_floor > self.sun_intensity {
            return Err(ConfigError::NightFloorAboveSun {
                night_floor: self.night_floor,
                sun_intensity: self.sun_intensity,
            });
        }
        if self.shadow_ray_steps == 0 || self.shadow_max_distance <= 0.0 {
            return Err(ConfigError::InvalidShadowRay {
                steps: self.shadow_ray_steps,
                distance: self.shadow_max_distance,
            });
        }
        if !(self.brightness_base > 0.0 && self.brightness_base < 1.0) {
            return Err(ConfigError::InvalidBrightnessBase(self.brightness_base));
        }
        Ok(())
    }
}

/// Top-level configuration for the chunk subsystem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Terrain generation parameters.
    pub world: WorldGenConfig,
    /// Chebyshev distance, in chunks, within which chunks are loaded.
    pub render_distance: i32,
    /// Chebyshev distance, in chunks, beyond which resident chunks are evicted.
    /// Must exceed `render_distance`; the band between them is the hysteresis zone.
    pub unload_distance: i32,
    /// Number of generation workers. `0` picks the available hardware parallelism.
    pub worker_count: usize,
    /// Lowest chunk Y ever loaded.
    pub min_chunk_y: i32,
    /// Highest chunk Y ever loaded.
    pub max_chunk_y: i32,
    /// Which surface extraction algorithm builds chunk meshes.
    pub meshing: MeshingStrategy,
    /// Lighting engine parameters.
    pub lighting: LightingConfig,
    /// Real seconds for one full day cycle.
    pub day_length_seconds: f32,
    /// Time of day, in hours, when the engine starts.
    pub start_hour: f32,
    /// Radius, in blocks, of the spiral spawn-point search.
    pub spawn_search_radius: i32,
    /// Spawn height used when the search finds no candidate column.
    pub safe_spawn_height: f32,
    /// Sun direction change, in radians, that triggers a full relight.
    pub relight_angle_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world: WorldGenConfig::default(),
            render_distance: 3,
            unload_distance: 5,
            worker_count: 0,
            min_chunk_y: 0,
            max_chunk_y: 2,
            meshing: MeshingStrategy::Greedy,
            lighting: LightingConfig::default(),
            day_length_seconds: 1440.0,
            start_hour: 10.0,
            spawn_search_radius: 64,
            safe_spawn_height: 64.0,
            relight_angle_threshold: 0.05,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON document and validates the result. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_json_str(&json)
    }

    /// Rejects configurations that would thrash or break the lighting curve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render_distance < 0 || self.render_distance >= self.unload_distance {
            return Err(ConfigError::InvalidRenderDistance {
                render: self.render_distance,
                unload: self.unload_distance,
            });
        }
        if self.min_chunk_y > self.max_chunk_y {
            return Err(ConfigError::InvalidVerticalRange {
                min: self.min_chunk_y,
                max: self.max_chunk_y,
            });
        }
        if self.day_length_seconds <= 0.0 {
            return Err(ConfigError::InvalidDayLength(self.day_length_seconds));
        }
        self.lighting.validate()
    }

    /// The worker count after resolving `0` to the hardware parallelism.
    pub fn resolved_worker_count(&self) -> usize {
        if self.worker_count > 0 {
            return self.worker_count;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn render_distance_must_be_below_unload_distance() {
        let config = EngineConfig {
            render_distance: 4,
            unload_distance: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRenderDistance { render: 4, unload: 4 })
        ));
    }

    #[test]
    fn brightness_base_must_be_in_open_unit_interval() {
        let mut config = EngineConfig::default();
        config.lighting.brightness_base = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBrightnessBase(_))
        ));
    }

    #[test]
    fn night_floor_cannot_exceed_sun() {
        let mut config = EngineConfig::default();
        config.lighting.sun_intensity = 3;
        config.lighting.night_floor = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NightFloorAboveSun { .. })
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "world": { "seed": 7 }, "meshing": "Culled", "worker_count": 2 }"#,
        )
        .unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.sea_level, 5.0);
        assert_eq!(config.meshing, MeshingStrategy::Culled);
        assert_eq!(config.resolved_worker_count(), 2);
    }

    #[test]
    fn invalid_json_config_is_rejected_at_load() {
        let json = r#"{ "render_distance": 9, "unload_distance": 2 }"#;
        let result = EngineConfig::from_json_str(json);
        assert!(result.is_err());
        assert!(EngineConfig::from_json_str("{ not json").is_err());
    }
}
