//! # Lighting Engine
//!
//! Computes a light level (0..=15) for every block from the sun and from point
//! lights, and converts levels into brightness factors for vertex colors.
//!
//! ## Sun
//!
//! At night (sun direction Y below `night_elevation`) the sun contributes the
//! configured night floor. By day a ray is stepped from the block centre
//! towards the sun; the first opaque block it meets casts a shadow that is
//! darker the closer the occluder is. An unblocked ray receives the full,
//! time-of-day scaled sun level.
//!
//! ## Point Lights
//!
//! A point light of intensity `I` at distance `d` contributes
//! `max(0, I - floor(d))` unless an opaque block lies on the segment between
//! the sample and the light, sampled twice per unit of distance.
//!
//! ## Combination
//!
//! A block's level is the maximum of the sun contribution, every point light
//! contribution, and its own emission, capped at 15.

use cgmath::{InnerSpace, Point3};

use crate::{
    config::{LightingConfig, MAX_LIGHT_LEVEL},
    engine_state::voxels::{
        block::block_type::BlockType,
        chunk::{Chunk, CHUNK_SIZE},
    },
};

pub mod light_source;
pub mod sun;

pub use light_source::{LightKind, LightRegistry, LightSource};
pub use sun::{SunState, TimeOfDay};

/// Read access to blocks by world coordinate.
///
/// Implementations return [`BlockType::AIR`] for any coordinate they hold no
/// data for.
pub trait BlockSource {
    /// The block at a world coordinate, or air if unknown.
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType;
}

/// Share of the gap between the sun level and the night floor that a shadow
/// keeps when its occluder sits at the far end of the ray.
const SHADOW_SOFTNESS: f32 = 0.6;

/// Point-light occlusion samples per unit of distance.
const OCCLUSION_SAMPLES_PER_UNIT: f32 = 2.0;

#[inline]
fn cell_of(point: Point3<f32>) -> Point3<i32> {
    Point3::new(
        point.x.floor() as i32,
        point.y.floor() as i32,
        point.z.floor() as i32,
    )
}

#[inline]
fn is_opaque_at<B: BlockSource + ?Sized>(blocks: &B, cell: Point3<i32>) -> bool {
    blocks.block_at(cell.x, cell.y, cell.z).is_opaque()
}

/// Stateless light computations parameterised by a [`LightingConfig`].
#[derive(Clone, Debug)]
pub struct LightingEngine {
    config: LightingConfig,
}

impl LightingEngine {
    /// Creates an engine for an already validated config.
    pub fn new(config: LightingConfig) -> Self {
        LightingEngine { config }
    }

    /// The lighting parameters in use.
    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    /// Brightness factor `base^((15 - level) / 15)`; 1.0 at level 15 and
    /// strictly positive below it.
    pub fn brightness(&self, level: u8) -> f32 {
        let max = MAX_LIGHT_LEVEL as f32;
        let level = level.min(MAX_LIGHT_LEVEL) as f32;
        self.config.brightness_base.powf((max - level) / max)
    }

    /// `true` while the sun is below the configured night elevation.
    pub fn is_night(&self, sun: &SunState) -> bool {
        sun.direction.y < self.config.night_elevation
    }

    /// Unshadowed sun level: the night floor at night, otherwise the floor
    /// raised towards the configured intensity by the sun's current strength.
    pub fn sun_level(&self, sun: &SunState) -> u8 {
        let floor = self.config.night_floor;
        if self.is_night(sun) {
            return floor;
        }
        let gap = self.config.sun_intensity.saturating_sub(floor) as f32;
        floor + (gap * sun.intensity.clamp(0.0, 1.0)).round() as u8
    }

    /// The sun's contribution at a world-space sample point.
    pub fn sun_contribution<B: BlockSource + ?Sized>(
        &self,
        sample: Point3<f32>,
        sun: &SunState,
        blocks: &B,
    ) -> u8 {
        if !self.config.shadows_enabled {
            return self.config.sun_intensity;
        }
        let floor = self.config.night_floor;
        if self.is_night(sun) {
            return floor;
        }

        let level = self.sun_level(sun);
        let max_distance = self.config.shadow_max_distance;
        let step_length = max_distance / self.config.shadow_ray_steps as f32;
        let origin_cell = cell_of(sample);
        for step in 1..=self.config.shadow_ray_steps {
            let distance = step as f32 * step_length;
            let cell = cell_of(sample + sun.direction * distance);
            if cell == origin_cell {
                continue;
            }
            if is_opaque_at(blocks, cell) {
                let gap = level.saturating_sub(floor) as f32;
                let lit = gap * SHADOW_SOFTNESS * (distance / max_distance);
                return floor + lit.floor() as u8;
            }
        }
        level
    }

    /// A point light's contribution at a world-space sample point.
    pub fn point_contribution<B: BlockSource + ?Sized>(
        &self,
        sample: Point3<f32>,
        light: &LightSource,
        blocks: &B,
    ) -> u8 {
        let delta = light.position - sample;
        let distance = delta.magnitude();
        let raw = light.intensity.min(MAX_LIGHT_LEVEL) as i32 - distance.floor() as i32;
        if raw <= 0 {
            return 0;
        }

        let samples = (distance * OCCLUSION_SAMPLES_PER_UNIT).ceil() as u32;
        let from = cell_of(sample);
        let to = cell_of(light.position);
        for step in 1..samples {
            let cell = cell_of(sample + delta * (step as f32 / samples as f32));
            if cell == from || cell == to {
                continue;
            }
            if is_opaque_at(blocks, cell) {
                return 0;
            }
        }
        raw as u8
    }

    /// Light level at a world-space point from the sun and every point light.
    pub fn light_level<B: BlockSource + ?Sized>(
        &self,
        sample: Point3<f32>,
        sun: &SunState,
        lights: &LightRegistry,
        blocks: &B,
    ) -> u8 {
        lights
            .iter()
            .filter(|light| light.kind == LightKind::Point)
            .map(|light| self.point_contribution(sample, light, blocks))
            .fold(self.sun_contribution(sample, sun, blocks), u8::max)
            .min(MAX_LIGHT_LEVEL)
    }

    /// Light level of the block at world coordinates, sampled at its centre
    /// and raised to the block's own emission.
    pub fn block_light<B: BlockSource + ?Sized>(
        &self,
        x: i32,
        y: i32,
        z: i32,
        sun: &SunState,
        lights: &LightRegistry,
        blocks: &B,
    ) -> u8 {
        let sample = Point3::new(x as f32 + 0.5, y as f32 + 0.5, z as f32 + 0.5);
        let emission = blocks.block_at(x, y, z).light_emission();
        self.light_level(sample, sun, lights, blocks)
            .max(emission)
            .min(MAX_LIGHT_LEVEL)
    }

    /// Computes the light buffer of the chunk whose (0, 0, 0) cell sits at
    /// world coordinates `origin`.
    pub fn compute_chunk_light<B: BlockSource + ?Sized>(
        &self,
        origin: Point3<i32>,
        sun: &SunState,
        lights: &LightRegistry,
        blocks: &B,
    ) -> Vec<u8> {
        (0..CHUNK_SIZE as usize)
            .map(|index| {
                let local = Chunk::position_of_index(index);
                self.block_light(
                    origin.x + local.x,
                    origin.y + local.y,
                    origin.z + local.z,
                    sun,
                    lights,
                    blocks,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::Vector3;

    use super::*;

    /// Stone wherever `y == layer`, air elsewhere.
    struct Slab {
        layer: i32,
    }

    impl BlockSource for Slab {
        fn block_at(&self, _x: i32, y: i32, _z: i32) -> BlockType {
            if y == self.layer {
                BlockType::STONE
            } else {
                BlockType::AIR
            }
        }
    }

    /// A single wall perpendicular to X at `x == plane`.
    struct Wall {
        plane: i32,
        block: BlockType,
    }

    impl BlockSource for Wall {
        fn block_at(&self, x: i32, _y: i32, _z: i32) -> BlockType {
            if x == self.plane {
                self.block
            } else {
                BlockType::AIR
            }
        }
    }

    struct Void;

    impl BlockSource for Void {
        fn block_at(&self, _x: i32, _y: i32, _z: i32) -> BlockType {
            BlockType::AIR
        }
    }

    fn engine() -> LightingEngine {
        LightingEngine::new(LightingConfig::default())
    }

    fn sample() -> Point3<f32> {
        Point3::new(0.5, 0.5, 0.5)
    }

    #[test]
    fn brightness_is_monotonic_and_bounded() {
        let engine = engine();
        assert_relative_eq!(engine.brightness(15), 1.0);
        let mut previous = 0.0;
        for level in 0..=15 {
            let b = engine.brightness(level);
            assert!(b > 0.0 && b <= 1.0);
            assert!(b >= previous);
            previous = b;
        }
        assert_relative_eq!(engine.brightness(0), 0.8);
        assert_relative_eq!(engine.brightness(200), 1.0);
    }

    #[test]
    fn midnight_sun_gives_the_night_floor() {
        let engine = engine();
        let midnight = TimeOfDay::new(0.0, 1440.0).sun();
        assert!(engine.is_night(&midnight));
        let level = engine.sun_contribution(sample(), &midnight, &Void);
        assert_eq!(level, engine.config().night_floor);
        assert_ne!(level, 0);
        assert_ne!(level, engine.config().sun_intensity);
    }

    #[test]
    fn open_sky_at_noon_is_fully_lit() {
        let engine = engine();
        let noon = TimeOfDay::new(12.0, 1440.0).sun();
        assert_eq!(engine.sun_contribution(sample(), &noon, &Void), 15);
    }

    #[test]
    fn closer_occluders_cast_darker_shadows() {
        let engine = engine();
        let noon = TimeOfDay::new(12.0, 1440.0).sun();
        let near = engine.sun_contribution(sample(), &noon, &Slab { layer: 2 });
        let far = engine.sun_contribution(sample(), &noon, &Slab { layer: 12 });
        assert!(near < far, "near {near} far {far}");
        assert!(far < 15);
        assert!(near >= engine.config().night_floor);
    }

    #[test]
    fn shadows_disabled_gives_constant_sun() {
        let engine = LightingEngine::new(LightingConfig {
            shadows_enabled: false,
            ..Default::default()
        });
        let noon = TimeOfDay::new(12.0, 1440.0).sun();
        assert_eq!(engine.sun_contribution(sample(), &noon, &Slab { layer: 2 }), 15);
    }

    #[test]
    fn point_light_falls_off_with_distance() {
        let engine = engine();
        let light = LightSource::point("lamp", Point3::new(0.5, 0.5, 0.5), 12);
        let mut previous = u8::MAX;
        for step in 0..30 {
            let at = Point3::new(0.5 + step as f32 * 0.7, 0.5, 0.5);
            let level = engine.point_contribution(at, &light, &Void);
            assert!(level <= previous);
            previous = level;
        }
        assert_eq!(previous, 0);
        assert_eq!(engine.point_contribution(sample(), &light, &Void), 12);
    }

    #[test]
    fn occluded_point_light_contributes_nothing() {
        let engine = engine();
        let light = LightSource::point("lamp", Point3::new(6.5, 0.5, 0.5), 15);
        let stone = Wall {
            plane: 3,
            block: BlockType::STONE,
        };
        assert_eq!(engine.point_contribution(sample(), &light, &stone), 0);

        let water = Wall {
            plane: 3,
            block: BlockType::WATER,
        };
        assert_eq!(engine.point_contribution(sample(), &light, &water), 9);
    }

    #[test]
    fn levels_combine_by_maximum() {
        let engine = engine();
        let midnight = TimeOfDay::new(0.0, 1440.0).sun();
        let mut lights = LightRegistry::new();
        lights.insert(LightSource::point("lamp", Point3::new(2.5, 0.5, 0.5), 13));
        assert_eq!(engine.light_level(sample(), &midnight, &lights, &Void), 11);

        lights.remove("lamp");
        assert_eq!(engine.light_level(sample(), &midnight, &lights, &Void), 4);
    }

    #[test]
    fn emissive_blocks_light_themselves() {
        let engine = engine();
        let midnight = TimeOfDay::new(0.0, 1440.0).sun();
        let mut chunk = Chunk::empty(Point3::new(0, 0, 0));
        chunk.set(1, 1, 1, BlockType::GLOWSTONE);
        let lights = LightRegistry::new();
        let light = engine.compute_chunk_light(chunk.origin(), &midnight, &lights, &chunk);
        assert_eq!(light.len(), CHUNK_SIZE as usize);
        assert_eq!(light[Chunk::index(1, 1, 1).unwrap()], 14);
        assert_eq!(light[0], 4);
    }

    #[test]
    fn night_threshold_follows_config() {
        let engine = engine();
        let low_sun = SunState {
            direction: Vector3::new(1.0, -0.05, 0.0).normalize(),
            color: [1.0, 0.5, 0.3],
            intensity: 0.0,
        };
        assert!(!engine.is_night(&low_sun));
        assert_eq!(engine.sun_level(&low_sun), 4);
    }
}
