//! Light sources and the point-light registry.

use std::collections::HashMap;

use cgmath::Point3;
use log::warn;

use crate::config::MAX_LIGHT_LEVEL;

/// Whether a source shines from infinitely far away or from a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LightKind {
    /// The sun. Its direction comes from the time of day.
    Directional,
    /// Shines from a world position, falling off with distance.
    Point,
}

/// A light in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    /// Registry key. Inserting a light with an existing id replaces it.
    pub id: String,
    /// World position. Ignored for directional sources.
    pub position: Point3<f32>,
    /// Light level at the source, 0..=15.
    pub intensity: u8,
    /// Tint, if any. Lighting only uses the level.
    pub color: Option<[f32; 3]>,
    /// Directional or point.
    pub kind: LightKind,
}

impl LightSource {
    /// A point light with its intensity clamped to 15.
    pub fn point(id: impl Into<String>, position: Point3<f32>, intensity: u8) -> Self {
        LightSource {
            id: id.into(),
            position,
            intensity: intensity.min(MAX_LIGHT_LEVEL),
            color: None,
            kind: LightKind::Point,
        }
    }

    /// Sets the tint.
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = Some(color);
        self
    }
}

/// Point lights keyed by id.
#[derive(Clone, Debug, Default)]
pub struct LightRegistry {
    points: HashMap<String, LightSource>,
}

impl LightRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a point light, returning the light it replaced.
    ///
    /// Directional sources are refused: the sun is owned by the time of day.
    pub fn insert(&mut self, mut source: LightSource) -> Option<LightSource> {
        if source.kind == LightKind::Directional {
            warn!(
                "Ignoring directional light '{}'; the sun is driven by the time of day",
                source.id
            );
            return None;
        }
        source.intensity = source.intensity.min(MAX_LIGHT_LEVEL);
        self.points.insert(source.id.clone(), source)
    }

    /// Removes a light by id, returning it if it existed.
    pub fn remove(&mut self, id: &str) -> Option<LightSource> {
        self.points.remove(id)
    }

    /// The light stored under `id`.
    pub fn get(&self, id: &str) -> Option<&LightSource> {
        self.points.get(id)
    }

    /// Every registered point light, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &LightSource> {
        self.points.values()
    }

    /// Number of lights.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `true` if no light is registered.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_directional_lights_refused() {
        let mut registry = LightRegistry::new();
        let torch = LightSource::point("torch", Point3::new(0.0, 1.0, 0.0), 12);
        assert!(registry.insert(torch).is_none());
        let replaced = registry.insert(LightSource::point("torch", Point3::new(5.0, 1.0, 0.0), 40));
        assert_eq!(replaced.map(|l| l.position.x), Some(0.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("torch").map(|l| l.intensity), Some(MAX_LIGHT_LEVEL));

        let sun = LightSource {
            kind: LightKind::Directional,
            ..LightSource::point("sun", Point3::new(0.0, 0.0, 0.0), 15)
        };
        assert!(registry.insert(sun).is_none());
        assert!(registry.get("sun").is_none());

        assert!(registry.remove("torch").is_some());
        assert!(registry.is_empty());
    }
}
