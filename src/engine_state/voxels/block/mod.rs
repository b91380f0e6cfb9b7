//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel world.
//! It includes block type definitions, block face handling, and the static table
//! of per-type properties consulted by meshing and lighting.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
/// Chunk buffers store one of these per cell.
pub type BlockTypeSize = u8;

/// Static properties shared by every block of a given type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockProperties {
    /// Base vertex color (linear RGB), multiplied by the lighting brightness.
    pub color: [f32; 3],
    /// Whether the block blocks movement and light.
    pub solid: bool,
    /// Whether the block is see-through for face culling.
    pub transparent: bool,
    /// Light level emitted by the block itself (0 for none).
    pub light_emission: u8,
}

/// Maps each block type to its properties.
///
/// The array is indexed by `BlockType` as a `usize`, so the order must match the
/// enum's discriminants. Index 0 is always air: never solid, never opaque.
pub static BLOCK_TYPE_PROPERTIES: [BlockProperties; BlockType::COUNT] = [
    // AIR
    BlockProperties {
        color: [0.0, 0.0, 0.0],
        solid: false,
        transparent: true,
        light_emission: 0,
    },
    // GRASS
    BlockProperties {
        color: [0.36, 0.70, 0.24],
        solid: true,
        transparent: false,
        light_emission: 0,
    },
    // DIRT
    BlockProperties {
        color: [0.53, 0.38, 0.24],
        solid: true,
        transparent: false,
        light_emission: 0,
    },
    // STONE
    BlockProperties {
        color: [0.50, 0.50, 0.52],
        solid: true,
        transparent: false,
        light_emission: 0,
    },
    // BEDROCK
    BlockProperties {
        color: [0.20, 0.20, 0.22],
        solid: true,
        transparent: false,
        light_emission: 0,
    },
    // SAND
    BlockProperties {
        color: [0.86, 0.80, 0.55],
        solid: true,
        transparent: false,
        light_emission: 0,
    },
    // WATER
    BlockProperties {
        color: [0.20, 0.40, 0.85],
        solid: false,
        transparent: true,
        light_emission: 0,
    },
    // GLOWSTONE
    BlockProperties {
        color: [0.98, 0.85, 0.45],
        solid: true,
        transparent: false,
        light_emission: 14,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_never_solid_or_opaque() {
        let air = BLOCK_TYPE_PROPERTIES[0];
        assert!(!air.solid);
        assert!(air.transparent);
        assert_eq!(BlockType::AIR as usize, 0);
    }

    #[test]
    fn property_table_follows_enum_order() {
        assert!(BlockType::WATER.properties().transparent);
        assert!(!BlockType::WATER.properties().solid);
        assert_eq!(BlockType::GLOWSTONE.properties().light_emission, 14);
        assert!(BlockType::BEDROCK.properties().solid);
    }
}
