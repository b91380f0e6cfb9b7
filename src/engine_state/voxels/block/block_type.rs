//! # Block Type Module
//!
//! This module defines the closed set of block types in the voxel world and the
//! conversions between the rich enum and the compact byte stored in chunks.

use num_derive::FromPrimitive;

use super::{BlockProperties, BlockTypeSize, BLOCK_TYPE_PROPERTIES};

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the byte stored in chunk buffers. The `FromPrimitive`
/// derive allows conversion back from that byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Always code 0, never solid, never opaque.
    AIR = 0,

    /// The surface layer of dry land.
    GRASS = 1,

    /// The few layers directly beneath the surface.
    DIRT = 2,

    /// Everything deeper than the dirt layer.
    STONE = 3,

    /// The indestructible world floor.
    BEDROCK = 4,

    /// Surface blocks at or below the sea level.
    SAND = 5,

    /// Fills the space between the terrain and the sea level. See-through.
    WATER = 6,

    /// A light-emitting decorative block.
    GLOWSTONE = 7,
}

impl BlockType {
    /// Number of block types.
    pub const COUNT: usize = 8;

    /// Every block type, in discriminant order.
    pub const ALL: [BlockType; Self::COUNT] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::BEDROCK,
        BlockType::SAND,
        BlockType::WATER,
        BlockType::GLOWSTONE,
    ];

    /// Converts a stored byte back to a `BlockType`.
    ///
    /// # Returns
    /// `None` if the byte does not name a block type.
    pub fn from_block_type_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// The static properties of this block type.
    #[inline]
    pub fn properties(self) -> &'static BlockProperties {
        &BLOCK_TYPE_PROPERTIES[self as usize]
    }

    /// `true` only for [`BlockType::AIR`].
    #[inline]
    pub fn is_air(self) -> bool {
        self == BlockType::AIR
    }

    /// Occupies its cell. Water is not solid.
    #[inline]
    pub fn is_solid(self) -> bool {
        self.properties().solid
    }

    /// Lets neighbouring faces and light through.
    #[inline]
    pub fn is_transparent(self) -> bool {
        self.properties().transparent
    }

    /// Solid and not transparent: hides neighbouring faces and blocks light rays.
    #[inline]
    pub fn is_opaque(self) -> bool {
        let properties = self.properties();
        properties.solid && !properties.transparent
    }

    /// Base color, linear RGB.
    #[inline]
    pub fn color(self) -> [f32; 3] {
        self.properties().color
    }

    /// Light level the block emits, 0 for most blocks.
    #[inline]
    pub fn light_emission(self) -> u8 {
        self.properties().light_emission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_codes_round_trip_through_the_enum() {
        for block_type in BlockType::ALL {
            assert_eq!(
                BlockType::from_block_type_int(block_type as BlockTypeSize),
                Some(block_type)
            );
        }
        assert_eq!(BlockType::from_block_type_int(200), None);
    }

    #[test]
    fn only_air_and_water_let_faces_through() {
        let see_through: Vec<_> = BlockType::ALL
            .into_iter()
            .filter(|block_type| !block_type.is_opaque())
            .collect();
        assert_eq!(see_through, vec![BlockType::AIR, BlockType::WATER]);
    }
}
