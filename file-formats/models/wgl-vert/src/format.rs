//! Vertex format flags and the attribute layout they imply

use bitflags::bitflags;

bitflags! {
    /// Attributes present in each vertex of a `vert` lump
    ///
    /// Attributes are interleaved in flag order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexFormat: u32 {
        /// Position, 3 × f32
        const POSITION = 0x0001;
        /// Primary texture coordinate, 2 × f32
        const UV = 0x0002;
        /// Secondary texture coordinate, 2 × f32
        const UV2 = 0x0004;
        /// Normal, 3 × f32
        const NORMAL = 0x0008;
        /// Tangent, 3 × f32
        const TANGENT = 0x0010;
        /// Vertex color, 4 × u8
        const COLOR = 0x0020;
        /// Bone weights and bone indices, 3 × f32 each
        const BONE_WEIGHTS = 0x0040;
    }
}

const ATTRIBUTE_SIZES: [(VertexFormat, u32); 7] = [
    (VertexFormat::POSITION, 12),
    (VertexFormat::UV, 8),
    (VertexFormat::UV2, 8),
    (VertexFormat::NORMAL, 12),
    (VertexFormat::TANGENT, 12),
    (VertexFormat::COLOR, 4),
    (VertexFormat::BONE_WEIGHTS, 24),
];

impl VertexFormat {
    /// Interleaved attribute stream produced by MD5 skinning
    pub const SKINNED: Self = Self::POSITION
        .union(Self::UV)
        .union(Self::NORMAL)
        .union(Self::TANGENT);

    /// Byte size of a single attribute flag; 0 for combined or unknown flags
    pub fn attribute_size(self) -> u32 {
        ATTRIBUTE_SIZES
            .iter()
            .find(|(flag, _)| *flag == self)
            .map_or(0, |(_, size)| *size)
    }

    /// Bytes per vertex implied by the flags
    pub fn stride(self) -> u32 {
        self.iter().map(Self::attribute_size).sum()
    }

    /// Byte offset of `attribute` within a vertex, if present
    pub fn offset_of(self, attribute: Self) -> Option<u32> {
        if !self.contains(attribute) || attribute.bits().count_ones() != 1 {
            return None;
        }
        Some(
            self.iter()
                .take_while(|flag| *flag != attribute)
                .map(Self::attribute_size)
                .sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(VertexFormat::SKINNED, 44 ; "md5 skinned stream")]
    #[test_case(VertexFormat::POSITION | VertexFormat::NORMAL, 24 ; "faceted stream")]
    #[test_case(VertexFormat::all(), 80 ; "everything")]
    #[test_case(VertexFormat::empty(), 0 ; "nothing")]
    fn test_stride(format: VertexFormat, stride: u32) {
        assert_eq!(format.stride(), stride);
    }

    #[test]
    fn test_offsets_match_renderer_layout() {
        let format = VertexFormat::SKINNED;
        assert_eq!(format.offset_of(VertexFormat::POSITION), Some(0));
        assert_eq!(format.offset_of(VertexFormat::UV), Some(12));
        assert_eq!(format.offset_of(VertexFormat::NORMAL), Some(20));
        assert_eq!(format.offset_of(VertexFormat::TANGENT), Some(32));
        assert_eq!(format.offset_of(VertexFormat::COLOR), None);

        let boned = format | VertexFormat::COLOR | VertexFormat::BONE_WEIGHTS;
        assert_eq!(boned.offset_of(VertexFormat::BONE_WEIGHTS), Some(48));
        assert_eq!(boned.stride(), 72);
    }
}
