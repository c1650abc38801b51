//! `.md5anim` records: hierarchy, bounds, base frame and frame data

use bitflags::bitflags;
use glam::{Quat, Vec3};
use log::debug;

use crate::error::{Md5Error, Result};
use crate::parser::{Document, Line, ParseOptions, Token};
use crate::skeleton::quat_from_xyz;

bitflags! {
    /// Components a joint animates, in the order their values appear in a frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(
        feature = "serde-support",
        derive(serde::Serialize, serde::Deserialize)
    )]
    pub struct ChannelMask: u32 {
        /// Position x
        const TX = 0x01;
        /// Position y
        const TY = 0x02;
        /// Position z
        const TZ = 0x04;
        /// Orientation x
        const QX = 0x08;
        /// Orientation y
        const QY = 0x10;
        /// Orientation z
        const QZ = 0x20;
    }
}

impl ChannelMask {
    /// Number of frame values this joint consumes
    pub fn value_count(self) -> usize {
        self.bits().count_ones() as usize
    }
}

/// One joint of an animation's hierarchy
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct HierarchyEntry {
    /// Joint name
    pub name: String,
    /// Parent joint index, `None` for roots
    pub parent: Option<usize>,
    /// Animated components
    pub channels: ChannelMask,
    /// Offset of this joint's first value within each frame
    pub start: usize,
}

impl HierarchyEntry {
    fn parse(line: &Line<'_>) -> Result<Self> {
        let mut cursor = line.cursor();
        let name = cursor.string("joint name")?.to_string();
        let parent: i32 = cursor.number("parent index")?;
        let flags: u32 = cursor.number("channel flags")?;
        let start = cursor.number("frame data offset")?;

        Ok(Self {
            name,
            parent: usize::try_from(parent).ok(),
            channels: ChannelMask::from_bits_truncate(flags),
            start,
        })
    }
}

/// Default transform of a joint, used for every channel a frame does not animate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BaseFrameJoint {
    /// Parent-relative position
    pub position: Vec3,
    /// Vector part of the parent-relative orientation
    pub orientation: Vec3,
}

impl BaseFrameJoint {
    fn parse(line: &Line<'_>) -> Result<Self> {
        let mut cursor = line.cursor();
        Ok(Self {
            position: cursor.vec3("position")?,
            orientation: cursor.vec3("orientation")?,
        })
    }

    /// The orientation with `w` reconstructed
    pub fn rotation(&self) -> Quat {
        quat_from_xyz(self.orientation)
    }
}

/// Axis-aligned bounds of the model in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Bounds {
    fn parse(line: &Line<'_>) -> Result<Self> {
        let mut cursor = line.cursor();
        Ok(Self {
            min: cursor.vec3("minimum")?,
            max: cursor.vec3("maximum")?,
        })
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths of the box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Animated component values of one frame
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Frame {
    /// Number from the `frame N {` label
    pub index: usize,
    /// Values in hierarchy order
    pub values: Vec<f32>,
}

/// Read every line of a block with a per-line record parser
fn read_records<T>(
    document: &Document<'_>,
    tag: &'static str,
    options: &ParseOptions,
    parse: fn(&Line<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    let mut records = Vec::new();
    if let Some(block) = options.require(document.block(tag), tag)? {
        for line in &block.body {
            if let Some(record) = options.recover(parse(line))? {
                records.push(record);
            }
        }
    }
    debug!("parsed {} {tag} records", records.len());
    Ok(records)
}

pub(crate) fn hierarchy_from_document(
    document: &Document<'_>,
    options: &ParseOptions,
) -> Result<Vec<HierarchyEntry>> {
    read_records(document, "hierarchy", options, HierarchyEntry::parse)
}

pub(crate) fn base_frame_from_document(
    document: &Document<'_>,
    options: &ParseOptions,
) -> Result<Vec<BaseFrameJoint>> {
    read_records(document, "baseframe", options, BaseFrameJoint::parse)
}

pub(crate) fn bounds_from_document(
    document: &Document<'_>,
    options: &ParseOptions,
) -> Result<Vec<Bounds>> {
    // Bounds only matter for culling; an animation without them is complete.
    match document.block("bounds") {
        Some(_) => read_records(document, "bounds", options, Bounds::parse),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn frames_from_document(
    document: &Document<'_>,
    options: &ParseOptions,
) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    for (ordinal, block) in document.blocks("frame").enumerate() {
        let index = block.label_number().unwrap_or_else(|| {
            debug!("line {}: frame block without a number", block.line);
            ordinal
        });

        let mut values = Vec::new();
        for (line, token) in block.body_tokens() {
            let value = match token {
                Token::Word(word) => word.parse::<f32>().map_err(|_| {
                    Md5Error::parse(line, format!("invalid frame value: '{word}'"))
                }),
                other => Err(Md5Error::parse(
                    line,
                    format!("expected frame value, found {other}"),
                )),
            };
            if let Some(value) = options.recover(value)? {
                values.push(value);
            }
        }

        frames.push(Frame { index, values });
    }
    debug!("parsed {} frames", frames.len());
    Ok(frames)
}

/// Parse the `hierarchy { }` block of an `.md5anim` document
pub fn parse_hierarchy(text: &str, options: &ParseOptions) -> Result<Vec<HierarchyEntry>> {
    hierarchy_from_document(&Document::scan(text, options)?, options)
}

/// Parse the `baseframe { }` block of an `.md5anim` document
pub fn parse_base_frame(text: &str, options: &ParseOptions) -> Result<Vec<BaseFrameJoint>> {
    base_frame_from_document(&Document::scan(text, options)?, options)
}

/// Parse every `frame N { }` block of an `.md5anim` document, in file order
pub fn parse_frames(text: &str, options: &ParseOptions) -> Result<Vec<Frame>> {
    frames_from_document(&Document::scan(text, options)?, options)
}

/// Parse the optional `bounds { }` block of an `.md5anim` document
pub fn parse_bounds(text: &str, options: &ParseOptions) -> Result<Vec<Bounds>> {
    bounds_from_document(&Document::scan(text, options)?, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(0, 0 ; "static")]
    #[test_case(1, 1 ; "x only")]
    #[test_case(7, 3 ; "translation")]
    #[test_case(56, 3 ; "rotation")]
    #[test_case(63, 6 ; "everything")]
    fn test_channel_value_count(bits: u32, expected: usize) {
        assert_eq!(ChannelMask::from_bits_truncate(bits).value_count(), expected);
    }

    #[test]
    fn test_parse_hierarchy() {
        let text = "hierarchy {\n\t\"origin\"\t-1 0 0\t//\n\t\"body\"\t0 63 0\t// origin ( Tx Ty Tz Qx Qy Qz )\n}\n";
        let entries = parse_hierarchy(text, &ParseOptions::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].parent, None);
        assert!(entries[0].channels.is_empty());
        assert_eq!(entries[1].parent, Some(0));
        assert_eq!(entries[1].channels, ChannelMask::all());
        assert_eq!(entries[1].start, 0);
    }

    #[test]
    fn test_parse_base_frame() {
        let text = "baseframe {\n\t( 0 0 0 ) ( -0.5 -0.5 -0.5 )\n\t( 1.5 0 2 ) ( 0 0 0 )\n}\n";
        let base = parse_base_frame(text, &ParseOptions::default()).unwrap();
        assert_eq!(base.len(), 2);
        assert_eq!(base[1].position, Vec3::new(1.5, 0.0, 2.0));
        assert!((base[0].rotation().w + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_parse_frames_in_file_order() {
        let text = "frame 1 {\n\t5.0\n}\nframe 0 {\n\t1 2\n\t3\n}\n";
        let frames = parse_frames(text, &ParseOptions::default()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].index, 1);
        assert_eq!(frames[0].values, vec![5.0]);
        assert_eq!(frames[1].values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_one_line_frames() {
        let text = "frame 0 { 1 2 3 }\nframe 1 { 4 5 6 }\n";
        let frames = parse_frames(text, &ParseOptions::strict()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].index, 1);
        assert_eq!(frames[1].values, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_bad_frame_value() {
        let text = "frame 0 {\n\t1 x 2\n}\n";
        let frames = parse_frames(text, &ParseOptions::default()).unwrap();
        assert_eq!(frames[0].values, vec![1.0, 2.0]);

        let err = parse_frames(text, &ParseOptions::strict()).unwrap_err();
        assert!(matches!(err, Md5Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_bounds_are_optional() {
        let strict = ParseOptions::strict();
        assert!(parse_bounds("", &strict).unwrap().is_empty());

        let bounds = parse_bounds("bounds {\n( -1 -2 -3 ) ( 1 2 3 )\n}\n", &strict).unwrap();
        assert_eq!(bounds[0].center(), Vec3::ZERO);
        assert_eq!(bounds[0].size(), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_missing_hierarchy() {
        assert!(parse_hierarchy("", &ParseOptions::default()).unwrap().is_empty());
        assert!(matches!(
            parse_hierarchy("", &ParseOptions::strict()),
            Err(Md5Error::MissingBlock("hierarchy"))
        ));
    }
}
