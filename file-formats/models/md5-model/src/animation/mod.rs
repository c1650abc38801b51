//! `.md5anim` animations
//!
//! An animation stores a base frame (the default parent-relative transform of
//! every joint) and, per frame, only the components the hierarchy marks as
//! animated. Evaluating a frame overlays those components on the base frame
//! and composes the result down the hierarchy into world space.
//!
//! ```
//! use md5_model::{Animation, ParseOptions};
//!
//! let text = r#"
//! MD5Version 10
//! frameRate 30
//! hierarchy {
//!     "root" -1 1 0
//! }
//! baseframe {
//!     ( 0 0 0 ) ( 0 0 0 )
//! }
//! frame 0 {
//!     5.0
//! }
//! "#;
//! let anim = Animation::parse(text, &ParseOptions::default()).unwrap();
//! let pose = anim.evaluate(0).unwrap();
//! assert_eq!(pose.joints()[0].position.x, 5.0);
//! ```

mod evaluate;
mod hierarchy;

pub use hierarchy::{
    BaseFrameJoint, Bounds, ChannelMask, Frame, HierarchyEntry, parse_base_frame, parse_bounds,
    parse_frames, parse_hierarchy,
};

use std::time::Duration;

use log::{debug, warn};

use crate::error::Result;
use crate::model::{parse_statement, read_version};
use crate::parser::{Document, ParseOptions};

/// Frame rate assumed when the document does not declare a usable one
pub const DEFAULT_FRAME_RATE: u32 = 24;

/// A parsed `.md5anim` file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Animation {
    /// Value of the `MD5Version` statement, if present
    pub version: Option<u32>,
    /// Frames per second
    pub frame_rate: u32,
    /// Joint hierarchy with channel layout
    pub hierarchy: Vec<HierarchyEntry>,
    /// Per-frame bounds, empty when the file has none
    pub bounds: Vec<Bounds>,
    /// Default parent-relative joint transforms
    pub base_frame: Vec<BaseFrameJoint>,
    /// Frames in file order
    pub frames: Vec<Frame>,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            version: None,
            frame_rate: DEFAULT_FRAME_RATE,
            hierarchy: Vec::new(),
            bounds: Vec::new(),
            base_frame: Vec::new(),
            frames: Vec::new(),
        }
    }
}

impl Animation {
    /// Parse an `.md5anim` document
    pub fn parse(text: &str, options: &ParseOptions) -> Result<Self> {
        let document = Document::scan(text, options)?;
        let version = read_version(&document, options)?;

        let frame_rate = match document.statement("frameRate") {
            Some(line) => options.recover(parse_statement::<u32>(line, "frameRate"))?,
            None => None,
        };
        let frame_rate = match frame_rate {
            Some(0) => {
                warn!("frameRate 0 is unusable; assuming {DEFAULT_FRAME_RATE}");
                DEFAULT_FRAME_RATE
            }
            Some(rate) => rate,
            None => DEFAULT_FRAME_RATE,
        };

        let anim = Self {
            version,
            frame_rate,
            hierarchy: hierarchy::hierarchy_from_document(&document, options)?,
            bounds: hierarchy::bounds_from_document(&document, options)?,
            base_frame: hierarchy::base_frame_from_document(&document, options)?,
            frames: hierarchy::frames_from_document(&document, options)?,
        };

        for (keyword, actual) in [
            ("numFrames", anim.frames.len()),
            ("numJoints", anim.hierarchy.len()),
            ("numAnimatedComponents", anim.animated_components()),
        ] {
            let declared = document
                .statement(keyword)
                .and_then(|line| parse_statement::<usize>(line, keyword).ok());
            if let Some(declared) = declared
                && declared != actual
            {
                debug!("{keyword} declares {declared} but the animation holds {actual}");
            }
        }

        Ok(anim)
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Number of joints a pose of this animation holds
    pub fn joint_count(&self) -> usize {
        self.base_frame.len()
    }

    /// Values each frame should hold according to the hierarchy
    pub fn animated_components(&self) -> usize {
        self.hierarchy
            .iter()
            .map(|entry| entry.channels.value_count())
            .sum()
    }

    /// Display time of one frame
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }

    /// Playback length of one loop
    pub fn duration(&self) -> Duration {
        self.frame_duration() * u32::try_from(self.frames.len()).unwrap_or(u32::MAX)
    }

    /// The frame shown after `elapsed` playback time
    ///
    /// The result counts whole frames and is not wrapped; [`Animation::evaluate`]
    /// wraps it around the frame count.
    pub fn frame_at(&self, elapsed: Duration) -> usize {
        let frames = elapsed.as_nanos() * u128::from(self.frame_rate) / 1_000_000_000;
        usize::try_from(frames).unwrap_or(usize::MAX)
    }
}
