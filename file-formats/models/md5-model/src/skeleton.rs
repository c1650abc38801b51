//! Joint hierarchy and joint poses
//!
//! MD5 joints are stored parent-before-child: a joint's parent always has a
//! smaller index, which lets the bind pose and every animated pose be built
//! in a single forward pass.

use glam::{Quat, Vec3};
use log::debug;

use crate::error::Result;
use crate::parser::{Document, Line, ParseOptions};

/// Rebuild a unit quaternion from its stored x, y, z components.
///
/// MD5 files only store the vector part; `w` is taken as the negative root
/// so that `x² + y² + z² + w² = 1`. Slightly denormalized input (the vector
/// part exceeding unit length) uses the magnitude of the remainder.
pub fn quat_from_xyz(xyz: Vec3) -> Quat {
    let w = -(1.0 - xyz.length_squared()).abs().sqrt();
    Quat::from_xyzw(xyz.x, xyz.y, xyz.z, w)
}

/// A joint in the bind-pose skeleton
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Joint {
    /// Joint name
    pub name: String,
    /// Parent joint index, `None` for roots
    pub parent: Option<usize>,
    /// Bind position in model space
    pub position: Vec3,
    /// Bind orientation in model space
    pub orientation: Quat,
}

impl Joint {
    fn parse(line: &Line<'_>) -> Result<Self> {
        let mut cursor = line.cursor();
        let name = cursor.string("joint name")?.to_string();
        let parent: i32 = cursor.number("parent index")?;
        let position = cursor.vec3("position")?;
        let orientation = quat_from_xyz(cursor.vec3("orientation")?);

        Ok(Self {
            name,
            parent: usize::try_from(parent).ok(),
            position,
            orientation,
        })
    }

    /// The joint's bind transform as a pose entry
    pub fn bind_pose(&self) -> JointPose {
        JointPose {
            position: self.position,
            orientation: self.orientation,
        }
    }
}

/// The bind-pose joint hierarchy of a mesh
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Create a skeleton from joints already in parent-before-child order
    pub fn new(joints: Vec<Joint>) -> Self {
        Self { joints }
    }

    pub(crate) fn from_document(document: &Document<'_>, options: &ParseOptions) -> Result<Self> {
        let mut joints = Vec::new();
        if let Some(block) = options.require(document.block("joints"), "joints")? {
            for line in &block.body {
                if let Some(joint) = options.recover(Joint::parse(line))? {
                    joints.push(joint);
                }
            }
        }
        debug!("parsed {} joints", joints.len());
        Ok(Self { joints })
    }

    /// All joints in storage order
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Number of joints
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the skeleton has no joints
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Find a joint index by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|joint| joint.name == name)
    }

    /// The bind pose: every joint at its own bind transform
    pub fn bind_pose(&self) -> Pose {
        self.joints.iter().map(Joint::bind_pose).collect()
    }
}

/// Parse the `joints { }` block of an `.md5mesh` document
pub fn parse_skeleton(text: &str, options: &ParseOptions) -> Result<Skeleton> {
    let document = Document::scan(text, options)?;
    Skeleton::from_document(&document, options)
}

/// A joint's world-space transform
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct JointPose {
    /// World position
    pub position: Vec3,
    /// World orientation
    pub orientation: Quat,
}

impl Default for JointPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl JointPose {
    /// Create a pose entry
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Express `local`, given relative to this joint, in this joint's parent space
    pub fn compose(&self, local: &Self) -> Self {
        Self {
            position: self.position + self.orientation * local.position,
            orientation: self.orientation * local.orientation,
        }
    }

    /// Map a joint-local offset to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.orientation * point
    }
}

/// World transforms for every joint of a skeleton, indexed by joint
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Pose {
    joints: Vec<JointPose>,
}

impl Pose {
    /// An empty pose with room for `capacity` joints
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            joints: Vec::with_capacity(capacity),
        }
    }

    /// Joint transforms in joint order
    pub fn joints(&self) -> &[JointPose] {
        &self.joints
    }

    /// Transform of a single joint
    pub fn get(&self, index: usize) -> Option<&JointPose> {
        self.joints.get(index)
    }

    /// Number of joints
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the pose is empty
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.joints.clear();
    }

    pub(crate) fn push(&mut self, joint: JointPose) {
        self.joints.push(joint);
    }
}

impl FromIterator<JointPose> for Pose {
    fn from_iter<I: IntoIterator<Item = JointPose>>(iter: I) -> Self {
        Self {
            joints: iter.into_iter().collect(),
        }
    }
}
