//! Frame evaluation: base frame plus animated channels, composed down the hierarchy

use glam::Vec3;
use log::{trace, warn};

use super::Animation;
use super::hierarchy::{BaseFrameJoint, ChannelMask, HierarchyEntry};
use crate::error::{Md5Error, Result};
use crate::skeleton::{JointPose, Pose, quat_from_xyz};

/// Components in the order their values are stored in a frame
const CHANNEL_ORDER: [ChannelMask; 6] = [
    ChannelMask::TX,
    ChannelMask::TY,
    ChannelMask::TZ,
    ChannelMask::QX,
    ChannelMask::QY,
    ChannelMask::QZ,
];

/// Parent-relative transform of one joint in one frame
fn local_joint(
    joint: usize,
    base: &BaseFrameJoint,
    entry: Option<&HierarchyEntry>,
    values: &[f32],
) -> JointPose {
    let mut position = base.position;
    let mut orientation = base.orientation;

    if let Some(entry) = entry {
        // None once the offset runs past usize::MAX
        let mut offset = Some(entry.start);
        for (component, channel) in CHANNEL_ORDER.into_iter().enumerate() {
            if !entry.channels.contains(channel) {
                continue;
            }
            match offset.and_then(|offset| values.get(offset)) {
                Some(&value) if component < 3 => position[component] = value,
                Some(&value) => orientation[component - 3] = value,
                None => trace!("joint {joint}: frame value {offset:?} missing, keeping base"),
            }
            offset = offset.and_then(|offset| offset.checked_add(1));
        }
    }

    JointPose::new(position, quat_from_xyz(orientation))
}

impl Animation {
    /// Evaluate the world pose of a frame
    ///
    /// `frame_index` wraps around the frame count, so playback loops.
    pub fn evaluate(&self, frame_index: usize) -> Result<Pose> {
        let mut pose = Pose::with_capacity(self.base_frame.len());
        self.evaluate_into(frame_index, &mut pose)?;
        Ok(pose)
    }

    /// Evaluate a frame into a caller-owned pose, reusing its allocation
    ///
    /// The pose ends up with one entry per base-frame joint. A joint without a
    /// hierarchy entry keeps its base-frame transform and is treated as a root.
    pub fn evaluate_into(&self, frame_index: usize, pose: &mut Pose) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Md5Error::EmptyAnimation);
        }
        let frame = &self.frames[frame_index % self.frames.len()];
        trace!("evaluating frame {} ({frame_index})", frame.index);

        pose.clear();
        for (joint, base) in self.base_frame.iter().enumerate() {
            let entry = self.hierarchy.get(joint);
            let local = local_joint(joint, base, entry, &frame.values);

            let world = match entry.and_then(|entry| entry.parent) {
                Some(parent) if parent < joint => match pose.get(parent) {
                    Some(parent) => parent.compose(&local),
                    None => local,
                },
                Some(parent) => {
                    warn!("joint {joint}: parent {parent} does not precede it; treating as root");
                    local
                }
                None => local,
            };
            pose.push(world);
        }
        Ok(())
    }

    /// World positions of every joint in a frame
    pub fn joint_positions(&self, frame_index: usize) -> Result<Vec<Vec3>> {
        let pose = self.evaluate(frame_index)?;
        Ok(pose.joints().iter().map(|joint| joint.position).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Frame;
    use glam::Quat;

    fn two_joint_animation(values: Vec<f32>, channels: ChannelMask) -> Animation {
        Animation {
            hierarchy: vec![
                HierarchyEntry {
                    name: "root".into(),
                    parent: None,
                    channels,
                    start: 0,
                },
                HierarchyEntry {
                    name: "child".into(),
                    parent: Some(0),
                    channels: ChannelMask::empty(),
                    start: channels.value_count(),
                },
            ],
            base_frame: vec![
                BaseFrameJoint {
                    position: Vec3::ZERO,
                    orientation: Vec3::ZERO,
                },
                BaseFrameJoint {
                    position: Vec3::new(0.0, 0.0, 1.0),
                    orientation: Vec3::ZERO,
                },
            ],
            frames: vec![Frame { index: 0, values }],
            ..Animation::default()
        }
    }

    #[test]
    fn test_static_frame_reproduces_base() {
        let anim = two_joint_animation(vec![], ChannelMask::empty());
        let pose = anim.evaluate(0).unwrap();
        assert_eq!(pose.len(), 2);
        assert!((pose.joints()[1].position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);
        assert!(pose.joints()[1].orientation.dot(Quat::IDENTITY).abs() > 1.0 - 1e-6);
    }

    #[test]
    fn test_tx_channel_moves_subtree() {
        let anim = two_joint_animation(vec![5.0], ChannelMask::TX);
        let pose = anim.evaluate(0).unwrap();
        assert!((pose.joints()[0].position - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-6);
        assert!((pose.joints()[1].position - Vec3::new(5.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_rotation_channel_rotates_child() {
        // Quarter turn about x: vector part (sin 45°, 0, 0), w reconstructed negative.
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let anim = two_joint_animation(vec![s], ChannelMask::QX);
        let pose = anim.evaluate(0).unwrap();
        let child = pose.joints()[1].position;
        assert!((child.length() - 1.0).abs() < 1e-5);
        assert!(child.z.abs() < 1e-5);
    }

    #[test]
    fn test_missing_values_keep_base() {
        let anim = two_joint_animation(vec![], ChannelMask::TX | ChannelMask::TY);
        let pose = anim.evaluate(0).unwrap();
        assert_eq!(pose.joints()[0].position, Vec3::ZERO);
    }

    #[test]
    fn test_bad_parent_is_root() {
        let mut anim = two_joint_animation(vec![5.0], ChannelMask::TX);
        anim.hierarchy[1].parent = Some(1);
        let pose = anim.evaluate(0).unwrap();
        assert_eq!(pose.joints()[1].position, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_evaluate_into_reuses_buffer() {
        let anim = two_joint_animation(vec![5.0], ChannelMask::TX);
        let mut pose = anim.evaluate(0).unwrap();
        anim.evaluate_into(3, &mut pose).unwrap();
        assert_eq!(pose, anim.evaluate(0).unwrap());
    }

    #[test]
    fn test_empty_animation() {
        let anim = Animation::default();
        assert!(matches!(anim.evaluate(0), Err(Md5Error::EmptyAnimation)));
    }
}
