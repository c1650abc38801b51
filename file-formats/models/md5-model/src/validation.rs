//! Opt-in consistency checks for parsed meshes and animations
//!
//! Parsing never cross-checks references, and compilation, evaluation and
//! skinning skip whatever they cannot resolve. The functions here report those
//! problems without changing any runtime output.

use std::fmt;

use crate::animation::Animation;
use crate::error::{Md5Error, Result};
use crate::mesh::Mesh;
use crate::model::Md5Model;
use crate::skeleton::Skeleton;

/// Largest accepted deviation of a vertex's bias sum from 1.0
pub const BIAS_TOLERANCE: f32 = 1e-3;

/// How much an issue affects the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Output is defined but probably not what the author intended
    Warning,
    /// Some data is skipped at runtime
    Error,
}

/// A single problem found by validation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum ValidationIssue {
    /// A vertex's biases do not sum to 1.0
    BiasSum {
        /// Mesh index
        mesh: usize,
        /// Vertex index
        vertex: usize,
        /// Actual sum
        sum: f32,
    },
    /// A vertex's weight slice reaches past the weight list
    WeightRangeOutOfBounds {
        /// Mesh index
        mesh: usize,
        /// Vertex index
        vertex: usize,
        /// First weight of the slice
        start: usize,
        /// Length of the slice
        count: usize,
        /// Weights in the mesh
        weights: usize,
    },
    /// A weight names a joint the skeleton does not have
    JointOutOfRange {
        /// Mesh index
        mesh: usize,
        /// Weight index
        weight: usize,
        /// Referenced joint
        joint: usize,
        /// Joints in the skeleton
        joints: usize,
    },
    /// A triangle names a vertex the mesh does not have
    TriangleIndexOutOfRange {
        /// Mesh index
        mesh: usize,
        /// Triangle index
        triangle: usize,
        /// Referenced vertex
        index: u32,
        /// Vertices in the mesh
        vertices: usize,
    },
    /// The index list does not hold whole triangles
    PartialTriangle {
        /// Mesh index
        mesh: usize,
        /// Length of the index list
        indices: usize,
    },
    /// A skeleton joint's parent does not precede it
    ParentOrder {
        /// Joint index
        joint: usize,
        /// Parent index
        parent: usize,
    },
    /// An animation joint's parent does not precede it
    HierarchyParentOrder {
        /// Joint index
        joint: usize,
        /// Parent index
        parent: usize,
    },
    /// Hierarchy and base frame hold different joint counts
    BaseFrameMismatch {
        /// Hierarchy entries
        hierarchy: usize,
        /// Base frame entries
        base_frame: usize,
    },
    /// The animation drives a different number of joints than the skeleton has
    SkeletonMismatch {
        /// Skeleton joints
        skeleton: usize,
        /// Animation joints
        animation: usize,
    },
    /// Skeleton and animation name the same joint index differently
    JointNameMismatch {
        /// Joint index
        joint: usize,
        /// Name in the skeleton
        skeleton: String,
        /// Name in the animation
        animation: String,
    },
    /// A frame ends before a joint's animated values
    FrameTooShort {
        /// Position of the frame in file order
        frame: usize,
        /// Joint whose values are missing
        joint: usize,
        /// Values the frame needs
        required: usize,
        /// Values the frame holds
        actual: usize,
    },
}

impl ValidationIssue {
    /// How much the issue affects the result
    pub fn severity(&self) -> Severity {
        match self {
            Self::BiasSum { .. } | Self::JointNameMismatch { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BiasSum { mesh, vertex, sum } => {
                write!(f, "mesh {mesh} vertex {vertex}: biases sum to {sum}")
            }
            Self::WeightRangeOutOfBounds {
                mesh,
                vertex,
                start,
                count,
                weights,
            } => write!(
                f,
                "mesh {mesh} vertex {vertex}: weights {start}..{} exceed {weights} weights",
                start.saturating_add(*count)
            ),
            Self::JointOutOfRange {
                mesh,
                weight,
                joint,
                joints,
            } => write!(
                f,
                "mesh {mesh} weight {weight}: joint {joint} out of range ({joints} joints)"
            ),
            Self::TriangleIndexOutOfRange {
                mesh,
                triangle,
                index,
                vertices,
            } => write!(
                f,
                "mesh {mesh} triangle {triangle}: vertex {index} out of range ({vertices} vertices)"
            ),
            Self::PartialTriangle { mesh, indices } => {
                write!(f, "mesh {mesh}: {indices} indices is not a multiple of 3")
            }
            Self::ParentOrder { joint, parent } => {
                write!(f, "joint {joint}: parent {parent} does not precede it")
            }
            Self::HierarchyParentOrder { joint, parent } => {
                write!(f, "animation joint {joint}: parent {parent} does not precede it")
            }
            Self::BaseFrameMismatch {
                hierarchy,
                base_frame,
            } => write!(
                f,
                "hierarchy has {hierarchy} joints but base frame has {base_frame}"
            ),
            Self::SkeletonMismatch {
                skeleton,
                animation,
            } => write!(
                f,
                "skeleton has {skeleton} joints but animation has {animation}"
            ),
            Self::JointNameMismatch {
                joint,
                skeleton,
                animation,
            } => write!(
                f,
                "joint {joint}: '{skeleton}' in skeleton, '{animation}' in animation"
            ),
            Self::FrameTooShort {
                frame,
                joint,
                required,
                actual,
            } => write!(
                f,
                "frame {frame}: joint {joint} needs {required} values, frame holds {actual}"
            ),
        }
    }
}

/// Issues collected by a validation pass
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Append every issue of another report
    pub fn merge(&mut self, other: Self) {
        self.issues.extend(other.issues);
    }

    /// All issues in discovery order
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Issues at the given severity
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity() == severity)
    }

    /// Whether no issue of [`Severity::Error`] was found
    pub fn is_valid(&self) -> bool {
        self.with_severity(Severity::Error).next().is_none()
    }

    /// Whether nothing at all was found
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Fail with [`Md5Error::Validation`] unless the report is clean
    pub fn into_result(self) -> Result<()> {
        if self.is_clean() {
            Ok(())
        } else {
            Err(Md5Error::Validation(self))
        }
    }
}

/// Check joint parents precede their children
pub fn validate_skeleton(skeleton: &Skeleton) -> ValidationReport {
    let mut report = ValidationReport::new();
    for (joint, entry) in skeleton.joints().iter().enumerate() {
        if let Some(parent) = entry.parent
            && parent >= joint
        {
            report.push(ValidationIssue::ParentOrder { joint, parent });
        }
    }
    report
}

fn validate_mesh(index: usize, mesh: &Mesh, joints: usize, report: &mut ValidationReport) {
    for (vertex, entry) in mesh.vertices.iter().enumerate() {
        match mesh.vertex_weights(entry) {
            Some(weights) => {
                let sum: f32 = weights.iter().map(|weight| weight.bias).sum();
                if (sum - 1.0).abs() > BIAS_TOLERANCE {
                    report.push(ValidationIssue::BiasSum {
                        mesh: index,
                        vertex,
                        sum,
                    });
                }
            }
            None => report.push(ValidationIssue::WeightRangeOutOfBounds {
                mesh: index,
                vertex,
                start: entry.weights.start,
                count: entry.weights.count,
                weights: mesh.weights.len(),
            }),
        }
    }

    for (weight, entry) in mesh.weights.iter().enumerate() {
        if entry.joint >= joints {
            report.push(ValidationIssue::JointOutOfRange {
                mesh: index,
                weight,
                joint: entry.joint,
                joints,
            });
        }
    }

    if mesh.triangles.len() % 3 != 0 {
        report.push(ValidationIssue::PartialTriangle {
            mesh: index,
            indices: mesh.triangles.len(),
        });
    }
    for (position, &vertex) in mesh.triangles.iter().enumerate() {
        if vertex as usize >= mesh.vertices.len() {
            report.push(ValidationIssue::TriangleIndexOutOfRange {
                mesh: index,
                triangle: position / 3,
                index: vertex,
                vertices: mesh.vertices.len(),
            });
        }
    }
}

/// Check a mesh model's skeleton and every mesh's references
pub fn validate_model(model: &Md5Model) -> ValidationReport {
    let mut report = validate_skeleton(&model.skeleton);
    for (index, mesh) in model.meshes.iter().enumerate() {
        validate_mesh(index, mesh, model.skeleton.len(), &mut report);
    }
    report
}

/// Check an animation's internal consistency and, if given, its fit to a skeleton
pub fn validate_animation(anim: &Animation, skeleton: Option<&Skeleton>) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (joint, entry) in anim.hierarchy.iter().enumerate() {
        if let Some(parent) = entry.parent
            && parent >= joint
        {
            report.push(ValidationIssue::HierarchyParentOrder { joint, parent });
        }
    }

    if anim.hierarchy.len() != anim.base_frame.len() {
        report.push(ValidationIssue::BaseFrameMismatch {
            hierarchy: anim.hierarchy.len(),
            base_frame: anim.base_frame.len(),
        });
    }

    if let Some(skeleton) = skeleton {
        if skeleton.len() != anim.hierarchy.len() {
            report.push(ValidationIssue::SkeletonMismatch {
                skeleton: skeleton.len(),
                animation: anim.hierarchy.len(),
            });
        }
        for (joint, (bind, entry)) in skeleton.joints().iter().zip(&anim.hierarchy).enumerate() {
            if bind.name != entry.name {
                report.push(ValidationIssue::JointNameMismatch {
                    joint,
                    skeleton: bind.name.clone(),
                    animation: entry.name.clone(),
                });
            }
        }
    }

    for (position, frame) in anim.frames.iter().enumerate() {
        // One issue per frame: the first joint that runs past the end.
        let short = anim.hierarchy.iter().enumerate().find_map(|(joint, entry)| {
            let required = entry.start.saturating_add(entry.channels.value_count());
            (!entry.channels.is_empty() && required > frame.values.len())
                .then_some((joint, required))
        });
        if let Some((joint, required)) = short {
            report.push(ValidationIssue::FrameTooShort {
                frame: position,
                joint,
                required,
                actual: frame.values.len(),
            });
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseOptions;
    use pretty_assertions::assert_eq;

    const MODEL: &str = r#"
joints {
	"root" -1 ( 0 0 0 ) ( 0 0 0 )
	"arm" 0 ( 1 0 0 ) ( 0 0 0 )
}
mesh {
	vert 0 ( 0 0 ) 0 1
	vert 1 ( 1 0 ) 1 2
	vert 2 ( 0 1 ) 3 1
	tri 0 0 1 2
	weight 0 0 1.0 ( 0 0 0 )
	weight 1 0 0.5 ( 1 0 0 )
	weight 2 1 0.5 ( 0 0 0 )
	weight 3 1 1.0 ( 0 1 0 )
}
"#;

    fn model() -> Md5Model {
        Md5Model::parse(MODEL, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_clean_model() {
        let report = validate_model(&model());
        assert!(report.is_clean(), "{:?}", report.issues());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_bias_sum_is_a_warning() {
        let mut model = model();
        model.meshes[0].weights[2].bias = 0.25;
        let report = validate_model(&model);

        assert_eq!(
            report.issues(),
            &[ValidationIssue::BiasSum {
                mesh: 0,
                vertex: 1,
                sum: 0.75
            }]
        );
        assert!(report.is_valid());
        assert!(!report.is_clean());
    }

    #[test]
    fn test_out_of_range_references() {
        let mut model = model();
        model.meshes[0].weights[3].joint = 7;
        model.meshes[0].triangles.extend_from_slice(&[0, 5, 1, 2]);
        model.meshes[0].vertices[2].weights.count = 4;
        model.skeleton = Skeleton::new(
            model
                .skeleton
                .joints()
                .iter()
                .cloned()
                .map(|mut joint| {
                    if joint.name == "root" {
                        joint.parent = Some(1);
                    }
                    joint
                })
                .collect(),
        );

        let report = validate_model(&model);
        assert!(!report.is_valid());
        let rendered: Vec<String> = report.issues().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "joint 0: parent 1 does not precede it",
                "mesh 0 vertex 2: weights 3..7 exceed 4 weights",
                "mesh 0 weight 3: joint 7 out of range (2 joints)",
                "mesh 0: 7 indices is not a multiple of 3",
                "mesh 0 triangle 1: vertex 5 out of range (3 vertices)",
            ]
        );

        let err = report.into_result().unwrap_err();
        assert!(matches!(err, Md5Error::Validation(ref r) if r.issues().len() == 5));
    }

    #[test]
    fn test_animation_checks() {
        let text = r#"
hierarchy {
	"root" -1 63 0
	"hand" 0 7 6
}
baseframe {
	( 0 0 0 ) ( 0 0 0 )
}
frame 0 {
	0 0 0 0 0 0 1 2
}
"#;
        let anim = Animation::parse(text, &ParseOptions::default()).unwrap();
        let report = validate_animation(&anim, Some(&model().skeleton));
        let issues = report.issues();

        assert!(issues.contains(&ValidationIssue::BaseFrameMismatch {
            hierarchy: 2,
            base_frame: 1
        }));
        assert!(issues.contains(&ValidationIssue::JointNameMismatch {
            joint: 1,
            skeleton: "arm".into(),
            animation: "hand".into(),
        }));
        assert!(issues.contains(&ValidationIssue::FrameTooShort {
            frame: 0,
            joint: 1,
            required: 9,
            actual: 8
        }));
        assert!(
            !issues
                .iter()
                .any(|issue| matches!(issue, ValidationIssue::SkeletonMismatch { .. }))
        );
    }
}
