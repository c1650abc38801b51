//! Runtime skinning against an evaluated pose
//!
//! The skinner reuses the joint-local normal and tangent stored on every
//! compiled weight, so re-skinning costs one rotation per influence and
//! attribute and never touches the triangle list.
//!
//! # Example
//!
//! ```
//! use md5_model::{Md5Model, ParseOptions, Skinner, SkinningOptions};
//!
//! let text = r#"
//! joints {
//!     "root" -1 ( 0 0 0 ) ( 0 0 0 )
//! }
//! mesh {
//!     vert 0 ( 0 0 ) 0 1
//!     weight 0 0 1.0 ( 0 0 1 )
//! }
//! "#;
//! let model = Md5Model::parse(text, &ParseOptions::default())?;
//! let compiled = model.compile();
//! let skinner = Skinner::new(&compiled, SkinningOptions::default());
//!
//! let stream = skinner.skin(&model.skeleton.bind_pose());
//! assert_eq!(stream.len(), 1);
//! # Ok::<(), md5_model::Md5Error>(())
//! ```

use glam::Vec3;
use log::debug;

use crate::compile::{CompiledMesh, CompiledModel, blend_position};
use crate::error::{Md5Error, Result};
use crate::skeleton::{JointPose, Pose};
use crate::vertex::{VERTEX_ELEMENTS, VertexRecord, VertexStream};

/// Options for controlling the skinning behavior
#[derive(Debug, Clone, Default)]
pub struct SkinningOptions {
    /// Normalize blended normals and tangents
    ///
    /// Off by default: blending unit vectors from differently oriented joints
    /// shortens them, and the output keeps that raw weighted sum unless this
    /// is set.
    pub renormalize: bool,
}

/// Re-skins a compiled model for arbitrary poses
#[derive(Debug, Clone)]
pub struct Skinner<'m> {
    model: &'m CompiledModel,
    options: SkinningOptions,
}

impl<'m> Skinner<'m> {
    /// Create a skinner over a compiled model
    pub fn new(model: &'m CompiledModel, options: SkinningOptions) -> Self {
        Self { model, options }
    }

    /// The model being skinned
    pub fn model(&self) -> &'m CompiledModel {
        self.model
    }

    /// Current options
    pub fn options(&self) -> &SkinningOptions {
        &self.options
    }

    /// Replace the options
    pub fn set_options(&mut self, options: SkinningOptions) {
        self.options = options;
    }

    /// Number of floats a full stream of the model occupies
    pub fn stream_len(&self) -> usize {
        self.model.vertex_count() * VERTEX_ELEMENTS
    }

    /// Skin every mesh into a fresh stream
    pub fn skin(&self, pose: &Pose) -> VertexStream {
        let mut stream = VertexStream::zeroed(self.model.vertex_count());
        self.write_meshes(pose, stream.as_mut_slice());
        stream
    }

    /// Skin every mesh into a caller-owned buffer
    ///
    /// Mesh records are written back to back from the start of `out`, in mesh
    /// order; floats past the stream are left untouched.
    pub fn skin_into(&self, pose: &Pose, out: &mut [f32]) -> Result<()> {
        let required = self.stream_len();
        if out.len() < required {
            return Err(Md5Error::BufferTooSmall {
                required,
                actual: out.len(),
            });
        }
        self.write_meshes(pose, &mut out[..required]);
        Ok(())
    }

    fn write_meshes(&self, pose: &Pose, out: &mut [f32]) {
        if pose.len() != self.model.joint_count() {
            debug!(
                "skinning {} joint model with a {} joint pose",
                self.model.joint_count(),
                pose.len()
            );
        }

        let mut records = out.chunks_exact_mut(VERTEX_ELEMENTS);
        for mesh in self.model.meshes() {
            // Pull the vertex first so a finished mesh never consumes a record.
            for (vertex, record) in self.skin_mesh(mesh, pose.joints()).zip(records.by_ref()) {
                if let Ok(record) = <&mut [f32; VERTEX_ELEMENTS]>::try_from(record) {
                    vertex.write_to(record);
                }
            }
        }
    }

    /// Skinned records of one mesh, in vertex order
    pub fn skin_mesh<'a>(
        &'a self,
        mesh: &'a CompiledMesh,
        joints: &'a [JointPose],
    ) -> impl Iterator<Item = VertexRecord> + 'a {
        mesh.vertices.iter().map(move |vertex| {
            let weights = mesh.vertex_weights(vertex);

            let mut normal = Vec3::ZERO;
            let mut tangent = Vec3::ZERO;
            for weight in weights {
                let Some(joint) = joints.get(weight.joint) else {
                    continue;
                };
                normal += joint.orientation * weight.normal * weight.bias;
                tangent += joint.orientation * weight.tangent * weight.bias;
            }
            if self.options.renormalize {
                normal = normal.normalize_or_zero();
                tangent = tangent.normalize_or_zero();
            }

            VertexRecord {
                position: blend_position(joints, weights),
                tex_coord: vertex.tex_coord,
                normal,
                tangent,
            }
        })
    }
}
