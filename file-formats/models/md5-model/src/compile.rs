//! Bind-pose compiler
//!
//! Turns a weighted mesh into bind-pose vertex attributes and, for every
//! influence, a normal and tangent expressed in the influencing joint's local
//! space. With those bases stored on the weights, re-skinning a new pose never
//! has to revisit the triangle list.
//!
//! # Boundary cases
//!
//! A vertex that no triangle references accumulates nothing; its normal and
//! tangent stay the zero vector, and so do the joint-local bases derived from
//! them.
//!
//! # Tangents
//!
//! By default each face tangent is `t·a − s·b` with `a = p1 − p0`,
//! `b = p2 − p0`, `s = uv1.v − uv0.v` and `t = uv2.u − uv0.v`. The `t` term
//! mixes the u and v axes; [`CompileOptions::corrected_tangents`] switches it
//! to `t = uv2.v − uv0.v`.

use glam::{Vec2, Vec3};
use log::warn;

use crate::mesh::{Mesh, WeightRange};
use crate::skeleton::{JointPose, Skeleton};

/// Options for the bind-pose compiler
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Use the v axis for both texture deltas of the face tangent
    pub corrected_tangents: bool,
}

/// A vertex with bind-pose attributes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompiledVertex {
    /// Bind-pose position in model space
    pub position: Vec3,
    /// Texture coordinate
    pub tex_coord: Vec2,
    /// Unit bind-pose normal (zero for isolated vertices)
    pub normal: Vec3,
    /// Unit bind-pose tangent (zero for isolated vertices)
    pub tangent: Vec3,
    /// Weights influencing this vertex
    pub weights: WeightRange,
}

/// An influence annotated with joint-local normal and tangent bases
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompiledWeight {
    /// Influencing joint
    pub joint: usize,
    /// Contribution of this influence
    pub bias: f32,
    /// Offset from the joint in joint-local space
    pub position: Vec3,
    /// Vertex normal in joint-local space (zero when `bias` is zero)
    pub normal: Vec3,
    /// Vertex tangent in joint-local space (zero when `bias` is zero)
    pub tangent: Vec3,
}

/// A compiled mesh, ready for runtime skinning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledMesh {
    /// Material name
    pub shader: String,
    /// Bind-pose vertices
    pub vertices: Vec<CompiledVertex>,
    /// Triangle list, three vertex indices per triangle
    pub triangles: Vec<u32>,
    /// Annotated weights
    pub weights: Vec<CompiledWeight>,
}

impl CompiledMesh {
    /// The weights influencing a vertex; empty when its range is out of bounds
    pub fn vertex_weights(&self, vertex: &CompiledVertex) -> &[CompiledWeight] {
        self.weights
            .get(vertex.weights.as_range())
            .unwrap_or_default()
    }
}

/// Every mesh of a model after bind-pose compilation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledModel {
    meshes: Vec<CompiledMesh>,
    joint_count: usize,
}

impl CompiledModel {
    /// Wrap compiled meshes for a skeleton of `joint_count` joints
    pub fn new(meshes: Vec<CompiledMesh>, joint_count: usize) -> Self {
        Self {
            meshes,
            joint_count,
        }
    }

    /// Compiled meshes in file order
    pub fn meshes(&self) -> &[CompiledMesh] {
        &self.meshes
    }

    /// Joint count of the skeleton the meshes were compiled against
    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    /// Total vertex count over all meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices.len()).sum()
    }
}

/// Blend an influence list into a position for the given joint transforms.
///
/// Influences naming a joint outside `joints` contribute nothing.
pub(crate) fn blend_position(joints: &[JointPose], weights: &[CompiledWeight]) -> Vec3 {
    weights
        .iter()
        .filter_map(|weight| {
            let joint = joints.get(weight.joint)?;
            Some(joint.transform_point(weight.position) * weight.bias)
        })
        .sum()
}

/// Compile one mesh against the skeleton's bind pose with default options
pub fn compile_mesh(skeleton: &Skeleton, mesh: &Mesh) -> CompiledMesh {
    compile_mesh_with(skeleton, mesh, &CompileOptions::default())
}

/// Compile one mesh against the skeleton's bind pose
pub fn compile_mesh_with(
    skeleton: &Skeleton,
    mesh: &Mesh,
    options: &CompileOptions,
) -> CompiledMesh {
    let bind = skeleton.bind_pose();
    let joints = bind.joints();

    let mut weights: Vec<CompiledWeight> = mesh
        .weights
        .iter()
        .enumerate()
        .map(|(index, weight)| {
            if weight.joint >= joints.len() {
                warn!(
                    "mesh '{}': weight {index} references joint {} of {}",
                    mesh.shader,
                    weight.joint,
                    joints.len()
                );
            }
            CompiledWeight {
                joint: weight.joint,
                bias: weight.bias,
                position: weight.position,
                normal: Vec3::ZERO,
                tangent: Vec3::ZERO,
            }
        })
        .collect();

    let mut vertices: Vec<CompiledVertex> = mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(index, vertex)| {
            let influences = weights.get(vertex.weights.as_range()).unwrap_or_else(|| {
                warn!(
                    "mesh '{}': vertex {index} weight range {:?} exceeds {} weights",
                    mesh.shader,
                    vertex.weights.as_range(),
                    weights.len()
                );
                &[][..]
            });
            CompiledVertex {
                position: blend_position(joints, influences),
                tex_coord: vertex.tex_coord,
                normal: Vec3::ZERO,
                tangent: Vec3::ZERO,
                weights: vertex.weights,
            }
        })
        .collect();

    accumulate_faces(&mesh.shader, &mesh.triangles, options, &mut vertices);

    for vertex in &mut vertices {
        vertex.normal = vertex.normal.normalize_or_zero();
        vertex.tangent = vertex.tangent.normalize_or_zero();

        let Some(influences) = weights.get_mut(vertex.weights.as_range()) else {
            continue;
        };
        for weight in influences.iter_mut().filter(|weight| weight.bias != 0.0) {
            let Some(joint) = joints.get(weight.joint) else {
                continue;
            };
            let inverse = joint.orientation.inverse();
            weight.normal = inverse * vertex.normal;
            weight.tangent = inverse * vertex.tangent;
        }
    }

    CompiledMesh {
        shader: mesh.shader.clone(),
        vertices,
        triangles: mesh.triangles.clone(),
        weights,
    }
}

/// Add every triangle's unnormalized face normal and tangent to its corners.
///
/// With `a = p1 - p0` and `b = p2 - p0` the face normal is `b × a`, i.e. the
/// triangles are wound clockwise. See the module docs for the tangent.
fn accumulate_faces(
    shader: &str,
    triangles: &[u32],
    options: &CompileOptions,
    vertices: &mut [CompiledVertex],
) {
    for (index, tri) in triangles.chunks_exact(3).enumerate() {
        let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(v0), Some(v1), Some(v2)) = (
            vertices.get(corners[0]),
            vertices.get(corners[1]),
            vertices.get(corners[2]),
        ) else {
            warn!(
                "mesh '{shader}': triangle {index} references a vertex outside 0..{}",
                vertices.len()
            );
            continue;
        };

        let a = v1.position - v0.position;
        let b = v2.position - v0.position;
        let normal = b.cross(a);

        let dv1 = v1.tex_coord.y - v0.tex_coord.y;
        let dv2 = if options.corrected_tangents {
            v2.tex_coord.y - v0.tex_coord.y
        } else {
            v2.tex_coord.x - v0.tex_coord.y
        };
        let tangent = a * dv2 - b * dv1;

        for corner in corners {
            vertices[corner].normal += normal;
            vertices[corner].tangent += tangent;
        }
    }
}
