//! Skeletal mesh binding and animation for idTech 4 MD5 files.
//!
//! The crate reads `.md5mesh` and `.md5anim` text, compiles a bind-pose
//! vertex stream, evaluates animation frames into world-space joint poses and
//! re-skins vertices against those poses.
//!
//! # Examples
//!
//! ```
//! use md5_model::{Animation, Md5Model, ModelBuffers, ParseOptions, Skinner, SkinningOptions};
//!
//! let mesh = r#"
//! MD5Version 10
//! joints {
//!     "root" -1 ( 0 0 0 ) ( 0 0 0 )
//! }
//! mesh {
//!     shader "skin"
//!     vert 0 ( 0 0 ) 0 1
//!     vert 1 ( 1 0 ) 1 1
//!     vert 2 ( 0 1 ) 2 1
//!     tri 0 0 2 1
//!     weight 0 0 1.0 ( 0 0 0 )
//!     weight 1 0 1.0 ( 1 0 0 )
//!     weight 2 0 1.0 ( 0 1 0 )
//! }
//! "#;
//! let anim = r#"
//! MD5Version 10
//! hierarchy {
//!     "root" -1 1 0
//! }
//! baseframe {
//!     ( 0 0 0 ) ( 0 0 0 )
//! }
//! frame 0 {
//!     2.0
//! }
//! "#;
//!
//! let options = ParseOptions::default();
//! let model = Md5Model::parse(mesh, &options)?;
//! let anim = Animation::parse(anim, &options)?;
//!
//! let compiled = model.compile();
//! let mut buffers = ModelBuffers::from_compiled(&compiled)?;
//!
//! let skinner = Skinner::new(&compiled, SkinningOptions::default());
//! let pose = anim.evaluate(0)?;
//! skinner.skin_into(&pose, buffers.vertices.as_mut_slice())?;
//!
//! assert_eq!(buffers.vertices.vertex(1).unwrap().position.x, 3.0);
//! # Ok::<(), md5_model::Md5Error>(())
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod animation;
pub mod compile;
pub mod error;
pub mod faceted;
pub mod mesh;
pub mod model;
pub mod parser;
pub mod skeleton;
pub mod skinning;
pub mod validation;
pub mod vertex;

pub use glam;

pub use animation::{
    Animation, BaseFrameJoint, Bounds, ChannelMask, DEFAULT_FRAME_RATE, Frame, HierarchyEntry,
    parse_base_frame, parse_bounds, parse_frames, parse_hierarchy,
};
pub use compile::{
    CompileOptions, CompiledMesh, CompiledModel, CompiledVertex, CompiledWeight, compile_mesh,
    compile_mesh_with,
};
pub use error::{Md5Error, Result};
pub use faceted::FacetedMesh;
pub use mesh::{Mesh, Vertex, Weight, WeightRange, parse_meshes};
pub use model::{MD5_VERSION, Md5Model};
pub use parser::{ParseOptions, Strictness};
pub use skeleton::{Joint, JointPose, Pose, Skeleton, parse_skeleton, quat_from_xyz};
pub use skinning::{Skinner, SkinningOptions};
pub use validation::{
    Severity, ValidationIssue, ValidationReport, validate_animation, validate_model,
    validate_skeleton,
};
pub use vertex::{MeshRange, ModelBuffers, VERTEX_ELEMENTS, VERTEX_STRIDE, VertexRecord, VertexStream};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
