//! Reader and writer for `wglv` binary vertex/index containers.
//!
//! A container is a 12-byte header (`wglv` magic, version, lump count), a
//! directory of `(tag, offset, length)` entries and the lumps themselves.
//! Two lumps are understood: `vert` holds the vertex format flags, the stride
//! and interleaved vertex bytes; `indx` holds 16-bit triangle indices. Other
//! lumps are skipped.
//!
//! # Examples
//!
//! ```
//! use wgl_vert::{VertexFormat, WglVertFile};
//!
//! let vertices = [0.0f32; 11];
//! let file = WglVertFile::from_floats(VertexFormat::SKINNED, &vertices, &[0, 0, 0]);
//!
//! let bytes = file.to_bytes()?;
//! let decoded = WglVertFile::from_bytes(&bytes)?;
//! assert_eq!(decoded.stride, 44);
//! assert_eq!(decoded.vertex_count(), 1);
//! # Ok::<(), wgl_vert::WglError>(())
//! ```

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod file;
pub mod format;
pub mod header;
pub mod lump;

pub use error::{Result, WglError};
pub use file::WglVertFile;
pub use format::VertexFormat;
pub use header::{MAX_VERSION, WGLV_MAGIC, WglHeader};
pub use lump::{LumpDirectory, LumpEntry, LumpKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
