//! Interleaved vertex stream layout and combined model buffers
//!
//! Every vertex is eleven `f32`s:
//!
//! | Attribute | Floats | Byte offset |
//! |-----------|--------|-------------|
//! | position  | 3      | 0           |
//! | tex coord | 2      | 12          |
//! | normal    | 3      | 20          |
//! | tangent   | 3      | 32          |
//!
//! Bind-pose and skinned streams share this layout, so a skinned stream can
//! replace the bind-pose one in place.

use glam::{Vec2, Vec3};

use crate::compile::{CompiledMesh, CompiledModel, CompiledVertex};
use crate::error::{Md5Error, Result};

/// Floats per vertex record
pub const VERTEX_ELEMENTS: usize = 11;
/// Bytes per vertex record
pub const VERTEX_STRIDE: usize = VERTEX_ELEMENTS * 4;
/// Byte offset of the position attribute
pub const POSITION_OFFSET: usize = 0;
/// Byte offset of the texture coordinate attribute
pub const TEX_COORD_OFFSET: usize = 12;
/// Byte offset of the normal attribute
pub const NORMAL_OFFSET: usize = 20;
/// Byte offset of the tangent attribute
pub const TANGENT_OFFSET: usize = 32;

/// One decoded vertex record
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct VertexRecord {
    /// Position
    pub position: Vec3,
    /// Texture coordinate
    pub tex_coord: Vec2,
    /// Normal
    pub normal: Vec3,
    /// Tangent
    pub tangent: Vec3,
}

impl VertexRecord {
    /// Decode a record from its eleven floats
    pub fn from_slice(record: &[f32; VERTEX_ELEMENTS]) -> Self {
        Self {
            position: Vec3::from_slice(&record[0..3]),
            tex_coord: Vec2::from_slice(&record[3..5]),
            normal: Vec3::from_slice(&record[5..8]),
            tangent: Vec3::from_slice(&record[8..11]),
        }
    }

    /// Encode the record into its eleven floats
    pub fn write_to(&self, record: &mut [f32; VERTEX_ELEMENTS]) {
        self.position.write_to_slice(&mut record[0..3]);
        self.tex_coord.write_to_slice(&mut record[3..5]);
        self.normal.write_to_slice(&mut record[5..8]);
        self.tangent.write_to_slice(&mut record[8..11]);
    }
}

impl From<&CompiledVertex> for VertexRecord {
    fn from(vertex: &CompiledVertex) -> Self {
        Self {
            position: vertex.position,
            tex_coord: vertex.tex_coord,
            normal: vertex.normal,
            tangent: vertex.tangent,
        }
    }
}

/// Interleaved vertex records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexStream {
    data: Vec<f32>,
}

impl VertexStream {
    /// A zeroed stream of `vertex_count` records
    pub fn zeroed(vertex_count: usize) -> Self {
        Self {
            data: vec![0.0; vertex_count * VERTEX_ELEMENTS],
        }
    }

    /// Wrap raw floats; a trailing partial record is dropped
    pub fn from_vec(mut data: Vec<f32>) -> Self {
        data.truncate(data.len() - data.len() % VERTEX_ELEMENTS);
        Self { data }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.data.len() / VERTEX_ELEMENTS
    }

    /// Whether the stream holds no records
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw floats
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Raw floats, mutable
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Decode one record
    pub fn vertex(&self, index: usize) -> Option<VertexRecord> {
        let start = index.checked_mul(VERTEX_ELEMENTS)?;
        let record = self.data.get(start..start + VERTEX_ELEMENTS)?;
        record.try_into().ok().map(VertexRecord::from_slice)
    }

    /// Decode every record in order
    pub fn iter(&self) -> impl Iterator<Item = VertexRecord> + '_ {
        self.data
            .chunks_exact(VERTEX_ELEMENTS)
            .filter_map(|record| record.try_into().ok().map(VertexRecord::from_slice))
    }

    /// Little-endian bytes of the whole stream
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|value| value.to_le_bytes()).collect()
    }

    /// Consume the stream, returning the raw floats
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// Where one mesh lives inside [`ModelBuffers`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct MeshRange {
    /// Material name
    pub shader: String,
    /// First vertex record of the mesh
    pub vertex_offset: usize,
    /// Number of vertex records
    pub vertex_count: usize,
    /// First index of the mesh
    pub index_offset: usize,
    /// Number of indices
    pub index_count: usize,
}

impl MeshRange {
    /// Byte offset of the mesh's first vertex record
    pub fn vertex_byte_offset(&self) -> usize {
        self.vertex_offset * VERTEX_STRIDE
    }

    /// Byte offset of the mesh's first index
    pub fn index_byte_offset(&self) -> usize {
        self.index_offset * 2
    }
}

/// All meshes of a model packed into one vertex and one index stream
///
/// Indices are relative to their mesh's first vertex; draw each mesh with its
/// vertex attributes based at [`MeshRange::vertex_byte_offset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelBuffers {
    /// Interleaved records of every mesh, in mesh order
    pub vertices: VertexStream,
    /// Triangle indices of every mesh, in mesh order
    pub indices: Vec<u16>,
    /// Per-mesh ranges
    pub meshes: Vec<MeshRange>,
}

impl ModelBuffers {
    /// Lay out the meshes and fill the stream with the bind pose
    ///
    /// Fails with [`Md5Error::IndexOverflow`] when a triangle index does not
    /// fit in 16 bits.
    pub fn from_compiled(model: &CompiledModel) -> Result<Self> {
        let mut buffers = Self::layout(model.meshes())?;
        let records = buffers
            .vertices
            .as_mut_slice()
            .chunks_exact_mut(VERTEX_ELEMENTS);
        let vertices = model.meshes().iter().flat_map(|mesh| &mesh.vertices);
        for (record, vertex) in records.zip(vertices) {
            if let Ok(record) = <&mut [f32; VERTEX_ELEMENTS]>::try_from(record) {
                VertexRecord::from(vertex).write_to(record);
            }
        }
        Ok(buffers)
    }

    /// Ranges and indices for the meshes, with a zeroed vertex stream
    fn layout(meshes: &[CompiledMesh]) -> Result<Self> {
        let mut ranges = Vec::with_capacity(meshes.len());
        let mut indices = Vec::new();
        let mut vertex_offset = 0;

        for mesh in meshes {
            let index_offset = indices.len();
            for &index in &mesh.triangles {
                let index = u16::try_from(index)
                    .map_err(|_| Md5Error::IndexOverflow(index as usize))?;
                indices.push(index);
            }
            ranges.push(MeshRange {
                shader: mesh.shader.clone(),
                vertex_offset,
                vertex_count: mesh.vertices.len(),
                index_offset,
                index_count: mesh.triangles.len(),
            });
            vertex_offset += mesh.vertices.len();
        }

        Ok(Self {
            vertices: VertexStream::zeroed(vertex_offset),
            indices,
            meshes: ranges,
        })
    }

    /// Little-endian bytes of the index stream
    pub fn index_bytes(&self) -> Vec<u8> {
        self.indices.iter().flat_map(|index| index.to_le_bytes()).collect()
    }
}
