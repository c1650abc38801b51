//! Whole-container reading and writing

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, warn};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use crate::error::{Result, WglError};
use crate::format::VertexFormat;
use crate::header::{HEADER_SIZE, MAX_VERSION, WglHeader};
use crate::lump::{LUMP_ENTRY_SIZE, LumpDirectory, LumpEntry, LumpKind};

/// Bytes before the vertex data inside a `vert` lump
const VERT_LUMP_PREFIX: usize = 8;

/// Lumps are placed on 4-byte boundaries when writing
const LUMP_ALIGNMENT: usize = 4;

/// A decoded wglv container: one vertex buffer and one index buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WglVertFile {
    /// Container version
    pub version: u32,
    /// Attributes present in each vertex
    pub format: VertexFormat,
    /// Bytes per vertex
    pub stride: u32,
    /// Interleaved vertex bytes
    pub vertex_data: Vec<u8>,
    /// Triangle indices
    pub indices: Vec<u16>,
}

impl WglVertFile {
    /// Build a container from interleaved `f32` vertex data
    pub fn from_floats(format: VertexFormat, vertices: &[f32], indices: &[u16]) -> Self {
        let mut vertex_data = vec![0; vertices.len() * 4];
        LittleEndian::write_f32_into(vertices, &mut vertex_data);
        Self {
            version: MAX_VERSION,
            format,
            stride: format.stride(),
            vertex_data,
            indices: indices.to_vec(),
        }
    }

    /// Parse a container held in memory
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let header = WglHeader::read(&mut cursor)?;
        let directory = LumpDirectory::read(&mut cursor, header.lump_count)?;
        debug!(
            "wglv v{}: {} lumps, {} known",
            header.version,
            header.lump_count,
            directory.entries().len()
        );

        let vert = directory
            .get(LumpKind::Vertex)
            .ok_or(WglError::MissingLump("vert"))?
            .slice(data)?;
        if vert.len() < VERT_LUMP_PREFIX {
            return Err(WglError::InvalidLump {
                tag: "vert",
                reason: format!("{} bytes is shorter than the 8 byte prefix", vert.len()),
            });
        }
        let raw_format = LittleEndian::read_u32(&vert[0..4]);
        let format = VertexFormat::from_bits_truncate(raw_format);
        if format.bits() != raw_format {
            warn!("vertex format {raw_format:#x} has unknown flags");
        }
        let stride = LittleEndian::read_u32(&vert[4..8]);
        let vertex_data = vert[VERT_LUMP_PREFIX..].to_vec();

        let indx = directory
            .get(LumpKind::Index)
            .ok_or(WglError::MissingLump("indx"))?
            .slice(data)?;
        if indx.len() % 2 != 0 {
            debug!("index lump has a trailing odd byte");
        }
        let mut indices = vec![0; indx.len() / 2];
        LittleEndian::read_u16_into(&indx[..indices.len() * 2], &mut indices);

        Ok(Self {
            version: header.version,
            format,
            stride,
            vertex_data,
            indices,
        })
    }

    /// Parse a container from a reader
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Parse a container file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?)
    }

    /// Number of whole vertices
    pub fn vertex_count(&self) -> usize {
        match self.stride {
            0 => 0,
            stride => self.vertex_data.len() / stride as usize,
        }
    }

    /// Number of whole triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex data decoded as little-endian `f32`s
    pub fn vertex_floats(&self) -> Vec<f32> {
        let mut floats = vec![0.0; self.vertex_data.len() / 4];
        LittleEndian::read_f32_into(&self.vertex_data[..floats.len() * 4], &mut floats);
        floats
    }

    /// Directory the writer produces: `vert` then `indx`, each 4-byte aligned
    pub fn directory(&self) -> Result<LumpDirectory> {
        let vert_offset = align(HEADER_SIZE + 2 * LUMP_ENTRY_SIZE);
        let vert_length = VERT_LUMP_PREFIX + self.vertex_data.len();
        let indx_offset = align(vert_offset + vert_length);
        let indx_length = self.indices.len() * 2;

        // The end of the last lump must be addressable too.
        let to_u32 = |value: usize, tag| u32::try_from(value).map_err(|_| WglError::TooLarge(tag));
        to_u32(indx_offset + indx_length, "indx")?;

        Ok(LumpDirectory::new(vec![
            LumpEntry {
                kind: LumpKind::Vertex,
                offset: to_u32(vert_offset, "vert")?,
                length: to_u32(vert_length, "vert")?,
            },
            LumpEntry {
                kind: LumpKind::Index,
                offset: to_u32(indx_offset, "indx")?,
                length: to_u32(indx_length, "indx")?,
            },
        ]))
    }

    /// Write header, directory, `vert` and `indx`
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Encode the container
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let directory = self.directory()?;
        let mut out = Vec::new();

        WglHeader {
            version: self.version,
            lump_count: directory.entries().len() as u32,
        }
        .write(&mut out)?;
        for entry in directory.entries() {
            entry.write(&mut out)?;
        }

        for entry in directory.entries() {
            out.resize(entry.offset as usize, 0);
            match entry.kind {
                LumpKind::Vertex => {
                    out.write_u32::<LittleEndian>(self.format.bits())?;
                    out.write_u32::<LittleEndian>(self.stride)?;
                    out.extend_from_slice(&self.vertex_data);
                }
                LumpKind::Index => {
                    for &index in &self.indices {
                        out.write_u16::<LittleEndian>(index)?;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Write the container to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

fn align(offset: usize) -> usize {
    offset.next_multiple_of(LUMP_ALIGNMENT)
}
