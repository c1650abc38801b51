//! wglv file header

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::error::{Result, WglError};

/// `wglv` as a little-endian u32
pub const WGLV_MAGIC: u32 = u32::from_le_bytes(*b"wglv");

/// Newest container version this crate reads and writes
pub const MAX_VERSION: u32 = 1;

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 12;

/// Fixed header preceding the lump directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WglHeader {
    /// Container version
    pub version: u32,
    /// Number of directory entries
    pub lump_count: u32,
}

impl WglHeader {
    /// Read and check magic and version
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_u32::<LittleEndian>()?;
        if magic != WGLV_MAGIC {
            return Err(WglError::InvalidMagic {
                found: String::from_utf8_lossy(&magic.to_le_bytes()).into_owned(),
            });
        }

        let version = reader.read_u32::<LittleEndian>()?;
        if version > MAX_VERSION {
            return Err(WglError::UnsupportedVersion(version));
        }

        let lump_count = reader.read_u32::<LittleEndian>()?;
        Ok(Self {
            version,
            lump_count,
        })
    }

    /// Write magic, version and lump count
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(WGLV_MAGIC)?;
        writer.write_u32::<LittleEndian>(self.version)?;
        writer.write_u32::<LittleEndian>(self.lump_count)?;
        Ok(())
    }
}
