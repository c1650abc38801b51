//! Lump directory

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::fmt;
use std::io::{Read, Write};

use crate::error::{Result, WglError};

/// Size of one directory entry in bytes
pub const LUMP_ENTRY_SIZE: usize = 12;

/// Lumps this crate understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LumpKind {
    /// `vert`: format flags, stride, interleaved vertex data
    Vertex,
    /// `indx`: 16-bit triangle indices
    Index,
}

impl LumpKind {
    /// Four-character tag
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Vertex => "vert",
            Self::Index => "indx",
        }
    }

    /// Tag as stored in the directory
    pub const fn tag_id(self) -> u32 {
        match self {
            Self::Vertex => u32::from_le_bytes(*b"vert"),
            Self::Index => u32::from_le_bytes(*b"indx"),
        }
    }

    /// Decode a directory tag; `None` for lumps this crate does not know
    pub fn from_tag_id(id: u32) -> Option<Self> {
        match &id.to_le_bytes() {
            b"vert" => Some(Self::Vertex),
            b"indx" => Some(Self::Index),
            _ => None,
        }
    }
}

impl fmt::Display for LumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A known lump's location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumpEntry {
    /// What the lump holds
    pub kind: LumpKind,
    /// Byte offset from the start of the file
    pub offset: u32,
    /// Length in bytes
    pub length: u32,
}

impl LumpEntry {
    /// The lump's bytes within `data`
    pub fn slice<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        let start = self.offset as usize;
        start
            .checked_add(self.length as usize)
            .and_then(|end| data.get(start..end))
            .ok_or_else(|| WglError::LumpOutOfBounds {
                tag: self.kind.tag().to_string(),
                offset: self.offset,
                length: self.length,
                file_size: data.len(),
            })
    }

    /// Write the entry
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.kind.tag_id())?;
        writer.write_u32::<LittleEndian>(self.offset)?;
        writer.write_u32::<LittleEndian>(self.length)?;
        Ok(())
    }
}

/// Known lumps of a file, decoded once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LumpDirectory {
    entries: Vec<LumpEntry>,
    skipped: usize,
}

impl LumpDirectory {
    /// Read `count` directory entries, dropping unknown tags
    pub fn read<R: Read>(reader: &mut R, count: u32) -> Result<Self> {
        let mut directory = Self::default();
        for _ in 0..count {
            let tag = reader.read_u32::<LittleEndian>()?;
            let offset = reader.read_u32::<LittleEndian>()?;
            let length = reader.read_u32::<LittleEndian>()?;

            match LumpKind::from_tag_id(tag) {
                Some(kind) => directory.entries.push(LumpEntry {
                    kind,
                    offset,
                    length,
                }),
                None => {
                    debug!(
                        "ignoring unknown lump '{}'",
                        String::from_utf8_lossy(&tag.to_le_bytes())
                    );
                    directory.skipped += 1;
                }
            }
        }
        Ok(directory)
    }

    /// Create a directory from entries
    pub fn new(entries: Vec<LumpEntry>) -> Self {
        Self {
            entries,
            skipped: 0,
        }
    }

    /// Known entries in file order
    pub fn entries(&self) -> &[LumpEntry] {
        &self.entries
    }

    /// Number of unknown entries dropped while reading
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// The last entry of a kind, matching readers that let later lumps win
    pub fn get(&self, kind: LumpKind) -> Option<&LumpEntry> {
        self.entries.iter().rev().find(|entry| entry.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry_bytes(tag: &[u8; 4], offset: u32, length: u32) -> Vec<u8> {
        let mut data = tag.to_vec();
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&length.to_le_bytes());
        data
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in [LumpKind::Vertex, LumpKind::Index] {
            assert_eq!(LumpKind::from_tag_id(kind.tag_id()), Some(kind));
        }
        assert_eq!(LumpKind::from_tag_id(u32::from_le_bytes(*b"bone")), None);
    }

    #[test]
    fn test_unknown_lumps_are_skipped() {
        let mut data = entry_bytes(b"vert", 48, 16);
        data.extend(entry_bytes(b"bone", 64, 4));
        data.extend(entry_bytes(b"indx", 68, 6));

        let directory = LumpDirectory::read(&mut Cursor::new(data), 3).unwrap();
        assert_eq!(directory.entries().len(), 2);
        assert_eq!(directory.skipped(), 1);
        assert_eq!(directory.get(LumpKind::Index).unwrap().offset, 68);
    }

    #[test]
    fn test_slice_bounds() {
        let data = [0u8; 10];
        let entry = LumpEntry {
            kind: LumpKind::Index,
            offset: 8,
            length: 4,
        };
        assert!(matches!(
            entry.slice(&data),
            Err(WglError::LumpOutOfBounds { file_size: 10, .. })
        ));

        let entry = LumpEntry { length: 2, ..entry };
        assert_eq!(entry.slice(&data).unwrap().len(), 2);
    }
}
