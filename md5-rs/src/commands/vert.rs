//! wglv container command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use wgl_vert::{LumpDirectory, WglHeader, WglVertFile};

use crate::utils::{add_table_row, create_table, format_bytes, print_heading};

#[derive(Subcommand)]
pub enum VertCommands {
    /// Display the header, lump directory and vertex layout of a wglv file
    Info {
        /// Path to the wglv file
        file: PathBuf,
    },
}

pub fn execute(command: VertCommands) -> Result<()> {
    match command {
        VertCommands::Info { file } => execute_info(&file),
    }
}

fn execute_info(path: &Path) -> Result<()> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let file = WglVertFile::from_bytes(&data)
        .with_context(|| format!("Failed to parse wglv file: {}", path.display()))?;

    let mut cursor = Cursor::new(data.as_slice());
    let header = WglHeader::read(&mut cursor)?;
    let directory = LumpDirectory::read(&mut cursor, header.lump_count)?;

    print_heading("wglv container", path);
    println!("Size: {}", format_bytes(data.len() as u64));
    println!("Version: {}", header.version);
    println!("Lumps: {} ({} skipped)", header.lump_count, directory.skipped());
    println!("Format: {:?} ({:#x})", file.format, file.format.bits());
    println!("Stride: {} bytes", file.stride);
    if file.stride != file.format.stride() {
        println!(
            "  note: the format flags imply a stride of {} bytes",
            file.format.stride()
        );
    }
    println!("Vertices: {}", file.vertex_count());
    println!("Indices: {} ({} triangles)", file.indices.len(), file.triangle_count());

    println!();
    let mut lumps = create_table(&["Tag", "Offset", "Length"]);
    for entry in directory.entries() {
        add_table_row(
            &mut lumps,
            vec![
                entry.kind.to_string(),
                entry.offset.to_string(),
                format_bytes(u64::from(entry.length)),
            ],
        );
    }
    lumps.printstd();

    println!();
    let mut attributes = create_table(&["Attribute", "Offset", "Size"]);
    for flag in file.format.iter() {
        let name = file
            .format
            .iter_names()
            .find(|(_, value)| *value == flag)
            .map_or("?", |(name, _)| name);
        add_table_row(
            &mut attributes,
            vec![
                name.to_string(),
                file.format
                    .offset_of(flag)
                    .map_or_else(|| "-".to_string(), |offset| offset.to_string()),
                flag.attribute_size().to_string(),
            ],
        );
    }
    attributes.printstd();

    Ok(())
}
