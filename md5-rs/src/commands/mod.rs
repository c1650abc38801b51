//! Command implementations

pub mod anim;
pub mod mesh;
pub mod vert;

use anyhow::{Context, Result};
use md5_model::{Animation, Md5Model, ParseOptions};
use std::fs;
use std::path::Path;

/// Parse options selected by a `--strict` flag
pub fn parse_options(strict: bool) -> ParseOptions {
    if strict {
        ParseOptions::strict()
    } else {
        ParseOptions::default()
    }
}

/// Read and parse an `.md5mesh` file
pub fn load_model(path: &Path, options: &ParseOptions) -> Result<Md5Model> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read mesh file: {}", path.display()))?;
    Md5Model::parse(&text, options)
        .with_context(|| format!("Failed to parse mesh file: {}", path.display()))
}

/// Read and parse an `.md5anim` file
pub fn load_animation(path: &Path, options: &ParseOptions) -> Result<Animation> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read animation file: {}", path.display()))?;
    Animation::parse(&text, options)
        .with_context(|| format!("Failed to parse animation file: {}", path.display()))
}
