//! MD5 mesh command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use log::info;
use std::path::{Path, PathBuf};

use md5_model::{
    CompileOptions, ModelBuffers, Severity, Skinner, SkinningOptions, ValidationReport,
    validate_animation, validate_model,
};
use wgl_vert::{VertexFormat, WglVertFile};

use super::{load_animation, load_model, parse_options};
use crate::utils::{
    add_table_row, create_table, format_bytes, format_parent, format_quat, format_vec3,
    print_heading,
};

#[derive(Subcommand)]
pub enum MeshCommands {
    /// Display information about an .md5mesh file
    Info {
        /// Path to the .md5mesh file
        file: PathBuf,

        /// Show the joint table
        #[arg(short, long)]
        detailed: bool,

        /// Fail on the first malformed record
        #[arg(long)]
        strict: bool,
    },

    /// Check references, weights and joint order
    Validate {
        /// Path to the .md5mesh file
        file: PathBuf,

        /// Also check an .md5anim file against the skeleton
        #[arg(long, value_name = "FILE")]
        anim: Option<PathBuf>,
    },

    /// Write the skinned vertex stream to a wglv container
    Export {
        /// Path to the .md5mesh file
        file: PathBuf,

        /// Output path
        #[arg(short, long)]
        output: PathBuf,

        /// Skin against a frame of this .md5anim file instead of the bind pose
        #[arg(long, value_name = "FILE")]
        anim: Option<PathBuf>,

        /// Frame to evaluate (wraps around the frame count)
        #[arg(long, default_value_t = 0)]
        frame: usize,

        /// Renormalize blended normals and tangents
        #[arg(long)]
        renormalize: bool,

        /// Take both tangent texture deltas from the v axis
        #[arg(long)]
        corrected_tangents: bool,
    },
}

pub fn execute(command: MeshCommands) -> Result<()> {
    match command {
        MeshCommands::Info {
            file,
            detailed,
            strict,
        } => execute_info(&file, detailed, strict),
        MeshCommands::Validate { file, anim } => execute_validate(&file, anim.as_deref()),
        MeshCommands::Export {
            file,
            output,
            anim,
            frame,
            renormalize,
            corrected_tangents,
        } => execute_export(
            &file,
            &output,
            anim.as_deref(),
            frame,
            SkinningOptions { renormalize },
            &CompileOptions { corrected_tangents },
        ),
    }
}

fn execute_info(path: &Path, detailed: bool, strict: bool) -> Result<()> {
    let model = load_model(path, &parse_options(strict))?;

    print_heading("MD5 Mesh", path);
    match model.version {
        Some(version) => println!("Version: {version}"),
        None => println!("Version: (missing)"),
    }
    if let Some(commandline) = &model.commandline {
        println!("Command line: {commandline}");
    }
    println!("Joints: {}", model.skeleton.len());
    println!("Meshes: {}", model.meshes.len());
    println!("Vertices: {}", model.vertex_count());
    println!("Triangles: {}", model.triangle_count());
    let stream_bytes = model.vertex_count() * md5_model::VERTEX_STRIDE;
    println!("Vertex stream: {}", format_bytes(stream_bytes as u64));

    println!();
    let mut meshes = create_table(&["#", "Shader", "Vertices", "Triangles", "Weights"]);
    for (index, mesh) in model.meshes.iter().enumerate() {
        add_table_row(
            &mut meshes,
            vec![
                index.to_string(),
                mesh.shader.clone(),
                mesh.vertices.len().to_string(),
                mesh.triangle_count().to_string(),
                mesh.weights.len().to_string(),
            ],
        );
    }
    meshes.printstd();

    if detailed {
        println!();
        let names: Vec<&str> = model
            .skeleton
            .joints()
            .iter()
            .map(|joint| joint.name.as_str())
            .collect();
        let mut joints = create_table(&["#", "Name", "Parent", "Position", "Orientation"]);
        for (index, joint) in model.skeleton.joints().iter().enumerate() {
            add_table_row(
                &mut joints,
                vec![
                    index.to_string(),
                    joint.name.clone(),
                    format_parent(joint.parent, &names),
                    format_vec3(joint.position),
                    format_quat(joint.orientation),
                ],
            );
        }
        joints.printstd();
    }

    Ok(())
}

fn execute_validate(path: &Path, anim: Option<&Path>) -> Result<()> {
    let options = parse_options(false);
    let model = load_model(path, &options)?;

    let mut report = validate_model(&model);
    if let Some(anim_path) = anim {
        let animation = load_animation(anim_path, &options)?;
        report.merge(validate_animation(&animation, Some(&model.skeleton)));
    }

    print_report(path, &report);
    Ok(())
}

/// Print a validation report, errors first
pub fn print_report(path: &Path, report: &ValidationReport) {
    if report.is_clean() {
        println!("✓ {} is valid", path.display());
        return;
    }

    let errors = report.with_severity(Severity::Error).count();
    let warnings = report.with_severity(Severity::Warning).count();
    println!(
        "{} {}: {errors} error(s), {warnings} warning(s)",
        if report.is_valid() { "!" } else { "✗" },
        path.display()
    );
    for issue in report.with_severity(Severity::Error) {
        println!("  error: {issue}");
    }
    for issue in report.with_severity(Severity::Warning) {
        println!("  warning: {issue}");
    }
}

fn execute_export(
    path: &Path,
    output: &Path,
    anim: Option<&Path>,
    frame: usize,
    skinning: SkinningOptions,
    compile: &CompileOptions,
) -> Result<()> {
    let options = parse_options(false);
    let model = load_model(path, &options)?;
    let compiled = model.compile_with(compile);
    let buffers = ModelBuffers::from_compiled(&compiled)
        .with_context(|| format!("Failed to lay out buffers for {}", path.display()))?;

    let pose = match anim {
        Some(anim_path) => {
            let animation = load_animation(anim_path, &options)?;
            info!(
                "evaluating frame {frame} of {} ({} frames)",
                anim_path.display(),
                animation.frame_count()
            );
            animation
                .evaluate(frame)
                .with_context(|| format!("Failed to evaluate {}", anim_path.display()))?
        }
        None => model.skeleton.bind_pose(),
    };

    let skinner = Skinner::new(&compiled, skinning);
    let stream = skinner.skin(&pose);
    let indices = absolute_indices(&buffers)?;

    let file = WglVertFile::from_floats(VertexFormat::SKINNED, stream.as_slice(), &indices);
    file.save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Wrote {} vertices, {} triangles to {}",
        file.vertex_count(),
        file.triangle_count(),
        output.display()
    );
    Ok(())
}

/// Rebase mesh-relative indices onto the single shared vertex buffer
fn absolute_indices(buffers: &ModelBuffers) -> Result<Vec<u16>> {
    let mut indices = Vec::with_capacity(buffers.indices.len());
    for range in &buffers.meshes {
        let end = range.index_offset + range.index_count;
        let mesh_indices = buffers.indices.get(range.index_offset..end).unwrap_or_default();
        for &index in mesh_indices {
            let absolute = usize::from(index) + range.vertex_offset;
            let absolute = u16::try_from(absolute).with_context(|| {
                format!("vertex index {absolute} does not fit in a 16-bit index buffer")
            })?;
            indices.push(absolute);
        }
    }
    Ok(indices)
}
