//! MD5 animation command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

use md5_model::ChannelMask;

use super::{load_animation, parse_options};
use crate::utils::{
    add_table_row, create_table, format_parent, format_quat, format_vec3, print_heading,
};

#[derive(Subcommand)]
pub enum AnimCommands {
    /// Display information about an .md5anim file
    Info {
        /// Path to the .md5anim file
        file: PathBuf,

        /// Show the hierarchy table
        #[arg(short, long)]
        detailed: bool,

        /// Fail on the first malformed record
        #[arg(long)]
        strict: bool,
    },

    /// Print the world-space pose of one frame
    Pose {
        /// Path to the .md5anim file
        file: PathBuf,

        /// Frame to evaluate (wraps around the frame count)
        #[arg(short, long, default_value_t = 0)]
        frame: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn execute(command: AnimCommands) -> Result<()> {
    match command {
        AnimCommands::Info {
            file,
            detailed,
            strict,
        } => execute_info(&file, detailed, strict),
        AnimCommands::Pose { file, frame, json } => execute_pose(&file, frame, json),
    }
}

const CHANNEL_NAMES: [(ChannelMask, &str); 6] = [
    (ChannelMask::TX, "Tx"),
    (ChannelMask::TY, "Ty"),
    (ChannelMask::TZ, "Tz"),
    (ChannelMask::QX, "Qx"),
    (ChannelMask::QY, "Qy"),
    (ChannelMask::QZ, "Qz"),
];

fn format_channels(channels: ChannelMask) -> String {
    let names: Vec<&str> = CHANNEL_NAMES
        .iter()
        .filter(|(flag, _)| channels.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(" ")
    }
}

fn execute_info(path: &Path, detailed: bool, strict: bool) -> Result<()> {
    let animation = load_animation(path, &parse_options(strict))?;

    print_heading("MD5 Animation", path);
    match animation.version {
        Some(version) => println!("Version: {version}"),
        None => println!("Version: (missing)"),
    }
    println!("Frame rate: {} fps", animation.frame_rate);
    println!("Frames: {}", animation.frame_count());
    println!("Joints: {}", animation.joint_count());
    println!("Animated components: {}", animation.animated_components());
    println!("Duration: {:.3}s", animation.duration().as_secs_f64());
    println!("Bounds: {}", animation.bounds.len());

    if detailed {
        println!();
        let names: Vec<&str> = animation
            .hierarchy
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();
        let mut table = create_table(&["#", "Name", "Parent", "Channels", "Start"]);
        for (index, entry) in animation.hierarchy.iter().enumerate() {
            add_table_row(
                &mut table,
                vec![
                    index.to_string(),
                    entry.name.clone(),
                    format_parent(entry.parent, &names),
                    format_channels(entry.channels),
                    entry.start.to_string(),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn execute_pose(path: &Path, frame: usize, json: bool) -> Result<()> {
    let animation = load_animation(path, &parse_options(false))?;
    let pose = animation
        .evaluate(frame)
        .with_context(|| format!("Failed to evaluate frame {frame} of {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pose)?);
        return Ok(());
    }

    let mut table = create_table(&["#", "Name", "Position", "Orientation"]);
    for (index, joint) in pose.joints().iter().enumerate() {
        let name = animation
            .hierarchy
            .get(index)
            .map_or("", |entry| entry.name.as_str());
        add_table_row(
            &mut table,
            vec![
                index.to_string(),
                name.to_string(),
                format_vec3(joint.position),
                format_quat(joint.orientation),
            ],
        );
    }
    table.printstd();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_channels() {
        assert_eq!(format_channels(ChannelMask::empty()), "-");
        assert_eq!(format_channels(ChannelMask::TX | ChannelMask::QZ), "Tx Qz");
        assert_eq!(format_channels(ChannelMask::all()), "Tx Ty Tz Qx Qy Qz");
    }
}
