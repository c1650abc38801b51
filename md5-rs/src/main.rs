//! `md5-rs`: inspect, validate and export MD5 meshes and wglv containers

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::LevelFilter;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Mesh { command } => commands::mesh::execute(command),
        Commands::Anim { command } => commands::anim::execute(command),
        Commands::Vert { command } => commands::vert::execute(command),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises and `-q` lowers the default `warn`
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (verbose, quiet) {
        (0, true) => LevelFilter::Error,
        (0, false) => LevelFilter::Warn,
        (1, _) => LevelFilter::Info,
        (2, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
