//! SnapCanvas CLI - replay and validate canvas scenes.
//!
//! A scene file holds a canvas configuration, items and a script of timed
//! pointer and layout actions. `replay` runs the script through the engine and
//! prints the resulting items and events as JSON.

mod scene;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scene::Scene;
use serde::Serialize;
use std::path::PathBuf;

/// SnapCanvas CLI - drive the positioning engine from scene files
#[derive(Parser)]
#[command(name = "snapcanvas")]
#[command(about = "Replay and check SnapCanvas scene files")]
struct Cli {
    /// Print compact JSON instead of pretty-printed
    #[arg(short, long)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scene's script and print the final items and events
    Replay {
        /// Path to the scene JSON file
        scene: PathBuf,
    },

    /// Validate a scene and print its normalized items
    Check {
        /// Path to the scene JSON file
        scene: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { scene } => {
            log::info!("Replaying {}", scene.display());
            let report = Scene::load(&scene)?.replay()?;
            print_json(&report, cli.compact)
        }
        Commands::Check { scene } => {
            let items = scene::check(&scene)?;
            log::info!("{} items OK", items.len());
            print_json(&items, cli.compact)
        }
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", json);
    Ok(())
}
