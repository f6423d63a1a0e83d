//! Level tooling for Sidescroll
//!
//! Usage:
//!   cargo xtask check-level <path>            # Validate a level and list authoring problems
//!   cargo xtask sample-level <path> [--plain] # Write the built-in sample level

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use sidescroll::world::{load_level, sample_level, save_level, save_level_plain};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Level tooling for Sidescroll")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a level file and print every scene's diagnostics
    CheckLevel {
        path: PathBuf,
        /// Treat authoring diagnostics as errors
        #[arg(long)]
        strict: bool,
    },
    /// Write the built-in sample level
    SampleLevel {
        path: PathBuf,
        /// Write plain RON instead of brotli-compressed
        #[arg(long)]
        plain: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckLevel { path, strict } => check_level(&path, strict),
        Commands::SampleLevel { path, plain } => write_sample(&path, plain),
    }
}

fn check_level(path: &Path, strict: bool) -> Result<()> {
    let level = load_level(path).with_context(|| format!("Failed to load {}", path.display()))?;
    let start = level.start_scene.clone();
    let graph = level.into_scene_graph().context("Level has no playable scenes")?;

    println!("{}: {} scene(s), start = {}", path.display(), graph.scenes().len(),
        start.as_deref().unwrap_or("<first>"));

    let mut problems = 0;
    for scene in graph.scenes() {
        let diagnostics = graph.diagnostics_for(&scene.id);
        let status = if diagnostics.is_empty() { "ok" } else { "!!" };
        println!("  [{}] {} ({} bodies, {} zones)", status, scene.id, scene.bodies.len(), scene.zones.len());
        for diag in &diagnostics {
            println!("       - {}", diag);
        }
        problems += diagnostics.len();
    }

    if problems > 0 {
        println!("{} authoring problem(s)", problems);
        if strict {
            anyhow::bail!("{} has authoring problems", path.display());
        }
    }
    Ok(())
}

fn write_sample(path: &Path, plain: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let level = sample_level();
    let written = if plain {
        save_level_plain(&level, path)
    } else {
        save_level(&level, path)
    };
    written.with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote sample level to {}", path.display());
    Ok(())
}
