use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use scene_anim::{logging, view, Preset, SceneConfig};

/// Animated scene viewer: free-fly camera plus key-toggled doors, furniture
/// and sky.
#[derive(Debug, Parser)]
#[command(name = "scene-anim", version, about)]
struct Cli {
    /// Built-in scene to show when no scene file is given
    #[arg(long, value_enum, default_value = "house")]
    preset: Preset,

    /// TOML scene file; overrides --preset
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the selected scene to this path and exit
    #[arg(long, value_name = "PATH")]
    dump_config: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => SceneConfig::preset(cli.preset),
    };
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    config.validate().context("invalid scene")?;

    if let Some(path) = &cli.dump_config {
        config.store(path)?;
        info!(path = %path.display(), "scene written");
        return Ok(());
    }

    info!(title = %config.title, objects = config.objects.len(), "starting viewer");
    view::run(config)?;
    Ok(())
}
