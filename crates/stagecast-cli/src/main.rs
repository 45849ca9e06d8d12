mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use stagecast_core::StagecastConfig;
use stagecast_ir::project::find_preset;
use stagecast_ir::validate::lint_project;
use stagecast_ir::{import_document, normalize_project, ProjectConfig, CANVAS_PRESETS};
use stagecast_render::{compute_tiles, ViewportSize};

#[derive(Parser)]
#[command(
    name = "stagecast",
    version,
    about = "Stagecast: layered overlay scenes for live streams",
    long_about = "Stagecast composes image, GIF and video layers into a broadcast canvas.\nCheck and normalize scene documents, inspect the live tiling, and render\npreview or live frames to PNG."
)]
struct Cli {
    /// Settings file (preview, live view, media root, logging)
    #[arg(long, global = true, default_value = "stagecast.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a scene document and report problems
    Check {
        /// Path to the scene JSON
        #[arg()]
        file: PathBuf,
    },

    /// Print the normalized form of a scene document
    Normalize {
        #[arg()]
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the live-view tile layout for a window size as JSON
    Tiles {
        #[arg()]
        file: PathBuf,

        /// Window size, e.g. 2560x1440
        #[arg(long)]
        viewport: ViewportSize,
    },

    /// Rasterize the preview (or, with --viewport, the live view) to PNG
    Render {
        #[arg()]
        file: PathBuf,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Simulated seconds of scroll animation before capture
        #[arg(long, default_value_t = 0.0)]
        time: f64,

        /// Preview scale (defaults to the config value)
        #[arg(long)]
        scale: Option<f64>,

        /// Render the tiled live view for this window size instead
        #[arg(long)]
        viewport: Option<ViewportSize>,
    },

    /// List the built-in canvas presets, or show one by name
    Presets {
        #[arg()]
        name: Option<String>,
    },

    /// Write a settings file with every default filled in
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { file } => cmd_check(&file),
        Commands::Normalize { file, output } => cmd_normalize(&file, output.as_deref()),
        Commands::Tiles { file, viewport } => cmd_tiles(&file, viewport),
        Commands::Render {
            file,
            output,
            time,
            scale,
            viewport,
        } => render::cmd_render(
            &config,
            render::RenderArgs {
                file,
                output,
                time,
                scale,
                viewport,
            },
        ),
        Commands::Presets { name } => cmd_presets(name.as_deref()),
        Commands::InitConfig { force } => cmd_init_config(&cli.config, force),
    }
}

/// A missing settings file means defaults; a malformed one is an error.
fn load_config(path: &Path) -> Result<StagecastConfig> {
    if !path.exists() {
        return Ok(StagecastConfig::default());
    }
    StagecastConfig::load_from_file(path)
        .with_context(|| format!("failed to load config: {}", path.display()))
}

pub(crate) fn load_scene(file: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    import_document(&source, chrono::Utc::now())
        .with_context(|| format!("failed to import scene: {}", file.display()))
}

fn cmd_check(file: &Path) -> Result<()> {
    println!("🔍 Checking {}", file.display());
    let scene = load_scene(file)?;
    println!("   ✓ Import OK");
    println!(
        "   Canvas: {}  Background: {}",
        scene.canvas_size, scene.background_color
    );

    let order: Vec<&str> = scene.render_order().iter().map(|l| l.id.as_str()).collect();
    println!("   Layers ({}): {}", order.len(), order.join(" → "));

    let warnings = lint_project(&scene);
    for w in &warnings {
        println!("   ⚠️  {}", w);
    }
    if warnings.is_empty() {
        println!("   ✓ No warnings");
    }
    Ok(())
}

fn cmd_normalize(file: &Path, output: Option<&Path>) -> Result<()> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read file: {}", file.display()))?;
    let raw: serde_json::Value =
        serde_json::from_str(&source).with_context(|| format!("invalid JSON: {}", file.display()))?;
    let scene = normalize_project(raw)
        .with_context(|| format!("failed to normalize scene: {}", file.display()))?;
    let json = serde_json::to_string_pretty(&scene)?;

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("✅ Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_tiles(file: &Path, viewport: ViewportSize) -> Result<()> {
    let scene = load_scene(file)?;
    let layout = compute_tiles(scene.canvas_size, viewport);
    tracing::debug!(
        "{} tiles at scale {:.3}",
        layout.tiles.len(),
        layout.fit_scale
    );
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

fn cmd_presets(name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        let preset =
            find_preset(name).with_context(|| format!("unknown canvas preset: {}", name))?;
        println!("{}", preset.size);
        return Ok(());
    }
    println!("📐 Canvas presets");
    for preset in CANVAS_PRESETS {
        println!(
            "   {:<16} {:>11}  ({:.3})",
            preset.name,
            preset.size.to_string(),
            preset.size.aspect_ratio()
        );
    }
    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    StagecastConfig::default()
        .save_to_file(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("✅ Wrote {}", path.display());
    Ok(())
}
