/// glyph3d terminal viewer
///
/// Renders the Ч and Ф wireframe letters and the function bar chart in the
/// terminal.
/// Controls:
///   - Mouse drag / WASD / Arrow Keys: Rotate the camera
///   - Wheel / +/-: Zoom
///   - Tab: Switch between viewer and chart
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use glyph3d_core::AppConfig;
use glyph3d_terminal::{Mode, TerminalApp};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "glyph3d-terminal", version, about = "Wireframe letters and function bars in the terminal")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start in chart mode
    #[arg(long)]
    chart: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    let mode = if args.chart { Mode::Chart } else { Mode::Viewer };
    info!("starting in {mode:?} mode");

    let mut app = TerminalApp::new(&config, mode).context("failed to query terminal size")?;
    app.run().context("terminal session failed")?;
    Ok(())
}
