use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use iced::Size;
use pdfpager::config::ViewerConfig;
use pdfpager::logging;
use pdfpager::ui::ViewerApp;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// PDF file to open
    file_name: String,

    /// Config file (defaults to the per-user config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial zoom factor
    #[arg(long)]
    scale: Option<f32>,

    /// Log level used when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ViewerConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(scale) = args.scale {
        config.zoom.initial_scale = scale;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    config.validate().context("validating configuration")?;

    logging::init(&config.log_level, args.log_file.as_deref())?;
    tracing::info!(file = %args.file_name, "starting pdfpager");

    let window_size = Size::new(config.initial_window_width, config.initial_window_height);
    let file_name = args.file_name;

    iced::application(
        move || ViewerApp::with_config(file_name.clone(), config.clone()),
        ViewerApp::update,
        ViewerApp::view,
    )
    .title(ViewerApp::title)
    .subscription(ViewerApp::subscription)
    .window_size(window_size)
    .run()?;

    Ok(())
}
