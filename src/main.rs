use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use gaokao_lens::app::GaokaoLensApp;
use gaokao_lens::config::AppConfig;
use gaokao_lens::ui::fonts;

/// Shanghai gaokao admission explorer.
#[derive(Parser, Debug)]
#[command(name = "gaokao-lens", version, about)]
struct Args {
    /// Directory holding the CSV files.
    #[arg(long, env = "GAOKAO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON config file (default: ./gaokao-lens.json when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())
        .context("loading configuration")?
        .with_data_dir(args.data_dir);
    log::info!("Data directory: {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("上海高考数据分析平台")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "gaokao-lens",
        options,
        Box::new(move |cc| {
            fonts::install_cjk_font(&cc.egui_ctx, config.font_path.as_deref());
            Ok(Box::new(GaokaoLensApp::new(config)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running the window: {e}"))
}
