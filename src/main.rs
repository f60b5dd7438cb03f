use std::fs::File;

use clap::Parser;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use folium::ui::{ViewMode, ViewerApp, ViewerConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Scrollable PDF page viewer with page-jump navigation")]
struct Args {
    /// PDF file to open
    file_name: String,

    /// Presentation mode
    #[arg(long, value_enum, default_value_t = ModeArg::Jump)]
    mode: ModeArg,

    /// Initial page scale factor
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ModeArg {
    /// One page at a time with "go to page" jumps
    Jump,
    /// All pages stacked behind a scrollbar
    Scroll,
}

impl From<ModeArg> for ViewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Jump => Self::PageJump,
            ModeArg::Scroll => Self::ContinuousScroll,
        }
    }
}

pub fn main() -> iced::Result {
    let args = Args::parse();

    if let Ok(log_file) = File::create("folium.log") {
        let _ = WriteLogger::init(LevelFilter::Info, Config::default(), log_file);
    }
    info!("starting folium for {}", args.file_name);

    let config = ViewerConfig {
        initial_mode: args.mode.into(),
        initial_zoom: args.zoom,
        ..ViewerConfig::default()
    };

    let window_size = iced::Size::new(config.initial_window_width, config.initial_window_height);
    let file_name = args.file_name;
    iced::application(
        move || ViewerApp::with_config(file_name.clone(), config.clone()),
        ViewerApp::update,
        ViewerApp::view,
    )
    .subscription(ViewerApp::subscription)
    .window_size(window_size)
    .title("Folium")
    .run()
}
