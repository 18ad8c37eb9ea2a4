mod backend_bridge;
mod controller;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use gesture_core::{load_config, AppConfig, LaunchOptions};
use tracing_subscriber::EnvFilter;

use crate::{backend_bridge::runtime::EngineRuntime, ui::GestureApp};

#[derive(Parser, Debug)]
struct Args {
    /// TOML config file; defaults to ./gesture.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    camera_index: Option<u32>,
    /// Replay a JSON-lines landmark recording instead of opening the camera.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Log input actions instead of injecting them.
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn launch_options(&self, mut config: AppConfig) -> LaunchOptions {
        if let Some(index) = self.camera_index {
            config.camera.index = index;
        }
        let mut options = match &self.replay {
            Some(path) => {
                let mut options = LaunchOptions::replay(config, path);
                options.mute = false;
                options
            }
            None => LaunchOptions::camera(config),
        };
        options.dry_run |= self.dry_run;
        options
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).unwrap_or_else(|err| {
        tracing::error!("{err:#}; falling back to default settings");
        AppConfig::default()
    });
    let runtime = EngineRuntime::new(args.launch_options(config));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gesture Control")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([820.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Gesture Control",
        options,
        Box::new(|_cc| Ok(Box::new(GestureApp::new(runtime)))),
    )
}

#[cfg(test)]
mod tests {
    use gesture_core::CaptureMode;

    use super::*;

    #[test]
    fn camera_index_flag_overrides_config() {
        let args = Args::try_parse_from(["desktop_gui", "--camera-index", "3"]).expect("args");
        let options = args.launch_options(AppConfig::default());

        assert_eq!(options.config.camera.index, 3);
        assert_eq!(options.capture, CaptureMode::Camera);
        assert!(!options.dry_run);
    }

    #[test]
    fn replay_keeps_sound_but_never_injects() {
        let args = Args::try_parse_from(["desktop_gui", "--replay", "demo.jsonl"]).expect("args");
        let options = args.launch_options(AppConfig::default());

        assert!(options.dry_run);
        assert!(!options.mute);
        assert!(matches!(options.capture, CaptureMode::Replay { .. }));
    }
}
