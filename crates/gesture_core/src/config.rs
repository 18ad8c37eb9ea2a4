use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use device_io::DetectorCommand;
use serde::{Deserialize, Serialize};
use shared::domain::FrameSize;
use tracing::{info, warn};

use crate::settings::GestureSettings;

pub const DEFAULT_CONFIG_FILE: &str = "gesture.toml";
const ENV_PREFIX: &str = "GESTURE__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub gesture: GestureSettings,
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let size = FrameSize::default();
        Self {
            index: 0,
            width: size.width,
            height: size.height,
        }
    }
}

impl CameraConfig {
    pub fn frame_size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub min_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let command = DetectorCommand::default();
        Self {
            program: command.program,
            args: command.args,
            min_confidence: command.min_confidence,
        }
    }
}

impl DetectorConfig {
    pub fn command(&self) -> DetectorCommand {
        DetectorCommand {
            program: self.program.clone(),
            args: self.args.clone(),
            min_confidence: self.min_confidence,
        }
    }
}

/// Loads the file (explicit path, else `gesture.toml` if present), then applies
/// `GESTURE__*` environment overrides and clamps out-of-range values.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_config_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<AppConfig> {
    let mut config = match resolve_path(path) {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let config: AppConfig = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {}", path.display()))?;
            info!(path = %path.display(), "loaded config file");
            config
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, env);
    Ok(sanitize(config))
}

fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
    fallback.is_file().then_some(fallback)
}

fn apply_env_overrides(config: &mut AppConfig, env: impl Fn(&str) -> Option<String>) {
    let lookup = |name: &str| env(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = parse_env::<u32>(&lookup, "SMOOTHING") {
        config.gesture.smoothing = v;
    }
    if let Some(v) = parse_env::<u32>(&lookup, "FRAME_MARGIN") {
        config.gesture.frame_margin = v;
    }
    if let Some(v) = parse_env::<u32>(&lookup, "CLICK_THRESHOLD") {
        config.gesture.click_threshold = v;
    }
    if let Some(v) = lookup("SOUND_ENABLED").and_then(|raw| parse_flag("SOUND_ENABLED", &raw)) {
        config.gesture.sound_enabled = v;
    }
    if let Some(v) = lookup("SHOW_LANDMARKS").and_then(|raw| parse_flag("SHOW_LANDMARKS", &raw)) {
        config.gesture.show_landmarks = v;
    }
    if let Some(v) = parse_env::<u32>(&lookup, "CAMERA_INDEX") {
        config.camera.index = v;
    }
    if let Some(raw) = lookup("DETECTOR_COMMAND") {
        let mut parts = raw.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => {
                config.detector.program = program;
                config.detector.args = parts.collect();
            }
            None => warn!("ignoring empty {ENV_PREFIX}DETECTOR_COMMAND"),
        }
    }
}

fn parse_env<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(value = %raw, "ignoring unparsable {ENV_PREFIX}{name}");
            None
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(value = %raw, "ignoring unparsable {ENV_PREFIX}{name}");
            None
        }
    }
}

fn sanitize(mut config: AppConfig) -> AppConfig {
    if let Err(err) = config.gesture.validate() {
        warn!("{err}; clamping gesture settings");
        config.gesture = config.gesture.clamped();
    }

    if config.camera.width == 0 || config.camera.height == 0 {
        let fallback = CameraConfig::default();
        warn!(
            width = config.camera.width,
            height = config.camera.height,
            "camera size must be non-zero; using {}x{}",
            fallback.width,
            fallback.height
        );
        config.camera.width = fallback.width;
        config.camera.height = fallback.height;
    }

    if !(0.0..=1.0).contains(&config.detector.min_confidence) {
        warn!(
            min_confidence = config.detector.min_confidence,
            "detector confidence must be within 0..=1; clamping"
        );
        config.detector.min_confidence = config.detector.min_confidence.clamp(0.0, 1.0);
    }

    config
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
