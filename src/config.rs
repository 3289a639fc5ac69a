use crate::error::ConfigError;
use crate::sim::SliderRange;
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Default)]
#[command(name = "solarium", version, about = "Interactive solar system in the terminal")]
pub struct Cli {
    /// Settings file (JSON). Defaults to settings.json in the config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Frame rate cap
    #[arg(long)]
    pub fps: Option<u32>,

    /// Seed for the star backdrop
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of skybox stars
    #[arg(long)]
    pub stars: Option<usize>,

    /// Write logs to this file (the terminal is taken by the renderer)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// trace, debug, info, warn or error (default info)
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// Do not capture the mouse
    #[arg(long)]
    pub no_mouse: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub initial_distance: f64,
    /// 0 applies input immediately; otherwise the fraction of pending motion applied per update.
    pub damping_factor: f64,
    pub rotate_speed: f64,
    pub zoom_speed: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_deg: 85.0,
            near: 0.1,
            far: 5000.0,
            min_distance: 12.0,
            max_distance: 1000.0,
            initial_distance: 100.0,
            damping_factor: 0.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fps_cap: u32,
    pub seed: u64,
    pub star_count: usize,
    pub show_labels: bool,
    pub show_orbits: bool,
    pub mouse: bool,
    pub camera: CameraSettings,
    pub slider: SliderRange,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            seed: 0x5A17_5A17,
            star_count: 400,
            show_labels: true,
            show_orbits: true,
            mouse: true,
            camera: CameraSettings::default(),
            slider: SliderRange::default(),
        }
    }
}

impl Settings {
    /// Command-line values win over the file.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(fps) = cli.fps {
            self.fps_cap = fps;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(stars) = cli.stars {
            self.star_count = stars;
        }
        if cli.no_mouse {
            self.mouse = false;
        }
        self.fps_cap = self.fps_cap.clamp(5, 240);
        self
    }
}

impl CameraSettings {
    fn check(&self) -> Result<(), String> {
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(format!("camera.fov_deg must be in (0, 180), got {}", self.fov_deg));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(format!("camera.near must be positive and below far ({} / {})", self.near, self.far));
        }
        if !(self.min_distance >= 0.0 && self.min_distance <= self.max_distance) {
            return Err(format!(
                "camera.min_distance must not exceed max_distance ({} > {})",
                self.min_distance, self.max_distance
            ));
        }
        if !(0.0..=1.0).contains(&self.damping_factor) {
            return Err(format!("camera.damping_factor must be in [0, 1], got {}", self.damping_factor));
        }
        Ok(())
    }
}

fn check_slider(range: &SliderRange) -> Result<(), String> {
    if !(range.min < range.max) {
        return Err(format!("slider.min must be below slider.max ({} >= {})", range.min, range.max));
    }
    if !(range.step > 0.0 && range.step.is_finite()) {
        return Err(format!("slider.step must be positive, got {}", range.step));
    }
    Ok(())
}

impl Settings {
    /// Rejects value combinations the camera and sliders cannot work with.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        self.camera
            .check()
            .and_then(|()| check_slider(&self.slider))
            .map_err(|reason| ConfigError::Invalid { path: path.to_path_buf(), reason })
    }
}

pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    let proj = ProjectDirs::from("com", "solarium", "Solarium").ok_or(ConfigError::NoProjectDirs)?;
    Ok(proj.config_dir().join("settings.json"))
}

pub fn parse_settings(path: &Path, text: &str) -> Result<Settings, ConfigError> {
    let settings: Settings =
        serde_json::from_str(text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
    settings.validate(path)?;
    Ok(settings)
}

/// Loads settings from `path`. A missing file is an error.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    parse_settings(path, &text)
}

/// Explicit `--config` must exist; the default location may be absent.
pub fn resolve_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let settings = match &cli.config {
        Some(path) => load_settings(path)?,
        None => load_or_default(&default_settings_path()?)?,
    };
    Ok(settings.apply_cli(cli))
}

/// Like [`load_settings`], but a file that does not exist yields defaults.
pub fn load_or_default(path: &Path) -> Result<Settings, ConfigError> {
    match load_settings(path) {
        Ok(s) => Ok(s),
        Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e),
    }
}
