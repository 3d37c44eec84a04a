use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "morph-cloud",
    version,
    about = "Gesture-driven particle cloud that morphs between parametric shapes, in the terminal"
)]
pub struct Config {
    #[arg(long, default_value_t = 15_000)]
    pub particles: usize,

    /// Initial shape; unknown names fall back to fireworks.
    #[arg(long, default_value = "fireworks")]
    pub shape: String,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = SwitchMode::Manual)]
    pub switch: SwitchMode,

    #[arg(long, default_value_t = 8.0)]
    pub seconds_per_switch: f32,

    #[arg(long, value_enum, default_value_t = GestureSource::Synthetic)]
    pub gesture: GestureSource,

    /// Landmark frames for `--gesture file`, one frame per line.
    #[arg(long)]
    pub gesture_file: Option<PathBuf>,

    #[arg(long, default_value_t = 30)]
    pub gesture_fps: u32,

    #[arg(long, default_value_t = false)]
    pub gesture_loop: bool,

    #[arg(long, default_value_t = 0.05)]
    pub morph_speed: f32,

    #[arg(long, default_value_t = 0.35)]
    pub brightness: f32,

    /// Seed for the particle table and texture noise; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Write logs here (filter via RUST_LOG). Logging is off without it.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub list_shapes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

impl RendererMode {
    /// Pixels per terminal cell, (width, height).
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            Self::HalfBlock => (1, 2),
            Self::Braille => (2, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwitchMode {
    Manual,
    Time,
}

impl SwitchMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Manual => Self::Time,
            Self::Time => Self::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GestureSource {
    None,
    #[value(alias = "demo")]
    Synthetic,
    Stdin,
    File,
}
