use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// clapで受け付けるログレベル。
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// コマンドライン引数。
/// 光学系とスイープの値は設定ファイルより優先される。
#[derive(Debug, Parser)]
#[command(name = "galvo_trace")]
#[command(about = "Trace a ray through a multi-axis galvanometer scanner over a grid of mirror angles")]
pub struct Args {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Distance from the field lens to the focal plane
    #[arg(long)]
    pub focus_distance: Option<f64>,

    /// Offset between the two scan mirrors
    #[arg(long)]
    pub galvo_gap: Option<f64>,

    /// Number of angles per axis (the sweep has samples² points)
    #[arg(long, short = 's')]
    pub samples: Option<usize>,

    /// Smallest commanded angle in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub min_angle: Option<f64>,

    /// Largest commanded angle in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub max_angle: Option<f64>,

    /// Output CSV path
    #[arg(short, long, default_value = "realpoint_draw.csv")]
    pub output: String,

    /// Also save a scatter plot of the X/Y distribution (PNG)
    #[arg(long)]
    pub plot: Option<String>,

    /// Scatter plot size in pixels
    #[arg(long, default_value = "800")]
    pub plot_size: u32,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub debug_level: LogLevel,
}
