use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

#[derive(Debug, ClapParser)]
#[command(
    name       = env!("CARGO_PKG_NAME"),
    version    = env!("CARGO_PKG_VERSION"),
    author     = env!("CARGO_PKG_AUTHORS"),
    about      = "Tools for encoding and decoding SHAC spatial audio containers",
    long_about = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Encode a mono WAV file into a `.shac` container at a fixed position.
    Encode(EncodeArgs),

    /// Decode a `.shac` container into a stereo WAV file.
    Decode(DecodeArgs),

    /// Print container header and layer information.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Input mono WAV file (use "-" for stdin is not supported; pass a path).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output `.shac` path.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Ambisonic order (1..=7).
    #[arg(long, default_value_t = 3)]
    pub order: usize,

    /// Normalization scheme.
    #[arg(long, value_enum, default_value_t = NormalizationArg::Sn3d)]
    pub normalization: NormalizationArg,

    /// Source position, "x,y,z" in meters (+X right, +Y up, +Z front).
    #[arg(long, default_value = "0,0,1")]
    pub position: String,

    /// Layer identifier written into the container.
    #[arg(long, default_value = "source")]
    pub layer_id: String,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Input `.shac` container.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output stereo WAV path.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Listener yaw in radians.
    #[arg(long, default_value_t = 0.0)]
    pub yaw: f32,

    /// Listener pitch in radians.
    #[arg(long, default_value_t = 0.0)]
    pub pitch: f32,

    /// Block size, in frames, for the decode loop.
    #[arg(long, default_value_t = 1024)]
    pub block_size: usize,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Input `.shac` container.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum NormalizationArg {
    Sn3d,
    N3d,
}

impl From<NormalizationArg> for shac::Normalization {
    fn from(value: NormalizationArg) -> Self {
        match value {
            NormalizationArg::Sn3d => shac::Normalization::Sn3d,
            NormalizationArg::N3d => shac::Normalization::N3d,
        }
    }
}
