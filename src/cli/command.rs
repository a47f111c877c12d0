use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use serde::Deserialize;

use fs9721::structs::fields::BitOrder;

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = concat!(
        env!("CARGO_PKG_VERSION"),
        " (fs9721 ", env!("FS9721_VERSION"),
        ", built ", env!("BUILD_TIMESTAMP"), ")"
    ),
    about        = "Tools for decoding and logging FS9721-LP3 multimeter packets",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress spinners during operations.
    #[arg(long, global = true)]
    pub progress: bool,

    /// YAML configuration file; command-line options take precedence.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a capture of BLE notifications, one hex payload per line.
    Decode(DecodeArgs),

    /// Print every field of a single packet.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Capture file (use "-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Append readings to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Bit order of the meter's payload bytes.
    #[arg(long, value_enum)]
    pub bit_order: Option<BitOrderArg>,

    /// Reopen the CSV file if it was closed while logging.
    #[arg(long)]
    pub auto_reopen: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Packet octets in hex, whole or as two chunks (e.g. "17 27 3D ..." "9F A0 ...").
    #[arg(value_name = "HEX", required = true, num_args = 1..)]
    pub chunks: Vec<String>,

    /// Bit order of the meter's payload bytes.
    #[arg(long, value_enum)]
    pub bit_order: Option<BitOrderArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
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
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BitOrderArg {
    /// Bytes are decoded as reassembled.
    AsDelivered,
    /// Bits of every byte are mirrored before decoding.
    Reversed,
}

impl From<BitOrderArg> for BitOrder {
    fn from(arg: BitOrderArg) -> Self {
        match arg {
            BitOrderArg::AsDelivered => BitOrder::AsDelivered,
            BitOrderArg::Reversed => BitOrder::Reversed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decode_arguments() {
        let cli = Cli::parse_from([
            "fs9721d",
            "--strict",
            "decode",
            "capture.txt",
            "--csv",
            "out.csv",
            "--bit-order",
            "reversed",
        ]);

        assert!(cli.strict);
        let Commands::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(args.input, PathBuf::from("capture.txt"));
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(args.bit_order, Some(BitOrderArg::Reversed));
    }

    #[test]
    fn inspect_takes_several_chunks() {
        let cli = Cli::parse_from(["fs9721d", "inspect", "17 27", "3D 40"]);

        let Commands::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert_eq!(args.chunks, vec!["17 27", "3D 40"]);
        assert_eq!(args.bit_order, None);
    }
}
