//! Command-line front end for area–height–volume curves and flood extents.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "storage", version, about = "Reservoir storage curves and flood extents from a DEM")]
struct Cli {
    /// Log level.
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one known quantity and write the flood extent.
    Inundation(commands::inundation::InundationArgs),
    /// Export the area–height–volume table as CSV.
    Curve(commands::curve::CurveArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Inundation(args) => commands::inundation::execute(&args),
        Command::Curve(args) => commands::curve::execute(&args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_defaults_to_info_and_parses_names() {
        let cli = Cli::try_parse_from(["storage", "curve", "--histogram", "h.csv"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Info);
        let cli = Cli::try_parse_from(["storage", "--log-level", "debug", "curve", "--histogram", "h.csv"]).unwrap();
        assert_eq!(Level::from(cli.log_level), Level::DEBUG);
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = Cli::try_parse_from(["storage", "--log-level", "verbose", "curve", "--histogram", "h.csv"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
