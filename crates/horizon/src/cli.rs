//! Command-line interface handling for the Horizon relevancy host.
//!
//! This module provides command-line argument parsing using the `clap`
//! builder API.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// Every option except the config path overrides a value loaded from the
/// configuration file.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the server tick rate in Hz
    pub tick_rate: Option<f32>,
    /// Optional override for the number of simulated bot connections
    pub bots: Option<usize>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

impl CliArgs {
    /// Parses the process arguments.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list, program name first.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn command() -> Command {
        Command::new("Horizon Relevancy Host")
            .version(env!("CARGO_PKG_VERSION"))
            .author("Horizon Team <team@horizon.dev>")
            .about("Drives the actor relevancy router at a fixed tick rate")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("config.toml"),
            )
            .arg(
                Arg::new("tick-rate")
                    .short('t')
                    .long("tick-rate")
                    .value_name("HZ")
                    .help("Server tick rate in Hz")
                    .value_parser(clap::value_parser!(f32)),
            )
            .arg(
                Arg::new("bots")
                    .short('b')
                    .long("bots")
                    .value_name("COUNT")
                    .help("Number of simulated bot connections")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            tick_rate: matches.get_one::<f32>("tick-rate").copied(),
            bots: matches.get_one::<usize>("bots").copied(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["horizon"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("config.toml"));
        assert!(args.tick_rate.is_none());
        assert!(args.bots.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.json_logs);
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "horizon",
            "--config",
            "prod.toml",
            "--tick-rate",
            "60",
            "-b",
            "8",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();

        assert_eq!(args.config_path, PathBuf::from("prod.toml"));
        assert_eq!(args.tick_rate, Some(60.0));
        assert_eq!(args.bots, Some(8));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }

    #[test]
    fn test_rejects_non_numeric_tick_rate() {
        assert!(CliArgs::try_parse_from(["horizon", "--tick-rate", "fast"]).is_err());
    }
}
