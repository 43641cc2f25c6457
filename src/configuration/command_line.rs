use crate::configuration::constants::cargo_env::CARGO_PKG_NAME;
use crate::time::timeunit::parse_duration;
use clap::arg_enum;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

arg_enum! {
    #[derive(Debug)]
    pub enum LogLevel {
        Off, Error, Warn, Info, Debug, Trace,
    }
}

#[derive(StructOpt, Debug)]
#[structopt(name = CARGO_PKG_NAME)]
pub struct Opt {
    /// Manifest describing the routines to run. Supported: YAML, JSON, TOML
    #[structopt(parse(from_os_str))]
    pub file: PathBuf,

    /// Sets a logging level
    #[structopt(case_insensitive = true, long, short = "L", possible_values = &LogLevel::variants(), env = "LOG_LEVEL")]
    pub logging: Option<LogLevel>,

    /// File to which application will write logs
    #[structopt(long, short = "O", env = "LOG_OUTPUT_FILE")]
    pub log_output_file: Option<PathBuf>,

    /// Run only defined groups, any other will be ignored
    #[structopt(long, short = "g")]
    pub groups: Vec<String>,

    /// Cancel the run once this much time has passed, e.g. `90s`
    #[structopt(long, short = "T", parse(try_from_str = parse_duration))]
    pub timeout: Option<Duration>,

    /// Print the run summary as JSON
    #[structopt(long)]
    pub json: bool,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_run_options() {
        let opt = Opt::from_iter(&[
            "routine-runner",
            "network.yaml",
            "-L",
            "debug",
            "-g",
            "Wi-Fi",
            "-g",
            "DNS",
            "--timeout",
            "90s",
            "--json",
        ]);

        assert_eq!(opt.file, PathBuf::from("network.yaml"));
        assert_eq!(LevelFilter::from(opt.logging.unwrap()), LevelFilter::Debug);
        assert_eq!(opt.groups, vec!["Wi-Fi".to_owned(), "DNS".to_owned()]);
        assert_eq!(opt.timeout, Some(Duration::from_secs(90)));
        assert!(opt.json);
    }

    #[test]
    fn test_rejects_malformed_timeout() {
        let result = Opt::from_iter_safe(&["routine-runner", "network.yaml", "-T", "soon"]);
        assert!(result.is_err());
    }
}
