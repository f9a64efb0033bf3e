use std::{env, fmt::Write as _, path::Path};

use log::LevelFilter;
use meetpoint_derive::{CliOptions, CliValue, KvDisplay};

use crate::{
    Coordinate, DistanceMetric, DistanceUnit, Error, Geodesic, Method, MultiStartOptions, Result,
    SolveOptions,
    constants::{DEFAULT_JITTER_DEG, DEFAULT_START_SEED},
};

/// Command-line options for a meeting-point run.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct Options {
    /// Starting point for the minimizer. Unset means the weighted centroid.
    #[cli(long = "seed", parse_with = "Coordinate::parse", value = "<lat,lng>")]
    #[kv(fmt = "option")]
    pub seed: Option<Coordinate>,
    /// Coordinate tolerance in degrees.
    #[cli(long = "tolerance")]
    #[kv(fmt = "option")]
    pub tolerance: Option<f64>,
    /// Objective tolerance relative to `max(1, |total|)`.
    #[cli(long = "f-tolerance")]
    #[kv(fmt = "option")]
    pub f_tolerance: Option<f64>,
    #[cli(long = "max-iterations")]
    #[kv(fmt = "option")]
    pub max_iterations: Option<usize>,
    /// Initial simplex edge or first step length in degrees.
    #[cli(long = "initial-step")]
    #[kv(fmt = "option")]
    pub initial_step: Option<f64>,
    #[cli(long = "method", parse_with = "Method::parse", value = "<nelder-mead|bfgs>")]
    pub method: Method,
    #[cli(long = "metric", parse_with = "DistanceMetric::parse", value = "<vincenty|haversine>")]
    pub metric: DistanceMetric,
    #[cli(long = "unit", parse_with = "DistanceUnit::parse", value = "<miles|kilometers|meters>")]
    pub unit: DistanceUnit,
    /// Jittered restarts on top of the centroid and every origin. Zero runs a single solve.
    #[cli(long = "starts")]
    pub starts: usize,
    /// RNG seed for jittered restarts.
    #[cli(long = "start-seed")]
    pub start_seed: u64,
    /// Maximum jitter in degrees along each axis.
    #[cli(long = "jitter")]
    pub jitter: f64,
    #[cli(long = "log-level", parse_with = "LogLevel::parse", value = "<error|warn|info|debug|trace|off>")]
    pub log_level: LogLevel,
    #[cli(long = "log-format", parse_with = "LogFormat::parse", value = "<compact|pretty>")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    pub log_timestamp: bool,
    /// Empty or `-` means stderr.
    #[cli(long = "log-output")]
    pub log_output: String,
    /// Empty or `-` means stdin.
    #[cli(long = "input")]
    pub input: String,
    /// Empty or `-` means stdout.
    #[cli(long = "output")]
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: None,
            tolerance: None,
            f_tolerance: None,
            max_iterations: None,
            initial_step: None,
            method: Method::NelderMead,
            metric: DistanceMetric::Vincenty,
            unit: DistanceUnit::Miles,
            starts: 0,
            start_seed: DEFAULT_START_SEED,
            jitter: DEFAULT_JITTER_DEG,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
        }
    }
}

const FLAG_OPTIONS: &[&str] = &["--log-timestamp[=<bool>]", "--no-log-timestamp", "--help"];

const USAGE_EXAMPLES: &str = concat!(
    "Examples:\n",
    "  meetpoint --input demos/relatives.txt\n",
    "  meetpoint --unit km --metric haversine < points.txt\n",
    "  meetpoint --seed 39.5,-81.0 --method bfgs --output meet.txt < points.txt\n",
    "  meetpoint --starts 16 --jitter 3 --log-level=info < points.txt\n",
);

impl Options {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);

            if options.apply_cli_option(&name, value.clone())? {
                continue;
            }

            match name.as_str() {
                "log-timestamp" => {
                    options.log_timestamp = match value {
                        Some(v) => parse_bool(&name, &v)?,
                        None => true,
                    };
                }
                "no-log-timestamp" => {
                    if value.is_some() {
                        return Err(Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    options.log_timestamp = false;
                }
                _ => {
                    return Err(Error::invalid_input(format!(
                        "Unknown option: --{name}\n\n{}",
                        Self::usage()
                    )));
                }
            }
        }

        Ok(options)
    }

    pub fn usage() -> String {
        let mut usage = String::from(concat!(
            "Usage:\n",
            "  meetpoint [options] [--input points.txt]\n",
            "  meetpoint [options] < points.txt\n\n",
            "Input: whitespace-separated lat,lng[,weight] tokens; '#' starts a comment.\n\n",
            "Options:\n",
        ));
        for (name, hint) in Self::CLI_VALUE_OPTIONS {
            let _ = writeln!(usage, "  --{name} {hint}");
        }
        for flag in FLAG_OPTIONS {
            let _ = writeln!(usage, "  {flag}");
        }
        usage.push('\n');
        usage.push_str(USAGE_EXAMPLES);
        usage
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.log_output)
    }

    pub fn output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        non_stdio_path(&self.input)
    }

    pub fn geodesic(&self) -> Geodesic {
        Geodesic::new(self.metric, self.unit)
    }

    pub fn solve_options(&self) -> SolveOptions {
        let mut solve = SolveOptions::new(self.method, self.geodesic());
        solve.tolerance = self.tolerance;
        solve.f_tolerance = self.f_tolerance;
        solve.max_iterations = self.max_iterations;
        solve.initial_step = self.initial_step;
        solve
    }

    pub fn multi_start_options(&self) -> MultiStartOptions {
        MultiStartOptions::new(self.starts, self.start_seed, self.jitter)
    }

    /// `--starts` above zero routes the run through [`crate::solve_multi_start`].
    pub fn is_multi_start(&self) -> bool {
        self.starts > 0
    }
}

fn non_stdio_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::invalid_input(format!(
            "Invalid boolean for --{name}: {value} (expected true/false)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::{LogFormat, LogLevel, Options, parse_bool};
    use crate::{Coordinate, DistanceMetric, DistanceUnit, Method};

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool("x", "true").expect("parse"));
        assert!(parse_bool("x", "YES").expect("parse"));
        assert!(parse_bool("x", "On").expect("parse"));
        assert!(!parse_bool("x", "0").expect("parse"));
        assert!(!parse_bool("x", "FALSE").expect("parse"));
        assert!(!parse_bool("x", "off").expect("parse"));
    }

    #[test]
    fn parse_bool_rejects_unknown_values() {
        let err = parse_bool("log-timestamp", "maybe").expect_err("invalid bool should fail");
        assert!(
            err.to_string()
                .contains("Invalid boolean for --log-timestamp: maybe")
        );
    }

    #[test]
    fn log_level_maps_to_expected_filter() {
        assert_eq!(LogLevel::Error.to_filter(), LevelFilter::Error);
        assert_eq!(LogLevel::Warn.to_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::Trace.to_filter(), LevelFilter::Trace);
        assert_eq!(LogLevel::Off.to_filter(), LevelFilter::Off);
        assert_eq!(LogLevel::parse("warning").expect("alias"), LogLevel::Warn);
    }

    #[test]
    fn defaults_match_documented_values() {
        let options = Options::default();
        assert_eq!(options.method, Method::NelderMead);
        assert_eq!(options.metric, DistanceMetric::Vincenty);
        assert_eq!(options.unit, DistanceUnit::Miles);
        assert_eq!(options.seed, None);
        assert_eq!(options.starts, 0);
        assert_eq!(options.start_seed, 12345);
        assert_eq!(options.jitter, 5.0);
        assert!(options.log_timestamp);
        assert!(!options.is_multi_start());
    }

    #[test]
    fn parse_from_iter_applies_known_cli_options() {
        let options = Options::parse_from_iter([
            "--seed=39.5,-81.25",
            "--tolerance=1e-6",
            "--f-tolerance=1e-9",
            "--max-iterations=250",
            "--initial-step=0.5",
            "--method=bfgs",
            "--metric=sphere",
            "--unit=km",
            "--starts=8",
            "--start-seed=7",
            "--jitter=2.5",
            "--log-level=debug",
            "--log-format=pretty",
            "--log-timestamp=false",
            "--log-output=run.log",
            "--input=points.txt",
            "--output=meet.txt",
        ])
        .expect("parse options");

        assert_eq!(options.seed, Some(Coordinate::new(39.5, -81.25)));
        assert_eq!(options.tolerance, Some(1e-6));
        assert_eq!(options.f_tolerance, Some(1e-9));
        assert_eq!(options.max_iterations, Some(250));
        assert_eq!(options.initial_step, Some(0.5));
        assert_eq!(options.method, Method::Bfgs);
        assert_eq!(options.metric, DistanceMetric::Haversine);
        assert_eq!(options.unit, DistanceUnit::Kilometers);
        assert_eq!(options.starts, 8);
        assert_eq!(options.start_seed, 7);
        assert_eq!(options.jitter, 2.5);
        assert_eq!(options.log_level, LogLevel::Debug);
        assert_eq!(options.log_format, LogFormat::Pretty);
        assert!(!options.log_timestamp);
        assert_eq!(options.log_output, "run.log");
        assert_eq!(options.input, "points.txt");
        assert_eq!(options.output, "meet.txt");
        assert!(options.is_multi_start());
    }

    #[test]
    fn space_separated_seed_accepts_negative_latitude() {
        let options =
            Options::parse_from_iter(["--seed", "-33.9,151.2", "--unit", "m"]).expect("parse");
        assert_eq!(options.seed, Some(Coordinate::new(-33.9, 151.2)));
        assert_eq!(options.unit, DistanceUnit::Meters);
    }

    #[test]
    fn parse_from_iter_rejects_out_of_range_seed() {
        let err = Options::parse_from_iter(["--seed=95,0"]).expect_err("bad seed");
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn parse_from_iter_rejects_bad_choice() {
        let err = Options::parse_from_iter(["--method=gradient"]).expect_err("bad method");
        assert!(err.to_string().contains("Invalid value for --method: gradient"));
    }

    #[test]
    fn parse_from_iter_rejects_non_numeric_value() {
        let err = Options::parse_from_iter(["--max-iterations=lots"]).expect_err("bad number");
        assert!(err.to_string().contains("Invalid value for --max-iterations: lots"));
    }

    #[test]
    fn parse_from_iter_accepts_no_log_timestamp_flag() {
        let options = Options::parse_from_iter(["--no-log-timestamp"]).expect("parse options");
        assert!(!options.log_timestamp);
    }

    #[test]
    fn parse_from_iter_rejects_no_log_timestamp_with_value() {
        let err = Options::parse_from_iter(["--no-log-timestamp=true"])
            .expect_err("expected flag value rejection");
        assert!(err.to_string().contains("does not take a value"));
    }

    #[test]
    fn parse_from_iter_rejects_unknown_option() {
        let err =
            Options::parse_from_iter(["--unknown-opt=1"]).expect_err("expected unknown option");
        assert!(err.to_string().contains("Unknown option: --unknown-opt"));
    }

    #[test]
    fn parse_from_iter_rejects_unexpected_positional_argument() {
        let err = Options::parse_from_iter(["points.txt"]).expect_err("expected positional error");
        assert!(err.to_string().contains("Unexpected argument: points.txt"));
    }

    #[test]
    fn parse_from_iter_requires_value_for_seed() {
        let err = Options::parse_from_iter(["--seed"]).expect_err("missing value should fail");
        assert!(err.to_string().contains("Missing value for --seed"));
    }

    #[test]
    fn help_lists_every_value_option() {
        let err = Options::parse_from_iter(["--help"]).expect_err("help should short-circuit");
        let usage = err.to_string();
        assert!(usage.contains("Usage:"));
        assert!(usage.contains("--seed <lat,lng>"));
        assert!(usage.contains("--max-iterations <usize>"));
        assert!(usage.contains("--unit <miles|kilometers|meters>"));
        assert!(usage.contains("--no-log-timestamp"));
    }

    #[test]
    fn stdio_paths_treat_empty_and_dash_as_streams() {
        let options = Options::default();
        assert!(options.input_path().is_none());
        assert!(options.output_path().is_none());
        assert!(options.log_output_path().is_none());

        let options = Options {
            input: "-".to_string(),
            output: " - ".to_string(),
            log_output: "out/run.log".to_string(),
            ..Options::default()
        };
        assert!(options.input_path().is_none());
        assert!(options.output_path().is_none());
        assert_eq!(
            options.log_output_path().expect("path should exist"),
            std::path::Path::new("out/run.log")
        );
    }

    #[test]
    fn converts_to_solver_options() {
        let options = Options::parse_from_iter([
            "--method=simplex",
            "--unit=km",
            "--tolerance=1e-5",
            "--starts=3",
            "--jitter=1",
        ])
        .expect("parse options");

        let solve = options.solve_options();
        assert_eq!(solve.method, Method::NelderMead);
        assert_eq!(solve.geodesic.unit, DistanceUnit::Kilometers);
        assert_eq!(solve.tolerance, Some(1e-5));
        assert_eq!(solve.max_iterations, None);

        let multi = options.multi_start_options();
        assert_eq!(multi.starts, 3);
        assert_eq!(multi.start_seed, 12345);
        assert_eq!(multi.jitter, 1.0);
    }

    #[test]
    fn display_shows_unset_options_as_dash() {
        let shown = Options::default().to_string();
        assert!(shown.contains("seed "), "{shown}");
        assert!(shown.contains("= -"), "{shown}");
        assert!(shown.contains("nelder-mead"), "{shown}");
    }
}
