use std::{
    fs::File,
    io::{self, Write},
};

use env_logger::{Builder, Target, WriteStyle};
use log::{Level, Record};

use crate::{
    Error, Result,
    options::{LogFormat, Options},
};

/// Installs the global logger. Log lines go to `--log-output` or stderr, never stdout.
pub fn init_logger(options: &Options) -> Result<()> {
    let log_format = options.log_format;
    let log_timestamp = options.log_timestamp;

    let mut builder = Builder::new();
    builder
        .filter_level(options.log_level.to_filter())
        .write_style(WriteStyle::Never)
        .format(move |buf, record| {
            if log_timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            write_record(buf, log_format, record)
        });

    builder.target(log_target(options)?);
    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn log_target(options: &Options) -> Result<Target> {
    let Some(log_path) = options.log_output_path() else {
        return Ok(Target::Stderr);
    };
    let log_file = File::create(log_path).map_err(|e| {
        Error::other(format!(
            "failed to create log output file {}: {e}",
            log_path.display()
        ))
    })?;
    Ok(Target::Pipe(Box::new(log_file)))
}

fn write_record(out: &mut impl Write, format: LogFormat, record: &Record<'_>) -> io::Result<()> {
    let tag = level_tag(record.level());
    match format {
        LogFormat::Compact => writeln!(out, "{tag} {}", record.args()),
        LogFormat::Pretty => writeln!(out, "{tag} [{}] {}", record.target(), record.args()),
    }
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

#[cfg(test)]
mod tests {
    use log::{Level, Record};

    use super::{init_logger, level_tag, write_record};
    use crate::options::{LogFormat, Options};

    fn render(format: LogFormat) -> String {
        let mut out = Vec::new();
        write_record(
            &mut out,
            format,
            &Record::builder()
                .level(Level::Info)
                .target("meetpoint_core::solver")
                .args(format_args!("solver: start n=6"))
                .build(),
        )
        .expect("write record");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn compact_format_is_tag_then_message() {
        assert_eq!(render(LogFormat::Compact), "INFO solver: start n=6\n");
    }

    #[test]
    fn pretty_format_includes_target() {
        assert_eq!(
            render(LogFormat::Pretty),
            "INFO [meetpoint_core::solver] solver: start n=6\n"
        );
    }

    #[test]
    fn level_tags_are_uppercase_names() {
        assert_eq!(level_tag(Level::Error), "ERROR");
        assert_eq!(level_tag(Level::Warn), "WARN");
        assert_eq!(level_tag(Level::Trace), "TRACE");
    }

    #[test]
    fn unwritable_log_output_is_reported() {
        let options = Options {
            log_output: "/nonexistent-dir/meetpoint/run.log".to_string(),
            ..Options::default()
        };
        let err = init_logger(&options).expect_err("log file should not be creatable");
        assert!(err.to_string().contains("failed to create log output file"));
    }
}
