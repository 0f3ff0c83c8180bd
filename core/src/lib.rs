use anyhow::Context;
use log::LevelFilter;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::{self, pattern::PatternEncoder, Encode},
    filter::threshold::ThresholdFilter,
};
use std::{backtrace::Backtrace, env, io::Write as _};

pub mod constants;
pub mod dataset;

const LOGGING_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

/// Whether the environment asks for backtraces, using the same variables and
/// precedence as `std::backtrace`: `RUST_LIB_BACKTRACE` wins over
/// `RUST_BACKTRACE`, and `0` turns them off.
fn backtraces_requested() -> bool {
    ["RUST_LIB_BACKTRACE", "RUST_BACKTRACE"]
        .into_iter()
        .find_map(|name| env::var(name).ok())
        .is_some_and(|value| value != "0")
}

/// Formats records with a pattern and, for `Error` records, follows the line
/// with a backtrace of the logging call site.
#[derive(Debug)]
struct ErrorTraceEncoder {
    line: PatternEncoder,
    trace_errors: bool,
}

impl ErrorTraceEncoder {
    fn from_env(pattern: &str) -> Self {
        Self::with_traces(pattern, backtraces_requested())
    }

    fn with_traces(pattern: &str, trace_errors: bool) -> Self {
        Self {
            line: PatternEncoder::new(pattern),
            trace_errors,
        }
    }
}

impl Encode for ErrorTraceEncoder {
    fn encode(&self, w: &mut dyn encode::Write, record: &log::Record<'_>) -> anyhow::Result<()> {
        self.line.encode(w, record)?;
        if self.trace_errors && record.level() == log::Level::Error {
            write!(w, "Backtrace:\n{}\n", Backtrace::force_capture())?;
        }
        Ok(())
    }
}

/// Install the process-wide logger.
///
/// Records at `log_level` and above go to stderr. When `file_path` is given,
/// the same records are also appended to that file. Fails if a logger is
/// already installed or the log file cannot be opened.
pub fn initialize_logger(log_level: LevelFilter, file_path: Option<&str>) -> anyhow::Result<()> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(ErrorTraceEncoder::from_env(LOGGING_PATTERN)))
        .build();

    let mut config_builder = Config::builder().appender(
        Appender::builder()
            .filter(Box::new(ThresholdFilter::new(log_level)))
            .build("stderr", Box::new(stderr)),
    );
    let mut root = Root::builder().appender("stderr");

    if let Some(path) = file_path {
        let logfile = FileAppender::builder()
            .encoder(Box::new(ErrorTraceEncoder::from_env(LOGGING_PATTERN)))
            .build(path)
            .with_context(|| format!("failed to open log file {path}"))?;
        config_builder =
            config_builder.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config_builder
        .build(root.build(log_level))
        .context("invalid logger configuration")?;
    log4rs::init_config(config).context("logger already initialized")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log4rs::encode::writer::simple::SimpleWriter;

    fn encode_record(encoder: &ErrorTraceEncoder, level: log::Level) -> String {
        let mut buf = Vec::new();
        encoder
            .encode(
                &mut SimpleWriter(&mut buf),
                &log::Record::builder()
                    .args(format_args!("setup failed"))
                    .level(level)
                    .target("readbench")
                    .build(),
            )
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn error_records_carry_backtrace_when_enabled() {
        let encoder = ErrorTraceEncoder::with_traces("{l} {t} - {m}{n}", true);

        let out = encode_record(&encoder, log::Level::Error);
        assert!(out.starts_with("ERROR readbench - setup failed\n"));
        assert!(out.contains("Backtrace:\n"));
    }

    #[test]
    fn lower_levels_never_carry_backtrace() {
        let encoder = ErrorTraceEncoder::with_traces("{l} {t} - {m}{n}", true);

        let out = encode_record(&encoder, log::Level::Warn);
        assert_eq!(out, "WARN readbench - setup failed\n");
    }

    #[test]
    fn disabled_encoder_writes_only_the_pattern() {
        let encoder = ErrorTraceEncoder::with_traces("{l} - {m}{n}", false);

        assert_eq!(
            encode_record(&encoder, log::Level::Error),
            "ERROR - setup failed\n"
        );
    }
}
