// src/logging.rs

//! `tracing` subscriber for the `fedorable` binary.
//!
//! `--log-level` wins over `FEDORABLE_LOG`, which accepts full
//! `EnvFilter` directives (`fedorable::exec=debug,info`). Output goes to
//! stderr because the script's own stdout is replayed on ours.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "FEDORABLE_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let directives = match (cli_level, env.map(str::trim)) {
        (Some(level), _) => level.as_directive().to_string(),
        (None, Some(env)) if !env.is_empty() => env.to_string(),
        _ => DEFAULT_DIRECTIVE.to_string(),
    };

    EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid {LOG_ENV_VAR} directives '{directives}'"))
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_overrides_environment() {
        let filter = build_filter(Some(LogLevel::Warn), Some("trace")).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn environment_directives_are_used_verbatim() {
        let filter = build_filter(None, Some(" fedorable::exec=debug ")).unwrap();
        assert_eq!(filter.to_string(), "fedorable::exec=debug");
    }

    #[test]
    fn blank_environment_falls_back_to_info() {
        let filter = build_filter(None, Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn garbage_directives_are_an_error() {
        assert!(build_filter(None, Some("fedorable=loudest")).is_err());
    }
}
