use crate::presentation::config::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Anything other than `json` (any case) falls back to human-readable output.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: Environment,
    pub format: LogFormat,
}

impl TracingConfig {
    pub fn new(environment: Environment, format: LogFormat) -> Self {
        Self {
            environment,
            format,
        }
    }

    /// Reads `LOG_FORMAT` from the process environment.
    pub fn from_env(environment: Environment) -> Self {
        let raw = std::env::var("LOG_FORMAT").ok();
        Self::new(environment, LogFormat::parse(raw.as_deref()))
    }
}
