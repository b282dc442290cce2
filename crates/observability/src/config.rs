use std::env;

/// Environment variable selecting the log line format.
pub const LOG_FORMAT_VAR: &str = "STOREFRONT_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    /// Parse a format name; unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `info,storefront_taxonomy=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl ObservabilityConfig {
    /// Read `RUST_LOG` and `STOREFRONT_LOG_FORMAT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_values(env::var("RUST_LOG").ok(), env::var(LOG_FORMAT_VAR).ok())
    }

    /// Build from raw variable values. An unknown format falls back to JSON.
    pub fn from_values(filter: Option<String>, format: Option<String>) -> Self {
        let filter = filter
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let format = match format {
            // Read before any subscriber exists, so `warn!` would go nowhere.
            Some(raw) => LogFormat::parse(&raw).unwrap_or_else(|| {
                eprintln!("{LOG_FORMAT_VAR}={raw:?} is not one of json|pretty|compact; using json");
                LogFormat::Json
            }),
            None => LogFormat::default(),
        };

        Self { filter, format }
    }
}
