pub const DEFAULT_FILTER: &str = "info,rvc_server=debug,tower_http=info";

/// Subscriber options resolved from settings before tracing is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter directives used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            json_format: false,
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }

    pub fn with_json(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }

    /// Replaces the default directives; `None` keeps them.
    pub fn with_level(mut self, level: Option<&str>) -> Self {
        if let Some(level) = level.map(str::trim).filter(|l| !l.is_empty()) {
            self.default_filter = level.to_string();
        }
        self
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::new("local")
    }
}
