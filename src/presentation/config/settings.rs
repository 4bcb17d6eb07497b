use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::domain::DeduplicationStrategy;
use crate::infrastructure::conversion::ConversionProvider;
use crate::presentation::router::DEFAULT_MAX_BODY_BYTES;

use super::Environment;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub fetch: FetchSettings,
    pub conversion: ConversionSettings,
    pub queue: QueueSettings,
    pub worker: WorkerSettings,
    pub callback: CallbackSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.{environment}.toml` (optional) under `APP_*` environment
    /// variables, e.g. `APP_SERVER__PORT=8000`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&environment.settings_file()).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("conversion.args")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// A job that can outlive its queue lease is acknowledged too late and
    /// delivered twice. True when no job budget is set or it is not shorter
    /// than the visibility timeout.
    pub fn job_may_outlive_lease(&self) -> bool {
        match self.worker.job_timeout_secs {
            Some(budget) => budget >= self.queue.visibility_timeout_secs,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub diagnostic_fixture: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            diagnostic_fixture: "fixtures/test.wav".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub root: String,
    pub retain_scratch: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: "./tmp".to_string(),
            retain_scratch: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            user_agent: concat!("rvc-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionProviderSetting {
    Command,
    Mock,
}

impl From<ConversionProviderSetting> for ConversionProvider {
    fn from(setting: ConversionProviderSetting) -> Self {
        match setting {
            ConversionProviderSetting::Command => ConversionProvider::Command,
            ConversionProviderSetting::Mock => ConversionProvider::Mock,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    pub provider: ConversionProviderSetting,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub serialize: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            provider: ConversionProviderSetting::Command,
            command: Some("rvc-infer".to_string()),
            args: Vec::new(),
            serialize: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueProviderSetting {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeduplicationSetting {
    RequestId,
    Random,
}

impl From<DeduplicationSetting> for DeduplicationStrategy {
    fn from(setting: DeduplicationSetting) -> Self {
        match setting {
            DeduplicationSetting::RequestId => DeduplicationStrategy::RequestId,
            DeduplicationSetting::Random => DeduplicationStrategy::Random,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    pub provider: QueueProviderSetting,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub group_id: String,
    pub visibility_timeout_secs: u64,
    pub wait_time_secs: u64,
    pub deduplication: DeduplicationSetting,
    pub deduplication_window_secs: u64,
    pub max_receive_count: u32,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            provider: QueueProviderSetting::Memory,
            database_url: None,
            max_connections: 5,
            group_id: "rvc-jobs".to_string(),
            visibility_timeout_secs: 900,
            wait_time_secs: 20,
            deduplication: DeduplicationSetting::RequestId,
            deduplication_window_secs: 300,
            max_receive_count: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    pub enabled: bool,
    pub job_timeout_secs: Option<u64>,
    pub idle_backoff_ms: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            job_timeout_secs: None,
            idle_backoff_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CallbackSettings {
    pub timeout_secs: u64,
}

impl Default for CallbackSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: None,
            json_format: false,
        }
    }
}
