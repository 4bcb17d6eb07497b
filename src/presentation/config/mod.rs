mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment, UnknownEnvironment};
pub use settings::{
    CallbackSettings, ConversionProviderSetting, ConversionSettings, DeduplicationSetting,
    FetchSettings, LoggingSettings, QueueProviderSetting, QueueSettings, ServerSettings, Settings,
    StorageSettings, WorkerSettings,
};
