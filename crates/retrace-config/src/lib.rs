pub mod config;
pub mod triggers;

pub use config::{EngineConfig, CONFIG_PATH_ENV, DEFAULT_HISTORY_BOUND};
pub use triggers::TriggerConfig;
