//! Configuration for the chroma compiler
//!
//! Hard limits live in [`constants::compile_time`] and cannot be changed at
//! runtime. User preferences live in [`runtime`] and come from `CHROMA_*`
//! environment variables or a TOML file.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{ConfigError, RuntimeConfig};

use std::sync::OnceLock;

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Install the process-wide runtime configuration. Only the first call wins.
pub fn init_runtime_config(config: RuntimeConfig) -> Result<(), ConfigError> {
    config.validate()?;

    RUNTIME_CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// Process-wide runtime configuration, falling back to environment defaults.
pub fn runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get_or_init(RuntimeConfig::default)
}
