// RUNTIME PREFERENCES (User Experience)

use super::compile_time;
use crate::logging::events::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("Runtime configuration already initialized")]
    AlreadyInitialized,
}

/// Read an environment variable, falling back when unset or unparsable
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to require the .chroma extension
    pub require_chroma_extension: bool,

    /// Whether to log timing for every file read
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_chroma_extension: env_or(env_vars::REQUIRE_CHROMA_EXTENSION, true),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to collect per-kind token counts
    pub collect_detailed_metrics: bool,

    /// Whether whitespace, newline and comment tokens count towards metrics
    pub include_trivia_in_counts: bool,

    /// Token ceiling for one source, bounded by the compile-time limit
    pub max_token_count: usize,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_or(env_vars::LEXICAL_DETAILED_METRICS, true),
            include_trivia_in_counts: env_or(env_vars::LEXICAL_INCLUDE_TRIVIA, false),
            max_token_count: env_or(
                env_vars::LEXICAL_MAX_TOKENS,
                compile_time::lexical::MAX_TOKEN_COUNT,
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxPreferences {
    /// Recursion ceiling for the parser, bounded by the compile-time limit
    pub max_parse_depth: usize,

    /// Whether to emit debug events when grammar contexts are entered
    pub trace_contexts: bool,
}

impl Default for SyntaxPreferences {
    fn default() -> Self {
        Self {
            max_parse_depth: env_or(
                env_vars::SYNTAX_MAX_DEPTH,
                compile_time::syntax::MAX_PARSE_DEPTH,
            ),
            trace_contexts: env_or(env_vars::SYNTAX_TRACE_CONTEXTS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level an event needs to reach a logger
    pub min_log_level: LogLevel,

    /// Whether to enable cargo-style error summaries
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env_or(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads for directory processing
    pub max_threads: usize,

    /// Whether directory discovery descends into subdirectories
    pub recursive: bool,

    /// Whether to stop at the first failing file
    pub fail_fast: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        let detected = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(compile_time::batch_processing::MAX_WORKER_THREADS);

        Self {
            max_threads: env_or(env_vars::BATCH_MAX_THREADS, detected),
            recursive: env_or(env_vars::BATCH_RECURSIVE, true),
            fail_fast: env_or(env_vars::BATCH_FAIL_FAST, false),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub syntax: SyntaxPreferences,
    pub logging: LoggingPreferences,
    pub batch: BatchPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document. Missing tables and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject preferences that step outside the compile-time limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lexical.max_token_count == 0
            || self.lexical.max_token_count > compile_time::lexical::MAX_TOKEN_COUNT
        {
            return Err(ConfigError::InvalidValue {
                key: "lexical.max_token_count",
                reason: format!(
                    "must be between 1 and {}",
                    compile_time::lexical::MAX_TOKEN_COUNT
                ),
            });
        }

        if self.syntax.max_parse_depth == 0
            || self.syntax.max_parse_depth > compile_time::syntax::MAX_PARSE_DEPTH
        {
            return Err(ConfigError::InvalidValue {
                key: "syntax.max_parse_depth",
                reason: format!(
                    "must be between 1 and {}",
                    compile_time::syntax::MAX_PARSE_DEPTH
                ),
            });
        }

        if self.batch.max_threads == 0
            || self.batch.max_threads > compile_time::batch_processing::MAX_WORKER_THREADS
        {
            return Err(ConfigError::InvalidValue {
                key: "batch.max_threads",
                reason: format!(
                    "must be between 1 and {}",
                    compile_time::batch_processing::MAX_WORKER_THREADS
                ),
            });
        }

        Ok(())
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_CHROMA_EXTENSION: &str = "CHROMA_REQUIRE_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "CHROMA_ENABLE_PERFORMANCE_LOGGING";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "CHROMA_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_TRIVIA: &str = "CHROMA_LEXICAL_INCLUDE_TRIVIA";
    pub const LEXICAL_MAX_TOKENS: &str = "CHROMA_LEXICAL_MAX_TOKENS";

    // Syntax
    pub const SYNTAX_MAX_DEPTH: &str = "CHROMA_SYNTAX_MAX_DEPTH";
    pub const SYNTAX_TRACE_CONTEXTS: &str = "CHROMA_SYNTAX_TRACE_CONTEXTS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "CHROMA_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "CHROMA_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "CHROMA_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "CHROMA_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "CHROMA_LOGGING_INCLUDE_FILE_CONTEXT";

    // Batch
    pub const BATCH_MAX_THREADS: &str = "CHROMA_BATCH_MAX_THREADS";
    pub const BATCH_RECURSIVE: &str = "CHROMA_BATCH_RECURSIVE";
    pub const BATCH_FAIL_FAST: &str = "CHROMA_BATCH_FAIL_FAST";
}
