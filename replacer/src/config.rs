use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a replace run.
///
/// File-based settings can be loaded from, in order of precedence:
/// 1. Custom config file specified via `--config`
/// 2. Local `.replacer.yaml` in the current directory
/// 3. Global `$HOME/.config/replacer/config.yaml`
///
/// Example:
/// ```yaml
/// root_path: "."
/// thread_count: 4
/// large_file_threshold: 2147483648
/// timeout_secs: 180
/// log_level: "info"
/// ```
///
/// The search and replacement strings are per-invocation and only come from
/// the CLI; they are never read from a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceConfig {
    /// Literal text to search for
    #[serde(skip)]
    pub search: String,

    /// Text to substitute for each occurrence
    #[serde(skip)]
    pub replace: String,

    /// Root directory to walk
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Worker threads per queue
    /// Defaults to the number of CPU cores
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Size in bytes above which a file is streamed instead of rewritten
    /// in memory
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: u64,

    /// Upper bound on total run time, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or_else(|| NonZeroUsize::new(1).unwrap())
}

fn default_large_file_threshold() -> u64 {
    2 * 1024 * 1024 * 1024 // 2 GiB
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ReplaceConfig {
    fn default() -> Self {
        Self {
            search: String::new(),
            replace: String::new(),
            root_path: default_root_path(),
            thread_count: default_thread_count(),
            large_file_threshold: default_large_file_threshold(),
            timeout_secs: default_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

impl ReplaceConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("replacer/config.yaml")),
            // Local config
            Some(PathBuf::from(".replacer.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values. CLI values take
    /// precedence.
    pub fn merge_with_cli(mut self, cli_config: ReplaceConfig) -> Self {
        self.search = cli_config.search;
        self.replace = cli_config.replace;
        self.root_path = cli_config.root_path;
        // Always use the CLI thread count; the CLI falls back to the file
        // value itself when the flag is absent. The timeout is resolved by
        // the CLI the same way and never merged here, so a file-configured
        // timeout_secs survives.
        self.thread_count = cli_config.thread_count;
        if cli_config.large_file_threshold != default_large_file_threshold() {
            self.large_file_threshold = cli_config.large_file_threshold;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
