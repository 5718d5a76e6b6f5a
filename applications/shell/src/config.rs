/// Shell configuration
use crate::error::{Result, ShellError};
use melo_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "melo.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// JSON track manifest; the built-in demo library is used when unset
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `melo.toml` is read when
    /// present. `MELO_*` variables override both, with `__` between
    /// sections (`MELO_PLAYBACK__SKIP_STEP_MS=5000`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with MELO_)
        settings = settings.add_source(
            config::Environment::with_prefix("MELO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ShellError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ShellError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let playback = &self.playback;

        if playback.sample_interval_ms == 0 {
            return Err(ShellError::Config(
                "playback.sample_interval_ms must be greater than zero".to_string(),
            ));
        }

        if playback.completion_tolerance_ms >= playback.sample_interval_ms {
            return Err(ShellError::Config(format!(
                "playback.completion_tolerance_ms ({}) must be smaller than the sample interval ({})",
                playback.completion_tolerance_ms, playback.sample_interval_ms
            )));
        }

        if playback.skip_step_ms == 0 {
            return Err(ShellError::Config(
                "playback.skip_step_ms must be greater than zero".to_string(),
            ));
        }

        if playback.event_capacity == 0 {
            return Err(ShellError::Config(
                "playback.event_capacity must be greater than zero".to_string(),
            ));
        }

        if let Some(manifest) = &self.library.manifest {
            if !manifest.exists() {
                return Err(ShellError::Config(format!(
                    "Track manifest not found at {:?}",
                    manifest
                )));
            }
        }

        Ok(())
    }
}

fn default_log_filter() -> String {
    "melo=info,melo_shell=info,melo_playback=info".to_string()
}
