//! Runtime configuration.
//!
//! Read from the file named by `DROPZONE_CONFIG`, else `./dropzone.json`.
//! Every field has a default, so a config file only needs the keys it
//! overrides.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "DROPZONE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dropzone.json";

/// 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

pub const DEFAULT_ALLOWED_TYPES: [&str; 5] = [
    "image/*",
    "application/pdf",
    "text/*",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid MIME pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropZoneConfig {
    pub policy: UploadPolicy,
    pub simulation: SimulationConfig,
    /// Emulate network latency in the in-memory stores.
    pub simulate_latency: bool,
}

impl Default for DropZoneConfig {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::default(),
            simulation: SimulationConfig::default(),
            simulate_latency: true,
        }
    }
}

impl DropZoneConfig {
    /// Loads the configured file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            log::debug!(target: "dropzone::config", "no config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                log::info!(target: "dropzone::config", "loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!(target: "dropzone::config", "{}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.policy.compile_patterns()?;
        Ok(config)
    }

    /// No latency and no timers. Used by tests and headless runs.
    pub fn instant() -> Self {
        Self {
            policy: UploadPolicy::default(),
            simulation: SimulationConfig {
                progress_step: 10,
                step_interval_ms: 0,
                display_delay_ms: 0,
            },
            simulate_latency: false,
        }
    }
}

/// Size and type constraints applied at intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub max_file_size: u64,
    /// MIME patterns; `*` matches any subtype.
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl UploadPolicy {
    fn compile_patterns(&self) -> Result<Vec<Pattern>, ConfigError> {
        self.allowed_types
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn is_allowed_type(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.to_ascii_lowercase();
        self.allowed_types.iter().any(|pattern| {
            Pattern::new(pattern)
                .map(|p| p.matches(&mime_type))
                .unwrap_or(false)
        })
    }

    /// File extensions for the picker filter, derived from the allow-list.
    pub fn picker_extensions(&self) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .allowed_types
            .iter()
            .filter_map(|pattern| mime_guess::get_mime_extensions_str(pattern))
            .flat_map(|exts| exts.iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }
}

/// Timing of the simulated transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Percentage points added per tick.
    pub progress_step: u8,
    pub step_interval_ms: u64,
    /// How long a finished batch stays on screen before the queue is purged.
    pub display_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            progress_step: 10,
            step_interval_ms: 100,
            display_delay_ms: 2000,
        }
    }
}

impl SimulationConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn display_delay(&self) -> Duration {
        Duration::from_millis(self.display_delay_ms)
    }

    /// Progress values emitted for one file: `0, step, 2*step, ..., 100`.
    pub fn progress_ticks(&self) -> Vec<u8> {
        let step = self.progress_step.clamp(1, 100);
        let mut ticks: Vec<u8> = (0..=100u8).step_by(step as usize).collect();
        if ticks.last() != Some(&100) {
            ticks.push(100);
        }
        ticks
    }
}
