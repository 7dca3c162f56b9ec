//! Runtime configuration, loaded from an optional JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;
/// Longest accepted chart reveal.
pub const MAX_REVEAL_MS: f64 = 60_000.0;
/// Longest accepted refresh interval.
pub const MAX_FRAME_INTERVAL_MS: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Seed of the preview series.
    pub seed: u32,
    /// Points per preview curve.
    pub steps: usize,
    /// Chart reveal duration in milliseconds.
    pub reveal_ms: f64,
    /// Display refresh interval in milliseconds.
    pub frame_interval_ms: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub device_pixel_ratio: f64,
    /// Simulated inference time in milliseconds.
    pub inference_delay_ms: u64,
    /// Where the CLI keeps session, users and the last result.
    pub data_dir: PathBuf,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            seed: crate::series::DEFAULT_SEED,
            steps: crate::series::DEFAULT_STEPS,
            reveal_ms: crate::animation::REVEAL_DURATION_MS,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            canvas_width: 520.0,
            canvas_height: 280.0,
            device_pixel_ratio: 1.0,
            inference_delay_ms: crate::inference::SIMULATED_DELAY.as_millis() as u64,
            data_dir: PathBuf::from(".triage"),
        }
    }
}

impl TriageConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject timing values the scheduler and the reveal cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_range = |v: f64, max: f64| v.is_finite() && v > 0.0 && v <= max;
        if !in_range(self.frame_interval_ms, MAX_FRAME_INTERVAL_MS) {
            return Err(ConfigError::Invalid {
                field: "frame_interval_ms",
                reason: format!(
                    "{} is not in (0, {MAX_FRAME_INTERVAL_MS}]",
                    self.frame_interval_ms
                ),
            });
        }
        if !(self.reveal_ms == 0.0 || in_range(self.reveal_ms, MAX_REVEAL_MS)) {
            return Err(ConfigError::Invalid {
                field: "reveal_ms",
                reason: format!("{} is not in [0, {MAX_REVEAL_MS}]", self.reveal_ms),
            });
        }
        Ok(())
    }

    /// Refresh interval. Values `validate` would reject fall back to 60 Hz.
    pub fn frame_interval(&self) -> Duration {
        let ms = self.frame_interval_ms;
        let ms = if ms.is_finite() && ms > 0.0 && ms <= MAX_FRAME_INTERVAL_MS {
            ms
        } else {
            DEFAULT_FRAME_INTERVAL_MS
        };
        Duration::try_from_secs_f64(ms / 1000.0)
            .unwrap_or(crate::scheduler::DEFAULT_FRAME_INTERVAL)
    }

    pub fn inference_delay(&self) -> Duration {
        Duration::from_millis(self.inference_delay_ms)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn result_path(&self) -> PathBuf {
        self.data_dir.join("last_result.json")
    }

    /// Persisted navigation fragment.
    pub fn route_path(&self) -> PathBuf {
        self.data_dir.join("route")
    }
}
