use crate::errors::{EvaluationError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for [`crate::PositionAnalyzer`] and its backends
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub cache: CacheConfig,
    pub mistake: MistakeConfig,
    pub selection: SelectionConfig,
    pub engine: UciEngineConfig,
    pub tablebase: LichessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entries per cached map
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Thresholds for critical mistake detection, in centipawns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MistakeConfig {
    /// Evaluations at or below this magnitude are treated as noise for sign flips
    pub noise_floor_cp: i32,
    /// Drop that counts as a regression
    pub regression_threshold_cp: i32,
    /// Above this magnitude the engine is reporting a tablebase-range score
    pub saturation_cp: i32,
    pub deep_analysis_timeout_ms: u64,
}

impl Default for MistakeConfig {
    fn default() -> Self {
        Self {
            noise_floor_cp: 50,
            regression_threshold_cp: 200,
            saturation_cp: 10_000,
            deep_analysis_timeout_ms: 3_000,
        }
    }
}

impl MistakeConfig {
    pub fn deep_analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.deep_analysis_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Candidates requested from the tablebase
    pub top_moves: usize,
    /// Pool sampled by human-like selection when it does not play best
    pub human_like_pool: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_moves: 10,
            human_like_pool: 3,
        }
    }
}

/// UCI engine process settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UciEngineConfig {
    pub path: String,
    pub depth: Option<u8>,
    pub movetime_ms: Option<u64>,
    pub deep_depth: Option<u8>,
    pub deep_movetime_ms: Option<u64>,
    pub threads: Option<u8>,
    pub hash_mb: Option<u32>,
    /// Upper bound on waiting for any single line of engine output
    pub read_timeout_ms: u64,
}

impl Default for UciEngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(), // Assume stockfish in PATH
            depth: Some(12),
            movetime_ms: None,
            deep_depth: Some(22),
            deep_movetime_ms: None,
            threads: Some(1),
            hash_mb: Some(64),
            read_timeout_ms: 10_000,
        }
    }
}

impl UciEngineConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// HTTP tablebase settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LichessConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for LichessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tablebase.lichess.ovh".to_string(),
            timeout_ms: 5_000,
        }
    }
}

impl AnalyzerConfig {
    /// Load and validate a JSON configuration file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            EvaluationError::Configuration(format!(
                "Cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(contents)
            .map_err(|e| EvaluationError::Configuration(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(crate::validation_error!("cache.capacity", 0, "> 0"));
        }
        let mistake = &self.mistake;
        if mistake.noise_floor_cp < 0 {
            return Err(crate::validation_error!(
                "mistake.noise_floor_cp",
                mistake.noise_floor_cp,
                ">= 0"
            ));
        }
        if mistake.regression_threshold_cp < 0 {
            return Err(crate::validation_error!(
                "mistake.regression_threshold_cp",
                mistake.regression_threshold_cp,
                ">= 0"
            ));
        }
        if mistake.saturation_cp <= mistake.regression_threshold_cp {
            return Err(crate::validation_error!(
                "mistake.saturation_cp",
                mistake.saturation_cp,
                format!("> {}", mistake.regression_threshold_cp)
            ));
        }
        if mistake.deep_analysis_timeout_ms == 0 {
            return Err(crate::validation_error!(
                "mistake.deep_analysis_timeout_ms",
                0,
                "> 0"
            ));
        }
        if self.selection.top_moves == 0 {
            return Err(crate::validation_error!("selection.top_moves", 0, "> 0"));
        }
        if self.selection.human_like_pool == 0 {
            return Err(crate::validation_error!("selection.human_like_pool", 0, "> 0"));
        }
        if self.engine.path.trim().is_empty() {
            return Err(crate::validation_error!("engine.path", "", "an executable path"));
        }
        Ok(())
    }
}
