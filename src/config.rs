//! Kernel tunables and command line options

use crate::error::{LightError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MAX_SOURCES: usize = 10;
pub const MAX_OBSTACLES: usize = 16;

/// Per-source intensity below which a source is skipped for a pixel
pub const MIN_VISIBLE_INTENSITY: f32 = 1e-3;

/// Accumulated opacity below which the obstacle loop stops early
pub const MIN_OPACITY: f32 = 1e-3;

/// Distances are clamped to this before dividing (pixel on top of a source)
pub const MIN_DISTANCE: f32 = 1.0;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Tunable constants read by the illumination kernel.
///
/// Every field has a default, so a scene file may carry only the fields it
/// wants to change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub max_sources: usize,
    pub max_obstacles: usize,
    pub min_visible_intensity: f32,
    pub min_opacity: f32,
    pub min_distance: f32,
    /// Bounding-box rejection before the exact intersection test
    pub pruning: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_sources: MAX_SOURCES,
            max_obstacles: MAX_OBSTACLES,
            min_visible_intensity: MIN_VISIBLE_INTENSITY,
            min_opacity: MIN_OPACITY,
            min_distance: MIN_DISTANCE,
            pruning: true,
        }
    }
}

impl KernelConfig {
    /// Length of an encoded sources buffer
    #[inline]
    pub fn sources_len(&self) -> usize {
        self.max_sources * crate::lighting::SOURCE_STRIDE
    }

    /// Length of an encoded obstacles buffer
    #[inline]
    pub fn obstacles_len(&self) -> usize {
        self.max_obstacles * crate::lighting::OBSTACLE_STRIDE
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_sources == 0 {
            return Err(LightError::InvalidConfig("max_sources must be at least 1".into()));
        }
        if self.max_obstacles == 0 {
            return Err(LightError::InvalidConfig("max_obstacles must be at least 1".into()));
        }
        let thresholds = [
            ("min_visible_intensity", self.min_visible_intensity),
            ("min_opacity", self.min_opacity),
            ("min_distance", self.min_distance),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(LightError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.min_distance <= 0.0 {
            return Err(LightError::InvalidConfig("min_distance must be positive".into()));
        }
        Ok(())
    }
}

/// Command line options for the `umbra` binary
#[derive(Parser, Debug, Clone)]
#[command(name = "umbra")]
#[command(about = "Point lights and shadow-casting segments, lit per pixel")]
pub struct Cli {
    /// Window width in pixels
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Window height in pixels
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Disable VSync for uncapped framerate
    #[arg(long)]
    pub no_vsync: bool,

    /// Scene file (created with S, reloaded with L)
    #[arg(short, long, default_value = "scene.json")]
    pub scene: PathBuf,

    /// Override the number of source slots
    #[arg(long)]
    pub max_sources: Option<usize>,

    /// Override the number of obstacle slots
    #[arg(long)]
    pub max_obstacles: Option<usize>,

    /// Override the minimum visible intensity threshold
    #[arg(long)]
    pub min_intensity: Option<f32>,

    /// Override the opacity early-exit threshold
    #[arg(long)]
    pub min_opacity: Option<f32>,

    /// Run the exact intersection test against every obstacle
    #[arg(long)]
    pub no_pruning: bool,

    /// Worker threads for the per-pixel dispatch (0 = one per core)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// MQTT broker for remote control (disabled when absent)
    #[arg(long)]
    pub mqtt_host: Option<String>,

    /// MQTT topic to subscribe to
    #[arg(long, default_value = "umbra")]
    pub mqtt_topic: String,
}

impl Cli {
    /// Apply command line overrides on top of a scene's kernel section
    pub fn kernel_config(&self, base: KernelConfig) -> Result<KernelConfig> {
        let mut config = base;
        if let Some(n) = self.max_sources {
            config.max_sources = n;
        }
        if let Some(n) = self.max_obstacles {
            config.max_obstacles = n;
        }
        if let Some(v) = self.min_intensity {
            config.min_visible_intensity = v;
        }
        if let Some(v) = self.min_opacity {
            config.min_opacity = v;
        }
        if self.no_pruning {
            config.pruning = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lengths() {
        let config = KernelConfig::default();
        assert_eq!(config.sources_len(), MAX_SOURCES * 6);
        assert_eq!(config.obstacles_len(), MAX_OBSTACLES * 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: KernelConfig = serde_json::from_str(r#"{"max_obstacles": 4}"#).unwrap();
        assert_eq!(config.max_obstacles, 4);
        assert_eq!(config.max_sources, MAX_SOURCES);
        assert!(config.pruning);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = KernelConfig {
            max_sources: 0,
            ..KernelConfig::default()
        };
        assert!(config.validate().is_err());

        let config = KernelConfig {
            min_opacity: f32::NAN,
            ..KernelConfig::default()
        };
        assert!(config.validate().is_err());

        let config = KernelConfig {
            min_distance: 0.0,
            ..KernelConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "umbra",
            "--max-sources",
            "4",
            "--min-opacity",
            "0.01",
            "--no-pruning",
        ])
        .unwrap();
        let config = cli.kernel_config(KernelConfig::default()).unwrap();
        assert_eq!(config.max_sources, 4);
        assert_eq!(config.min_opacity, 0.01);
        assert!(!config.pruning);
        assert_eq!(config.max_obstacles, MAX_OBSTACLES);
        assert_eq!(cli.width, DEFAULT_WIDTH);
    }
}
