//! Configuration management for the pitch analysis engine

use crate::constants::{
    DEFAULT_BALL_TRACK_LENGTH, DEFAULT_FPS, DEFAULT_LANDING_BACK_OFFSET, DEFAULT_MAX_BALL_ASPECT_RATIO,
    DEFAULT_MAX_BALL_BOX_AREA_FRACTION, DEFAULT_MAX_VALID_SPEED_KMH, DEFAULT_MIN_BALL_ASPECT_RATIO,
    DEFAULT_MIN_BALL_BOX_AREA, DEFAULT_MIN_VALID_SPEED_KMH, DEFAULT_PENALTY_PER_STD, DEFAULT_PIXEL_TO_METER,
    DEFAULT_RELEASE_ANGLE_TOLERANCE_DEG, DEFAULT_SHOULDER_MIN_CONFIDENCE, DEFAULT_SHOULDER_TOP_CANDIDATES,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pose loader configuration
    pub loader: LoaderConfig,

    /// Event detector configuration
    pub events: EventConfig,

    /// Profile comparison configuration
    pub scoring: ScoringConfig,

    /// Ball track configuration
    pub ball: BallConfig,
}

/// Pose loader options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Take confidences from `keypoint_scores` when keypoints are given as (x, y)
    pub use_keypoint_scores: bool,
}

/// Event detector tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Elbow-angle window below the maximum in which arm length decides release
    pub release_angle_tolerance_deg: f64,

    /// Sequence positions between landing and release
    pub landing_back_offset: usize,

    /// Minimum confidence on the shoulder detector's keypoints
    pub shoulder_min_confidence: f64,

    /// Widest-shoulder frames compared on opening angle
    pub shoulder_top_candidates: usize,
}

/// Comparison scorer tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points lost per standard deviation
    pub penalty_per_std: f64,
}

/// Ball track tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Number of center slots in the classifier feature vector
    pub target_length: usize,

    /// Pixel to meter ratio for speed estimation
    pub pixel_to_meter: f64,

    /// Video frame rate
    pub fps: f64,

    /// Lowest plausible ball speed
    pub min_valid_speed_kmh: f64,

    /// Highest plausible ball speed
    pub max_valid_speed_kmh: f64,

    /// Width/height bounds for a ball box
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,

    /// Box area must exceed this many square pixels
    pub min_box_area: f64,

    /// Box area must stay below this fraction of the frame area
    pub max_box_area_fraction: f64,

    /// Frame size in pixels, when known
    pub frame_width: Option<u32>,
    pub frame_height: Option<u32>,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            release_angle_tolerance_deg: DEFAULT_RELEASE_ANGLE_TOLERANCE_DEG,
            landing_back_offset: DEFAULT_LANDING_BACK_OFFSET,
            shoulder_min_confidence: DEFAULT_SHOULDER_MIN_CONFIDENCE,
            shoulder_top_candidates: DEFAULT_SHOULDER_TOP_CANDIDATES,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            penalty_per_std: DEFAULT_PENALTY_PER_STD,
        }
    }
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            target_length: DEFAULT_BALL_TRACK_LENGTH,
            pixel_to_meter: DEFAULT_PIXEL_TO_METER,
            fps: DEFAULT_FPS,
            min_valid_speed_kmh: DEFAULT_MIN_VALID_SPEED_KMH,
            max_valid_speed_kmh: DEFAULT_MAX_VALID_SPEED_KMH,
            min_aspect_ratio: DEFAULT_MIN_BALL_ASPECT_RATIO,
            max_aspect_ratio: DEFAULT_MAX_BALL_ASPECT_RATIO,
            min_box_area: DEFAULT_MIN_BALL_BOX_AREA,
            max_box_area_fraction: DEFAULT_MAX_BALL_BOX_AREA_FRACTION,
            frame_width: None,
            frame_height: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the text is not a valid configuration
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first out-of-range setting
    pub fn validate(&self) -> Result<()> {
        // Event detectors
        if !self.events.release_angle_tolerance_deg.is_finite() || self.events.release_angle_tolerance_deg < 0.0 {
            return Err(Error::ConfigError(
                "Release angle tolerance must be a non-negative number of degrees".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.events.shoulder_min_confidence) {
            return Err(Error::ConfigError(
                "Shoulder minimum confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.events.shoulder_top_candidates == 0 {
            return Err(Error::ConfigError(
                "Shoulder top candidates must be greater than 0".to_string(),
            ));
        }

        // Scoring
        if !self.scoring.penalty_per_std.is_finite() || self.scoring.penalty_per_std <= 0.0 {
            return Err(Error::ConfigError("Penalty per std must be greater than 0".to_string()));
        }

        // Ball track
        if self.ball.target_length == 0 {
            return Err(Error::ConfigError("Ball target length must be greater than 0".to_string()));
        }
        if self.ball.pixel_to_meter <= 0.0 {
            return Err(Error::ConfigError("Pixel to meter ratio must be greater than 0".to_string()));
        }
        if self.ball.fps <= 0.0 {
            return Err(Error::ConfigError("FPS must be greater than 0".to_string()));
        }
        if self.ball.min_valid_speed_kmh > self.ball.max_valid_speed_kmh {
            return Err(Error::ConfigError(format!(
                "Minimum valid speed {} exceeds maximum {}",
                self.ball.min_valid_speed_kmh, self.ball.max_valid_speed_kmh
            )));
        }
        if self.ball.min_aspect_ratio > self.ball.max_aspect_ratio {
            return Err(Error::ConfigError(format!(
                "Minimum aspect ratio {} exceeds maximum {}",
                self.ball.min_aspect_ratio, self.ball.max_aspect_ratio
            )));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Pitch Kinematics Configuration

# Pose loader
loader:
  use_keypoint_scores: false

# Event detectors
events:
  release_angle_tolerance_deg: 5.0
  landing_back_offset: 9
  shoulder_min_confidence: 0.3
  shoulder_top_candidates: 3

# Profile comparison
scoring:
  penalty_per_std: 25.0

# Ball track
ball:
  target_length: 239
  pixel_to_meter: 0.04
  fps: 30.0
  min_valid_speed_kmh: 30.0
  max_valid_speed_kmh: 200.0
  min_aspect_ratio: 0.6
  max_aspect_ratio: 1.5
  min_box_area: 10.0
  max_box_area_fraction: 0.03
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed = Config::from_yaml_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed = Config::from_yaml_str("events:\n  landing_back_offset: 6\n").unwrap();
        assert_eq!(parsed.events.landing_back_offset, 6);
        assert_eq!(parsed.events.shoulder_top_candidates, DEFAULT_SHOULDER_TOP_CANDIDATES);
        assert_eq!(parsed.ball.target_length, DEFAULT_BALL_TRACK_LENGTH);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.events.shoulder_min_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scoring.penalty_per_std = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ball.min_valid_speed_kmh = 300.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ball.target_length = 0;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = Config::from_yaml_str("events: [1, 2");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("pitch_kinematics_config_{}.yaml", std::process::id()));
        let mut config = Config::default();
        config.loader.use_keypoint_scores = true;
        config.ball.frame_width = Some(1280);
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
