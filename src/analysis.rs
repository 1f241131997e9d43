//! End-to-end pitch analysis: pose and ball detections in, report out.

use crate::ball::{classify_ball_quality, max_ball_speed_kmh, BallDetectionResult, BallQualityClassifier, BallTrack};
use crate::config::Config;
use crate::constants::{NO_MODEL_NAME, UNKNOWN_PITCH_TYPE};
use crate::events::detect_events;
use crate::kinematics::{extract_features, KinematicFeatures};
use crate::loader::{load_pose_sequence, PoseDetectionResult};
use crate::profile::StatisticalProfile;
use crate::scoring::{score_against_profile, select_profile, ProfileRepository};
use crate::{Error, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Who threw the pitch and whom to compare against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub pitcher_name: String,
    /// Reference pitcher; the subject's own profile when absent
    #[serde(default)]
    pub benchmark_pitcher: Option<String>,
}

impl AnalysisRequest {
    #[must_use]
    pub fn new(pitcher_name: impl Into<String>) -> Self {
        Self {
            pitcher_name: pitcher_name.into(),
            benchmark_pitcher: None,
        }
    }

    #[must_use]
    pub fn with_benchmark(mut self, benchmark: impl Into<String>) -> Self {
        self.benchmark_pitcher = Some(benchmark.into());
        self
    }

    /// Pitcher whose profile is used for comparison
    #[must_use]
    pub fn comparison_target(&self) -> &str {
        self.benchmark_pitcher
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.pitcher_name)
    }
}

/// Result of analyzing one pitch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchReport {
    pub pitcher_name: String,
    pub detected_pitch_type: String,
    pub features: KinematicFeatures,
    /// Similarity to the reference profile, 0-100
    pub pitch_score: u32,
    /// Good-pitch probability from the ball classifier, 0-1
    pub ball_score: f64,
    pub max_speed_kmh: f64,
    pub model_name: String,
    pub profile: Option<StatisticalProfile>,
}

/// Runs the full pipeline against a profile store
pub struct PitchAnalyzer {
    config: Config,
    repository: Box<dyn ProfileRepository>,
    classifier: Option<Box<dyn BallQualityClassifier>>,
}

impl PitchAnalyzer {
    /// Create an analyzer
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation
    pub fn new(config: Config, repository: Box<dyn ProfileRepository>) -> Result<Self> {
        config.validate()?;
        info!("Initializing pitch analyzer");
        Ok(Self {
            config,
            repository,
            classifier: None,
        })
    }

    /// Attach a ball quality classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: Box<dyn BallQualityClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze one pitch
    ///
    /// Missing events, a missing profile or a missing classifier degrade the
    /// report rather than failing it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty pitcher name, `MalformedInput` for a
    /// pose result that breaks the frame contract, and classifier errors.
    pub fn analyze(
        &self,
        pose: &PoseDetectionResult,
        ball: Option<&BallDetectionResult>,
        request: &AnalysisRequest,
    ) -> Result<PitchReport> {
        if request.pitcher_name.trim().is_empty() {
            return Err(Error::InvalidInput("Pitcher name must not be empty".to_string()));
        }
        info!("Analyzing pitch for '{}'", request.pitcher_name);

        let sequence = load_pose_sequence(pose, &self.config.loader)?;
        let events = detect_events(&sequence, &self.config.events);
        let features = extract_features(&sequence, &events);

        let detected_pitch_type = ball
            .and_then(|b| b.predicted_pitch_type.clone())
            .filter(|pt| !pt.is_empty())
            .unwrap_or_else(|| UNKNOWN_PITCH_TYPE.to_string());

        let target = request.comparison_target();
        let selected = select_profile(&*self.repository, target, Some(detected_pitch_type.as_str()));
        let pitch_score = match &selected {
            Some(s) => score_against_profile(&features, &s.profile, self.config.scoring.penalty_per_std),
            None => {
                warn!("No comparison profile found for '{target}'; pitch score is 0");
                0
            }
        };

        let track = ball.map(BallTrack::from_detection).unwrap_or_default();
        let ball_score = match (&self.classifier, ball) {
            (Some(classifier), Some(_)) => {
                classify_ball_quality(&track, &**classifier, self.config.ball.target_length)?
            }
            (None, _) => {
                warn!("Ball quality classifier not loaded; ball score is 0");
                0.0
            }
            (Some(_), None) => {
                warn!("No ball detections supplied; ball score is 0");
                0.0
            }
        };
        let max_speed_kmh = (max_ball_speed_kmh(&track, &self.config.ball) * 100.0).round() / 100.0;

        let (model_name, profile) = match selected {
            Some(s) => (s.model_name, Some(s.profile)),
            None => (NO_MODEL_NAME.to_string(), None),
        };
        info!("Pitch score {pitch_score} against '{model_name}', ball score {ball_score:.3}, max speed {max_speed_kmh} km/h");

        Ok(PitchReport {
            pitcher_name: request.pitcher_name.clone(),
            detected_pitch_type,
            features,
            pitch_score,
            ball_score,
            max_speed_kmh,
            model_name,
            profile,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::InMemoryProfileRepository;

    #[test]
    fn test_comparison_target_defaults_to_subject() {
        let request = AnalysisRequest::new("Subject");
        assert_eq!(request.comparison_target(), "Subject");
        assert_eq!(request.clone().with_benchmark("Ace").comparison_target(), "Ace");
        assert_eq!(request.with_benchmark("").comparison_target(), "Subject");
    }

    #[test]
    fn test_empty_pitcher_name_rejected() {
        let analyzer = PitchAnalyzer::new(Config::default(), Box::new(InMemoryProfileRepository::new())).unwrap();
        let result = analyzer.analyze(&PoseDetectionResult::default(), None, &AnalysisRequest::new("  "));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_empty_pose_yields_degraded_report() {
        let analyzer = PitchAnalyzer::new(Config::default(), Box::new(InMemoryProfileRepository::new())).unwrap();
        let report = analyzer
            .analyze(&PoseDetectionResult::default(), None, &AnalysisRequest::new("Subject"))
            .unwrap();

        assert_eq!(report.detected_pitch_type, "Unknown");
        assert_eq!(report.pitch_score, 0);
        assert_eq!(report.ball_score, 0.0);
        assert_eq!(report.max_speed_kmh, 0.0);
        assert_eq!(report.model_name, "N/A");
        assert!(report.profile.is_none());
        assert_eq!(report.features.total_frames, Some(0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.ball.fps = 0.0;
        assert!(PitchAnalyzer::new(config, Box::new(InMemoryProfileRepository::new())).is_err());
    }
}
