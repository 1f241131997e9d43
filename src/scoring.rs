//! Z-score comparison of one pitch against a reference profile.

use crate::constants::{MAX_SCORE, UNKNOWN_PITCH_TYPE};
use crate::kinematics::{FeatureName, KinematicFeatures};
use crate::profile::{model_name, StatisticalProfile};
use crate::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Read access to stored profiles
pub trait ProfileRepository {
    /// Profile stored under a model name
    fn get_profile(&self, model_name: &str) -> Option<StatisticalProfile>;

    /// Profile for a pitcher and optional pitch type
    fn lookup_profile(&self, pitcher: &str, pitch_type: Option<&str>) -> Option<StatisticalProfile> {
        self.get_profile(&model_name(pitcher, pitch_type))
    }
}

/// Profiles held in memory, keyed by model name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryProfileRepository {
    profiles: HashMap<String, StatisticalProfile>,
}

impl InMemoryProfileRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace a profile, returning the previous one
    pub fn insert(&mut self, model_name: impl Into<String>, profile: StatisticalProfile) -> Option<StatisticalProfile> {
        self.profiles.insert(model_name.into(), profile)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Load a model-name → profile map from YAML or JSON
    ///
    /// JSON is a subset of YAML, so both parse with the YAML reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write all profiles as YAML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    fn get_profile(&self, model_name: &str) -> Option<StatisticalProfile> {
        self.profiles.get(model_name).cloned()
    }
}

/// Profile chosen for a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedProfile {
    pub model_name: String,
    pub profile: StatisticalProfile,
}

/// Choose the comparison profile for a benchmark pitcher
///
/// A pitch-type specific profile is tried first when the pitch type is known,
/// then the pitcher's all-pitches profile.
pub fn select_profile<R: ProfileRepository + ?Sized>(
    repository: &R,
    benchmark_pitcher: &str,
    detected_pitch_type: Option<&str>,
) -> Option<SelectedProfile> {
    if let Some(pitch_type) = detected_pitch_type.filter(|pt| !pt.is_empty() && *pt != UNKNOWN_PITCH_TYPE) {
        let name = model_name(benchmark_pitcher, Some(pitch_type));
        info!("Trying pitch-type profile '{name}'");
        if let Some(profile) = repository.get_profile(&name) {
            return Some(SelectedProfile {
                model_name: name,
                profile,
            });
        }
    }

    let name = model_name(benchmark_pitcher, None);
    warn!("No pitch-type profile available, trying '{name}'");
    repository.get_profile(&name).map(|profile| SelectedProfile {
        model_name: name,
        profile,
    })
}

/// Per-feature contribution to a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureScore {
    pub feature: &'static str,
    pub z_score: f64,
    pub score: f64,
}

/// Score one value against a mean and standard deviation
///
/// Returns `None` when the standard deviation is zero.
#[must_use]
pub fn feature_score(value: f64, mean: f64, std: f64, penalty_per_std: f64) -> Option<(f64, f64)> {
    if std == 0.0 {
        return None;
    }
    let z = ((value - mean) / std).abs();
    Some((z, (MAX_SCORE - penalty_per_std * z).max(0.0)))
}

/// Per-feature scores for every feature comparable against the profile
#[must_use]
pub fn feature_scores(
    features: &KinematicFeatures,
    profile: &StatisticalProfile,
    penalty_per_std: f64,
) -> Vec<FeatureScore> {
    FeatureName::ALL
        .into_iter()
        .filter_map(|name| {
            let value = features.get(name)?;
            let stats = profile.get(name)?;
            let (z_score, score) = feature_score(value, stats.mean?, stats.std?, penalty_per_std)?;
            debug!("{name}: value={value:.4} z={z_score:.3} score={score:.2}");
            Some(FeatureScore {
                feature: name.key(),
                z_score,
                score,
            })
        })
        .collect()
}

/// Similarity score in 0..=100
///
/// The mean of per-feature scores, truncated. Zero when nothing is comparable.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score_against_profile(features: &KinematicFeatures, profile: &StatisticalProfile, penalty_per_std: f64) -> u32 {
    let scores = feature_scores(features, profile, penalty_per_std);
    if scores.is_empty() {
        warn!("No comparable features between pitch and profile; score is 0");
        return 0;
    }

    // the average lies in [0, 100]
    let average = scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64;
    average as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FeatureStats;

    fn stats(mean: f64, std: f64) -> FeatureStats {
        FeatureStats {
            min: mean - std,
            max: mean + std,
            p10: mean - std,
            p50_median: mean,
            p90: mean + std,
            mean: Some(mean),
            std: Some(std),
        }
    }

    #[test]
    fn test_feature_score_bounds() {
        assert_eq!(feature_score(10.0, 10.0, 2.0, 25.0), Some((0.0, 100.0)));
        assert_eq!(feature_score(18.0, 10.0, 2.0, 25.0), Some((4.0, 0.0)));
        assert_eq!(feature_score(2.0, 10.0, 2.0, 25.0), Some((4.0, 0.0)));
        assert_eq!(feature_score(30.0, 10.0, 2.0, 25.0).map(|s| s.1), Some(0.0));
        assert_eq!(feature_score(1.0, 1.0, 0.0, 25.0), None);
    }

    #[test]
    fn test_average_is_truncated() {
        let mut profile = StatisticalProfile::new();
        profile.insert(FeatureName::TrunkFlexionAtBr, stats(0.0, 3.0));
        profile.insert(FeatureName::TotalFrames, stats(40.0, 10.0));

        let features = KinematicFeatures {
            trunk_flexion_at_br: Some(1.0),
            total_frames: Some(40),
            ..KinematicFeatures::default()
        };
        // (91.666.. + 100) / 2 = 95.83
        assert_eq!(score_against_profile(&features, &profile, 25.0), 95);
    }

    #[test]
    fn test_null_features_and_zero_std_skipped() {
        let mut profile = StatisticalProfile::new();
        profile.insert(FeatureName::TrunkFlexionAtBr, stats(0.0, 0.0));
        profile.insert(FeatureName::PelvisObliquityAtFc, stats(5.0, 1.0));
        profile.insert(FeatureName::ShoulderAbductionAtBr, stats(150.0, 10.0));

        let features = KinematicFeatures {
            trunk_flexion_at_br: Some(0.0),
            pelvis_obliquity_at_fc: None,
            shoulder_abduction_at_br: Some(160.0),
            ..KinematicFeatures::default()
        };
        let scores = feature_scores(&features, &profile, 25.0);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].feature, "shoulder_abduction_at_br");
        assert_eq!(score_against_profile(&features, &profile, 25.0), 75);
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let features = KinematicFeatures {
            trunk_flexion_at_br: Some(0.0),
            ..KinematicFeatures::default()
        };
        assert_eq!(score_against_profile(&features, &StatisticalProfile::new(), 25.0), 0);
    }

    #[test]
    fn test_select_profile_order() {
        let mut repo = InMemoryProfileRepository::new();
        let mut specific = StatisticalProfile::new();
        specific.insert(FeatureName::TotalFrames, stats(40.0, 1.0));
        let mut general = StatisticalProfile::new();
        general.insert(FeatureName::TotalFrames, stats(50.0, 1.0));
        repo.insert("Ace_FF_v1", specific.clone());
        repo.insert("Ace_all_v1", general.clone());

        let hit = select_profile(&repo, "Ace", Some("FF")).unwrap();
        assert_eq!(hit.model_name, "Ace_FF_v1");
        assert_eq!(hit.profile, specific);

        let fallback = select_profile(&repo, "Ace", Some("SL")).unwrap();
        assert_eq!(fallback.model_name, "Ace_all_v1");

        let unknown = select_profile(&repo, "Ace", Some("Unknown")).unwrap();
        assert_eq!(unknown.model_name, "Ace_all_v1");

        assert_eq!(select_profile(&repo, "Ace", None).unwrap().profile, general);
        assert!(select_profile(&repo, "Nobody", Some("FF")).is_none());
    }

    #[test]
    fn test_lookup_profile_by_parts() {
        let mut repo = InMemoryProfileRepository::new();
        repo.insert("Ace_all_v1", StatisticalProfile::new());
        assert!(repo.lookup_profile("Ace", None).is_some());
        assert!(repo.lookup_profile("Ace", Some("CU")).is_none());
    }
}
