//! Statistical reference profiles built from historical pitches.
//!
//! A profile holds, per recognized feature, the 10th/50th/90th percentiles,
//! mean and sample standard deviation of a cohort. `min` and `max` carry the
//! 10th and 90th percentiles rather than the true extremes, which clips
//! outliers out of the reported range.

use crate::constants::{
    ALL_PITCH_TYPES, MIN_PROFILE_SAMPLES, MODEL_VERSION_SUFFIX, PROFILE_DECIMALS, PROFILE_HIGH_QUANTILE,
    PROFILE_LOW_QUANTILE,
};
use crate::kinematics::{FeatureName, KinematicFeatures};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics of one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    /// Alias of `p10`
    pub min: f64,
    /// Alias of `p90`
    pub max: f64,
    pub p10: f64,
    pub p50_median: f64,
    pub p90: f64,
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub std: Option<f64>,
}

impl FeatureStats {
    /// Statistics of at least two values, rounded for storage
    ///
    /// Returns `None` for fewer than [`MIN_PROFILE_SAMPLES`] values.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.len() < MIN_PROFILE_SAMPLES {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let p10 = round_to(quantile_sorted(&sorted, PROFILE_LOW_QUANTILE), PROFILE_DECIMALS);
        let p90 = round_to(quantile_sorted(&sorted, PROFILE_HIGH_QUANTILE), PROFILE_DECIMALS);

        Some(Self {
            min: p10,
            max: p90,
            p10,
            p50_median: round_to(quantile_sorted(&sorted, 0.5), PROFILE_DECIMALS),
            p90,
            mean: Some(round_to(mean(values), PROFILE_DECIMALS)),
            std: Some(round_to(sample_std(values), PROFILE_DECIMALS)),
        })
    }
}

/// Per-feature statistics keyed by lower-case feature name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatisticalProfile {
    features: BTreeMap<String, FeatureStats>,
}

impl StatisticalProfile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: FeatureName, stats: FeatureStats) {
        self.features.insert(name.key().to_string(), stats);
    }

    /// Statistics for a recognized feature; keys are matched case-insensitively
    #[must_use]
    pub fn get(&self, name: FeatureName) -> Option<&FeatureStats> {
        self.features.get(name.key()).or_else(|| {
            self.features
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name.key()))
                .map(|(_, v)| v)
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureStats)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Build a profile from historical feature records
///
/// Features with fewer than two non-null values are left out. An empty input
/// yields an empty profile.
#[must_use]
pub fn build_profile(records: &[KinematicFeatures]) -> StatisticalProfile {
    let mut profile = StatisticalProfile::new();
    if records.is_empty() {
        warn!("No feature records supplied; profile is empty");
        return profile;
    }

    for name in FeatureName::ALL {
        let values: Vec<f64> = records.iter().filter_map(|r| r.get(name)).collect();
        match FeatureStats::from_values(&values) {
            Some(stats) => profile.insert(name, stats),
            None => warn!(
                "Feature '{name}' has {} valid values, need {MIN_PROFILE_SAMPLES}; skipped",
                values.len()
            ),
        }
    }

    profile
}

/// Stored pitch with the metadata used for cohort selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRecord {
    pub player_name: String,
    #[serde(default)]
    pub pitch_type: Option<String>,
    /// Pitch outcome text, e.g. "called_strike" or "foul"
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub features: KinematicFeatures,
}

impl PitchRecord {
    /// Strikes and fouls count as good pitches
    #[must_use]
    pub fn is_good_pitch(&self) -> bool {
        self.description.as_deref().is_some_and(|d| {
            let d = d.to_lowercase();
            d.contains("strike") || d.contains("foul")
        })
    }
}

/// Pitcher and optional pitch type defining a reference group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    pub pitcher: String,
    pub pitch_type: Option<String>,
}

impl Cohort {
    #[must_use]
    pub fn new(pitcher: impl Into<String>, pitch_type: Option<String>) -> Self {
        Self {
            pitcher: pitcher.into(),
            pitch_type,
        }
    }

    /// Storage key: `<pitcher>_<pitch_type>_v1` or `<pitcher>_all_v1`
    #[must_use]
    pub fn model_name(&self) -> String {
        model_name(&self.pitcher, self.pitch_type.as_deref())
    }

    /// Good pitches of this pitcher, restricted to the pitch type when one is set
    #[must_use]
    pub fn contains(&self, record: &PitchRecord) -> bool {
        record.player_name == self.pitcher
            && record.is_good_pitch()
            && self
                .pitch_type
                .as_deref()
                .map_or(true, |pt| record.pitch_type.as_deref() == Some(pt))
    }

    /// Records belonging to this cohort
    pub fn select<'a>(&'a self, records: &'a [PitchRecord]) -> impl Iterator<Item = &'a PitchRecord> + 'a {
        records.iter().filter(move |r| self.contains(r))
    }
}

/// Profile model name for a pitcher and optional pitch type
#[must_use]
pub fn model_name(pitcher: &str, pitch_type: Option<&str>) -> String {
    format!(
        "{pitcher}_{}_{MODEL_VERSION_SUFFIX}",
        pitch_type.unwrap_or(ALL_PITCH_TYPES)
    )
}

/// Named profile ready for storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchModel {
    pub model_name: String,
    pub profile: StatisticalProfile,
    pub source_feature_count: usize,
}

/// Select a cohort's records and build its profile
///
/// Returns `None` when the cohort is empty or no feature had enough data.
#[must_use]
pub fn build_cohort_profile(cohort: &Cohort, records: &[PitchRecord]) -> Option<PitchModel> {
    let features: Vec<KinematicFeatures> = cohort.select(records).map(|r| r.features).collect();
    let name = cohort.model_name();

    if features.is_empty() {
        warn!("No training records match cohort '{name}'");
        return None;
    }
    info!("Building profile '{name}' from {} records", features.len());

    let profile = build_profile(&features);
    if profile.is_empty() {
        warn!("Profile '{name}' has no feature with enough data");
        return None;
    }

    Some(PitchModel {
        model_name: name,
        profile,
        source_feature_count: features.len(),
    })
}

/// Linearly interpolated quantile of sorted data
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    #[allow(clippy::cast_precision_loss)]
    let idx_f = q.clamp(0.0, 1.0) * (n - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx_low = idx_f.floor() as usize;
    let idx_high = (idx_low + 1).min(n - 1);
    #[allow(clippy::cast_precision_loss)]
    let frac = idx_f - idx_low as f64;

    sorted[idx_low] + (sorted[idx_high] - sorted[idx_low]) * frac
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with Bessel's correction
#[allow(clippy::cast_precision_loss)]
fn sample_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
