//! Kinematic feature extraction.
//!
//! Six scalar features are derived from the pose sequence and the detected
//! key frames. Each feature is computed independently; one whose key frame is
//! missing stays `None` while the others are still produced.

use crate::events::DetectedEvents;
use crate::geometry::{segment_orientation, vertex_angle};
use crate::keypoint::{KeypointIndex, PoseFrame, PoseSequence};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ten recognized per-pitch values shared by profiles and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureName {
    TrunkFlexionExcursion,
    PelvisObliquityAtFc,
    TrunkRotationAtBr,
    ShoulderAbductionAtBr,
    TrunkFlexionAtBr,
    TrunkLateralFlexionAtHs,
    ReleaseFrame,
    LandingFrame,
    ShoulderFrame,
    TotalFrames,
}

impl FeatureName {
    pub const ALL: [Self; 10] = [
        Self::TrunkFlexionExcursion,
        Self::PelvisObliquityAtFc,
        Self::TrunkRotationAtBr,
        Self::ShoulderAbductionAtBr,
        Self::TrunkFlexionAtBr,
        Self::TrunkLateralFlexionAtHs,
        Self::ReleaseFrame,
        Self::LandingFrame,
        Self::ShoulderFrame,
        Self::TotalFrames,
    ];

    /// Lower-case key used in statistical profiles
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::TrunkFlexionExcursion => "trunk_flexion_excursion",
            Self::PelvisObliquityAtFc => "pelvis_obliquity_at_fc",
            Self::TrunkRotationAtBr => "trunk_rotation_at_br",
            Self::ShoulderAbductionAtBr => "shoulder_abduction_at_br",
            Self::TrunkFlexionAtBr => "trunk_flexion_at_br",
            Self::TrunkLateralFlexionAtHs => "trunk_lateral_flexion_at_hs",
            Self::ReleaseFrame => "release_frame",
            Self::LandingFrame => "landing_frame",
            Self::ShoulderFrame => "shoulder_frame",
            Self::TotalFrames => "total_frames",
        }
    }

    /// Parse a profile or record key, case-insensitively
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let lower = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.key() == lower)
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Flat per-pitch record: key frames plus six derived features
///
/// Serialized with the analysis report's field names; lower-case aliases let
/// stored historical rows deserialize into the same type.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KinematicFeatures {
    #[serde(default)]
    pub release_frame: Option<u32>,
    #[serde(default)]
    pub landing_frame: Option<u32>,
    #[serde(default)]
    pub shoulder_frame: Option<u32>,
    #[serde(default)]
    pub total_frames: Option<usize>,

    /// Range of shoulder-midpoint y minus hip-midpoint y over the whole motion
    #[serde(rename = "Trunk_flexion_excursion", alias = "trunk_flexion_excursion", default)]
    pub trunk_flexion_excursion: Option<f64>,

    /// Left-hip y minus right-hip y at landing
    #[serde(rename = "Pelvis_obliquity_at_FC", alias = "pelvis_obliquity_at_fc", default)]
    pub pelvis_obliquity_at_fc: Option<f64>,

    /// Orientation of right-shoulder to left-shoulder at release, degrees
    #[serde(rename = "Trunk_rotation_at_BR", alias = "trunk_rotation_at_br", default)]
    pub trunk_rotation_at_br: Option<f64>,

    /// Right elbow angle at release, degrees
    #[serde(rename = "Shoulder_abduction_at_BR", alias = "shoulder_abduction_at_br", default)]
    pub shoulder_abduction_at_br: Option<f64>,

    /// Shoulder-midpoint y minus hip-midpoint y at release
    #[serde(rename = "Trunk_flexion_at_BR", alias = "trunk_flexion_at_br", default)]
    pub trunk_flexion_at_br: Option<f64>,

    /// Left-shoulder y minus right-shoulder y at the first frame
    #[serde(rename = "Trunk_lateral_flexion_at_HS", alias = "trunk_lateral_flexion_at_hs", default)]
    pub trunk_lateral_flexion_at_hs: Option<f64>,
}

impl KinematicFeatures {
    /// Value of one recognized feature
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // frame counts are far below 2^52
    pub fn get(&self, name: FeatureName) -> Option<f64> {
        match name {
            FeatureName::TrunkFlexionExcursion => self.trunk_flexion_excursion,
            FeatureName::PelvisObliquityAtFc => self.pelvis_obliquity_at_fc,
            FeatureName::TrunkRotationAtBr => self.trunk_rotation_at_br,
            FeatureName::ShoulderAbductionAtBr => self.shoulder_abduction_at_br,
            FeatureName::TrunkFlexionAtBr => self.trunk_flexion_at_br,
            FeatureName::TrunkLateralFlexionAtHs => self.trunk_lateral_flexion_at_hs,
            FeatureName::ReleaseFrame => self.release_frame.map(f64::from),
            FeatureName::LandingFrame => self.landing_frame.map(f64::from),
            FeatureName::ShoulderFrame => self.shoulder_frame.map(f64::from),
            FeatureName::TotalFrames => self.total_frames.map(|n| n as f64),
        }
    }

    /// All ten values in `FeatureName::ALL` order
    pub fn values(&self) -> impl Iterator<Item = (FeatureName, Option<f64>)> + '_ {
        FeatureName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    /// True when every value is present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.values().all(|(_, v)| v.is_some())
    }
}

/// Derive the kinematic features of one motion
///
/// `events.shoulder_frame` is carried into the record but no feature uses it.
#[must_use]
pub fn extract_features(sequence: &PoseSequence, events: &DetectedEvents) -> KinematicFeatures {
    let release = frame_at(sequence, events.release_frame, "release");
    let landing = frame_at(sequence, events.landing_frame, "landing");

    KinematicFeatures {
        release_frame: events.release_frame,
        landing_frame: events.landing_frame,
        shoulder_frame: events.shoulder_frame,
        total_frames: Some(sequence.len()),
        trunk_flexion_excursion: trunk_flexion_excursion(sequence),
        pelvis_obliquity_at_fc: landing.map(pelvis_obliquity),
        trunk_rotation_at_br: release.map(trunk_rotation),
        shoulder_abduction_at_br: release.and_then(shoulder_abduction),
        trunk_flexion_at_br: release.map(PoseFrame::trunk_flexion),
        trunk_lateral_flexion_at_hs: sequence.first().map(trunk_lateral_flexion),
    }
}

fn frame_at<'a>(sequence: &'a PoseSequence, frame_index: Option<u32>, event: &str) -> Option<&'a PoseFrame> {
    let index = frame_index?;
    let frame = sequence.frame(index);
    if frame.is_none() {
        warn!("{event} frame {index} is not part of the sequence");
    }
    frame
}

/// Max minus min of per-frame trunk flexion
#[must_use]
pub fn trunk_flexion_excursion(sequence: &PoseSequence) -> Option<f64> {
    if sequence.is_empty() {
        return None;
    }
    let (min, max) = sequence
        .iter()
        .map(PoseFrame::trunk_flexion)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some(max - min)
}

#[must_use]
pub fn pelvis_obliquity(frame: &PoseFrame) -> f64 {
    frame.get(KeypointIndex::LeftHip).y - frame.get(KeypointIndex::RightHip).y
}

#[must_use]
pub fn trunk_rotation(frame: &PoseFrame) -> f64 {
    segment_orientation(
        frame.point(KeypointIndex::RightShoulder),
        frame.point(KeypointIndex::LeftShoulder),
    )
}

#[must_use]
pub fn shoulder_abduction(frame: &PoseFrame) -> Option<f64> {
    vertex_angle(
        frame.point(KeypointIndex::RightWrist),
        frame.point(KeypointIndex::RightElbow),
        frame.point(KeypointIndex::RightShoulder),
    )
}

#[must_use]
pub fn trunk_lateral_flexion(frame: &PoseFrame) -> f64 {
    frame.get(KeypointIndex::LeftShoulder).y - frame.get(KeypointIndex::RightShoulder).y
}
