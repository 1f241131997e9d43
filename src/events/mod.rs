//! Key-frame detection over a pose sequence.
//!
//! Each detector returns `None` when its event cannot be located; callers
//! carry that forward as missing data.

/// Ball release detection from throwing-arm extension
pub mod release;

/// Front-foot landing as a fixed offset before release
pub mod landing;

/// Maximum shoulder opening during the arm cocking phase
pub mod shoulder;

use crate::config::EventConfig;
use crate::keypoint::PoseSequence;
use log::{info, warn};
use serde::{Deserialize, Serialize};

pub use landing::detect_landing_frame;
pub use release::detect_release_frame;
pub use shoulder::detect_shoulder_frame;

/// Key frames of one throwing motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectedEvents {
    pub release_frame: Option<u32>,
    pub landing_frame: Option<u32>,
    pub shoulder_frame: Option<u32>,
    pub total_frames: usize,
}

/// Run all three detectors
#[must_use]
pub fn detect_events(sequence: &PoseSequence, config: &EventConfig) -> DetectedEvents {
    let release_frame = detect_release_frame(sequence, config.release_angle_tolerance_deg);
    let (landing_frame, shoulder_frame) = match release_frame {
        Some(release) => (
            detect_landing_frame(sequence, release, config.landing_back_offset),
            detect_shoulder_frame(
                sequence,
                release,
                config.shoulder_min_confidence,
                config.shoulder_top_candidates,
            ),
        ),
        None => {
            warn!("No release frame detected; landing and shoulder frames are unavailable");
            (None, None)
        }
    };

    let events = DetectedEvents {
        release_frame,
        landing_frame,
        shoulder_frame,
        total_frames: sequence.len(),
    };
    info!(
        "Detected events: release={:?} landing={:?} shoulder={:?} over {} frames",
        events.release_frame, events.landing_frame, events.shoulder_frame, events.total_frames
    );
    events
}
