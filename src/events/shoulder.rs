use crate::geometry::vertex_angle;
use crate::keypoint::{KeypointIndex, PoseFrame, PoseSequence};
use log::{debug, warn};

/// Landmarks that must be confidently detected in a shoulder candidate
const GATED_KEYPOINTS: [KeypointIndex; 4] = [
    KeypointIndex::LeftShoulder,
    KeypointIndex::RightShoulder,
    KeypointIndex::LeftHip,
    KeypointIndex::RightWrist,
];

/// Scan state: the motion starts once the throwing wrist rises above the shoulder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmingState {
    Waiting,
    Armed,
}

impl ArmingState {
    /// Advance on one frame; `Armed` is terminal
    #[must_use]
    pub fn step(self, frame: &PoseFrame) -> Self {
        match self {
            Self::Armed => Self::Armed,
            Self::Waiting if wrist_above_shoulder(frame) => Self::Armed,
            Self::Waiting => Self::Waiting,
        }
    }
}

/// Shoulder measurements of a surviving frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShoulderCandidate {
    pub frame_index: u32,
    /// Angle at the right shoulder between left shoulder and left hip, degrees
    pub opening_angle: f64,
    /// Horizontal distance between the shoulders, pixels
    pub separation: f64,
}

fn wrist_above_shoulder(frame: &PoseFrame) -> bool {
    frame.get(KeypointIndex::RightWrist).y < frame.get(KeypointIndex::RightShoulder).y
}

/// Measure a frame once the scan is armed
///
/// Frames where the wrist dropped to or below the shoulder, or moved in front
/// of it, are discarded.
#[must_use]
pub fn shoulder_candidate(frame: &PoseFrame) -> Option<ShoulderCandidate> {
    let l_sh = frame.point(KeypointIndex::LeftShoulder);
    let r_sh = frame.point(KeypointIndex::RightShoulder);
    let l_hip = frame.point(KeypointIndex::LeftHip);
    let r_wr = frame.point(KeypointIndex::RightWrist);

    if r_wr.x > r_sh.x || r_wr.y >= r_sh.y {
        return None;
    }

    Some(ShoulderCandidate {
        frame_index: frame.frame_index,
        opening_angle: vertex_angle(l_sh, r_sh, l_hip)?,
        separation: (r_sh.x - l_sh.x).abs(),
    })
}

/// Among the `top_n` widest-shoulder candidates, pick the largest opening angle
///
/// Ties keep the earlier entry in both rankings.
#[must_use]
pub fn select_shoulder(candidates: &[ShoulderCandidate], top_n: usize) -> Option<u32> {
    let mut ranked: Vec<&ShoulderCandidate> = candidates.iter().collect();
    // stable sort keeps scan order among equal separations
    ranked.sort_by(|a, b| b.separation.partial_cmp(&a.separation).unwrap_or(std::cmp::Ordering::Equal));

    ranked
        .into_iter()
        .take(top_n)
        .fold(None, |best: Option<&ShoulderCandidate>, c| match best {
            Some(b) if b.opening_angle >= c.opening_angle => Some(b),
            _ => Some(c),
        })
        .map(|c| c.frame_index)
}

/// Locate the frame of maximum shoulder opening at or before release
///
/// Frames below `min_confidence` on the gated landmarks are skipped before the
/// arming check, so a low-confidence frame can neither arm the scan nor become
/// a candidate. The arming frame itself is evaluated as a candidate.
#[must_use]
pub fn detect_shoulder_frame(
    sequence: &PoseSequence,
    release_frame: u32,
    min_confidence: f64,
    top_n: usize,
) -> Option<u32> {
    let (state, candidates) = sequence
        .iter()
        .take_while(|f| f.frame_index <= release_frame)
        .filter(|f| f.min_confidence(&GATED_KEYPOINTS) >= min_confidence)
        .fold(
            (ArmingState::Waiting, Vec::new()),
            |(state, mut candidates), frame| {
                let state = state.step(frame);
                if state == ArmingState::Armed {
                    candidates.extend(shoulder_candidate(frame));
                }
                (state, candidates)
            },
        );

    if state == ArmingState::Waiting {
        warn!("Throwing wrist never rose above the shoulder before release frame {release_frame}");
        return None;
    }
    if candidates.is_empty() {
        warn!("No frame survived the shoulder opening filters");
        return None;
    }

    let shoulder = select_shoulder(&candidates, top_n);
    debug!(
        "Shoulder frame {:?} selected from {} candidates",
        shoulder,
        candidates.len()
    );
    shoulder
}
