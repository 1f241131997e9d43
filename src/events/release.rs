use crate::geometry::{chain_length, vertex_angle};
use crate::keypoint::{KeypointIndex, PoseFrame, PoseSequence};
use log::{debug, warn};

/// Arm configuration of a frame that passed the release predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleaseCandidate {
    pub frame_index: u32,
    /// Angle at the elbow between wrist and shoulder, degrees
    pub elbow_angle: f64,
    /// Wrist to elbow plus elbow to shoulder, pixels
    pub arm_length: f64,
}

/// Evaluate the release predicate on one frame
///
/// The throwing wrist must sit above the shoulder and in front of the elbow.
/// Confidence is not consulted. Frames whose elbow angle is undefined are not
/// candidates.
#[must_use]
pub fn release_candidate(frame: &PoseFrame) -> Option<ReleaseCandidate> {
    let shoulder = frame.point(KeypointIndex::RightShoulder);
    let elbow = frame.point(KeypointIndex::RightElbow);
    let wrist = frame.point(KeypointIndex::RightWrist);

    let wrist_above_shoulder = wrist.y < shoulder.y;
    let elbow_behind_wrist = elbow.x < wrist.x;
    if !(wrist_above_shoulder && elbow_behind_wrist) {
        return None;
    }

    let elbow_angle = vertex_angle(wrist, elbow, shoulder)?;
    Some(ReleaseCandidate {
        frame_index: frame.frame_index,
        elbow_angle,
        arm_length: chain_length(&[wrist, elbow, shoulder]),
    })
}

/// Pick the release among candidates
///
/// Candidates within `angle_tolerance_deg` of the widest elbow angle compete
/// on arm length; the earliest wins a tie.
#[must_use]
pub fn select_release(candidates: &[ReleaseCandidate], angle_tolerance_deg: f64) -> Option<u32> {
    let max_angle = candidates
        .iter()
        .map(|c| c.elbow_angle)
        .fold(f64::NEG_INFINITY, f64::max);

    candidates
        .iter()
        .filter(|c| (c.elbow_angle - max_angle).abs() < angle_tolerance_deg)
        .fold(None, |best: Option<&ReleaseCandidate>, c| match best {
            Some(b) if b.arm_length >= c.arm_length => Some(b),
            _ => Some(c),
        })
        .map(|c| c.frame_index)
}

/// Locate the ball release frame
#[must_use]
pub fn detect_release_frame(sequence: &PoseSequence, angle_tolerance_deg: f64) -> Option<u32> {
    let candidates: Vec<ReleaseCandidate> = sequence.iter().filter_map(release_candidate).collect();

    if candidates.is_empty() {
        warn!("No frame satisfies the release predicate");
        return None;
    }

    let release = select_release(&candidates, angle_tolerance_deg);
    debug!(
        "Release selected {:?} from {} candidates",
        release,
        candidates.len()
    );
    release
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(frame_index: u32, elbow_angle: f64, arm_length: f64) -> ReleaseCandidate {
        ReleaseCandidate {
            frame_index,
            elbow_angle,
            arm_length,
        }
    }

    #[test]
    fn test_widest_angle_wins_outside_tolerance() {
        let candidates = [candidate(1, 120.0, 300.0), candidate(2, 170.0, 100.0)];
        assert_eq!(select_release(&candidates, 5.0), Some(2));
    }

    #[test]
    fn test_arm_length_breaks_near_ties() {
        let candidates = [
            candidate(1, 170.0, 140.0),
            candidate(2, 166.0, 155.0),
            candidate(3, 164.0, 200.0),
        ];
        // 164 is 6 degrees from the maximum and drops out
        assert_eq!(select_release(&candidates, 5.0), Some(2));
    }

    #[test]
    fn test_tolerance_boundary_is_exclusive() {
        let candidates = [candidate(1, 170.0, 100.0), candidate(2, 165.0, 500.0)];
        assert_eq!(select_release(&candidates, 5.0), Some(1));
    }

    #[test]
    fn test_equal_arm_length_keeps_earliest() {
        let candidates = [candidate(4, 170.0, 150.0), candidate(9, 169.0, 150.0)];
        assert_eq!(select_release(&candidates, 5.0), Some(4));
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(select_release(&[], 5.0), None);
        assert_eq!(detect_release_frame(&PoseSequence::default(), 5.0), None);
    }
}
