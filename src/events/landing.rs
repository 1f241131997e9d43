use crate::keypoint::PoseSequence;
use log::warn;

/// Locate front-foot landing as `back_offset` sequence positions before release
///
/// Positions are counted in the ordered sequence, not by frame-index
/// arithmetic, so dropped frames shift the result.
#[must_use]
pub fn detect_landing_frame(sequence: &PoseSequence, release_frame: u32, back_offset: usize) -> Option<u32> {
    let Some(release_position) = sequence.position_of(release_frame) else {
        warn!("Release frame {release_frame} is not part of the sequence");
        return None;
    };

    let Some(landing_position) = release_position.checked_sub(back_offset) else {
        warn!("Landing would fall {back_offset} frames before release position {release_position}, outside the sequence");
        return None;
    };

    sequence.at(landing_position).map(|f| f.frame_index)
}
