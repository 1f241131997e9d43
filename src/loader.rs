//! Pose detection result parsing.
//!
//! The pose service returns one entry per video frame with zero or more
//! person predictions. Frames without a prediction are dropped; the first
//! prediction of every other frame becomes a [`PoseFrame`]. Any keypoint array
//! that is not 17 entries of `[x, y]` or `[x, y, score]` rejects the whole
//! sequence.

use crate::config::LoaderConfig;
use crate::constants::DEFAULT_KEYPOINT_CONFIDENCE;
use crate::keypoint::{BoundingBox, Keypoint, KeypointIndex, PoseFrame, PoseSequence};
use crate::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw response from the pose detection service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoseDetectionResult {
    pub frames: Vec<DetectedFrame>,
}

/// One video frame of the pose response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFrame {
    pub frame_idx: u32,
    #[serde(default)]
    pub predictions: Vec<PosePrediction>,
}

/// One detected person
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosePrediction {
    pub keypoints: Vec<Vec<f64>>,
    #[serde(default)]
    pub bbox: Option<Value>,
    #[serde(default)]
    pub keypoint_scores: Option<Vec<f64>>,
}

impl PoseDetectionResult {
    /// Parse the service's JSON body
    ///
    /// # Errors
    ///
    /// Returns `Json` if the text does not match the response layout
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Normalize a pose detection result into a sequence
///
/// # Errors
///
/// Returns `MalformedInput` if a prediction violates the 17-keypoint shape or
/// frame indices do not strictly increase
pub fn load_pose_sequence(result: &PoseDetectionResult, config: &LoaderConfig) -> Result<PoseSequence> {
    let mut frames = Vec::with_capacity(result.frames.len());

    for detected in &result.frames {
        let Some(prediction) = detected.predictions.first() else {
            continue;
        };
        frames.push(normalize_prediction(detected.frame_idx, prediction, config)?);
    }

    debug!(
        "Loaded {} pose frames out of {} detector frames",
        frames.len(),
        result.frames.len()
    );

    PoseSequence::new(frames)
}

/// Parse and normalize a JSON pose response in one step
///
/// # Errors
///
/// Returns `Json` for unparsable text and `MalformedInput` for shape violations
pub fn load_pose_sequence_from_json(content: &str, config: &LoaderConfig) -> Result<PoseSequence> {
    let result = PoseDetectionResult::from_json_str(content)?;
    load_pose_sequence(&result, config)
}

fn normalize_prediction(frame_idx: u32, prediction: &PosePrediction, config: &LoaderConfig) -> Result<PoseFrame> {
    if prediction.keypoints.len() != KeypointIndex::COUNT {
        return Err(Error::MalformedInput(format!(
            "frame {frame_idx}: expected {} keypoints, got {}",
            KeypointIndex::COUNT,
            prediction.keypoints.len()
        )));
    }

    let scores = external_scores(frame_idx, prediction, config);
    let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];

    for (i, (slot, raw)) in keypoints.iter_mut().zip(&prediction.keypoints).enumerate() {
        *slot = match raw.as_slice() {
            [x, y] => Keypoint::new(*x, *y, scores.map_or(DEFAULT_KEYPOINT_CONFIDENCE, |s| s[i])),
            [x, y, score] => Keypoint::new(*x, *y, *score),
            other => {
                return Err(Error::MalformedInput(format!(
                    "frame {frame_idx}: keypoint {i} has {} values, expected 2 or 3",
                    other.len()
                )))
            }
        };
    }

    let mut frame = PoseFrame::new(frame_idx, keypoints);
    frame.bbox = prediction.bbox.as_ref().and_then(unwrap_bbox);
    Ok(frame)
}

fn external_scores<'a>(frame_idx: u32, prediction: &'a PosePrediction, config: &LoaderConfig) -> Option<&'a [f64]> {
    if !config.use_keypoint_scores {
        return None;
    }
    match prediction.keypoint_scores.as_deref() {
        Some(scores) if scores.len() == KeypointIndex::COUNT => Some(scores),
        Some(scores) => {
            debug!(
                "frame {frame_idx}: ignoring {} keypoint scores, expected {}",
                scores.len(),
                KeypointIndex::COUNT
            );
            None
        }
        None => None,
    }
}

/// Unwrap `[[x1, y1, x2, y2]]`-style nesting down to four numbers
#[must_use]
pub fn unwrap_bbox(value: &Value) -> Option<BoundingBox> {
    let mut current = value;
    while let Some(inner) = current.as_array().and_then(|a| a.first()).filter(|v| v.is_array()) {
        current = inner;
    }

    match current.as_array()?.as_slice() {
        [x1, y1, x2, y2] => Some(BoundingBox::new(x1.as_f64()?, y1.as_f64()?, x2.as_f64()?, y2.as_f64()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keypoints_json(width: usize) -> Value {
        let kps: Vec<Vec<f64>> = (0..17)
            .map(|i| {
                let mut kp = vec![i as f64, 100.0 + i as f64];
                if width == 3 {
                    kp.push(0.5);
                }
                kp
            })
            .collect();
        json!(kps)
    }

    #[test]
    fn test_two_wide_keypoints_default_confidence() {
        let body = json!({
            "frames": [
                {"frame_idx": 0, "predictions": [{"keypoints": keypoints_json(2)}]},
                {"frame_idx": 1, "predictions": []},
                {"frame_idx": 2, "predictions": [{"keypoints": keypoints_json(3)}]}
            ]
        });
        let seq = load_pose_sequence_from_json(&body.to_string(), &LoaderConfig::default()).unwrap();

        assert_eq!(seq.len(), 2);
        assert_eq!(seq.frames()[0].frame_index, 0);
        assert_eq!(seq.frames()[1].frame_index, 2);
        assert_eq!(seq.frames()[0].get(KeypointIndex::Nose).confidence, 1.0);
        assert_eq!(seq.frames()[1].get(KeypointIndex::Nose).confidence, 0.5);
        assert_eq!(seq.frames()[0].get(KeypointIndex::RightAnkle).x, 16.0);
    }

    #[test]
    fn test_keypoint_scores_when_enabled() {
        let scores: Vec<f64> = (0..17).map(|i| i as f64 / 20.0).collect();
        let body = json!({
            "frames": [{"frame_idx": 3, "predictions": [{"keypoints": keypoints_json(2), "keypoint_scores": scores}]}]
        });
        let text = body.to_string();

        let ignored = load_pose_sequence_from_json(&text, &LoaderConfig::default()).unwrap();
        assert_eq!(ignored.frames()[0].get(KeypointIndex::LeftEye).confidence, 1.0);

        let config = LoaderConfig {
            use_keypoint_scores: true,
        };
        let used = load_pose_sequence_from_json(&text, &config).unwrap();
        assert!((used.frames()[0].get(KeypointIndex::LeftEye).confidence - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_keypoint_count_is_malformed() {
        let mut kps = keypoints_json(2);
        kps.as_array_mut().unwrap().pop();
        let body = json!({"frames": [{"frame_idx": 0, "predictions": [{"keypoints": kps}]}]});
        let result = load_pose_sequence_from_json(&body.to_string(), &LoaderConfig::default());
        assert!(matches!(result, Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_wrong_keypoint_width_is_malformed() {
        let mut kps = keypoints_json(2);
        kps[4] = json!([1.0]);
        let body = json!({"frames": [{"frame_idx": 0, "predictions": [{"keypoints": kps}]}]});
        let result = load_pose_sequence_from_json(&body.to_string(), &LoaderConfig::default());
        assert!(matches!(result, Err(Error::MalformedInput(msg)) if msg.contains("keypoint 4")));
    }

    #[test]
    fn test_unwrap_nested_bbox() {
        assert_eq!(
            unwrap_bbox(&json!([[[1, 2, 3, 4]]])),
            Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(
            unwrap_bbox(&json!([5.5, 6.0, 7.0, 8.0])),
            Some(BoundingBox::new(5.5, 6.0, 7.0, 8.0))
        );
        assert_eq!(unwrap_bbox(&json!([[1, 2, 3]])), None);
        assert_eq!(unwrap_bbox(&json!([])), None);
        assert_eq!(unwrap_bbox(&json!([1, null, 3, 4])), None);
        assert_eq!(unwrap_bbox(&json!("box")), None);
    }

    #[test]
    fn test_bbox_attached_to_frame() {
        let body = json!({
            "frames": [{"frame_idx": 0, "predictions": [{"keypoints": keypoints_json(2), "bbox": [[10, 20, 30, 40]]}]}]
        });
        let seq = load_pose_sequence_from_json(&body.to_string(), &LoaderConfig::default()).unwrap();
        assert_eq!(seq.frames()[0].bbox, Some(BoundingBox::new(10.0, 20.0, 30.0, 40.0)));
    }

    #[test]
    fn test_empty_result() {
        let seq = load_pose_sequence(&PoseDetectionResult::default(), &LoaderConfig::default()).unwrap();
        assert!(seq.is_empty());
    }
}
