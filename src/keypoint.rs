//! COCO 17-keypoint topology and per-frame pose records.

use crate::constants::NUM_KEYPOINTS;
use crate::geometry::Point2;
use serde::{Deserialize, Serialize};

/// COCO keypoint indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = NUM_KEYPOINTS;

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEye),
            2 => Some(Self::RightEye),
            3 => Some(Self::LeftEar),
            4 => Some(Self::RightEar),
            5 => Some(Self::LeftShoulder),
            6 => Some(Self::RightShoulder),
            7 => Some(Self::LeftElbow),
            8 => Some(Self::RightElbow),
            9 => Some(Self::LeftWrist),
            10 => Some(Self::RightWrist),
            11 => Some(Self::LeftHip),
            12 => Some(Self::RightHip),
            13 => Some(Self::LeftKnee),
            14 => Some(Self::RightKnee),
            15 => Some(Self::LeftAnkle),
            16 => Some(Self::RightAnkle),
            _ => None,
        }
    }

    /// Snake-case landmark name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// Single keypoint in pixel coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,
}

impl Keypoint {
    #[must_use]
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Position without the confidence channel
    #[must_use]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

/// Axis-aligned box `(x1, y1, x2, y2)` in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// One frame of a detected subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub frame_index: u32,
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
    /// Person box from the detector, when it was well formed
    pub bbox: Option<BoundingBox>,
}

impl PoseFrame {
    #[must_use]
    pub fn new(frame_index: u32, keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self {
            frame_index,
            keypoints,
            bbox: None,
        }
    }

    /// Keypoint by landmark
    #[must_use]
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// Landmark position
    #[must_use]
    pub fn point(&self, index: KeypointIndex) -> Point2 {
        self.get(index).point()
    }

    /// Lowest confidence among the given landmarks
    #[must_use]
    pub fn min_confidence(&self, indices: &[KeypointIndex]) -> f64 {
        indices
            .iter()
            .map(|&i| self.get(i).confidence)
            .fold(f64::INFINITY, f64::min)
    }

    /// Shoulder-midpoint y minus hip-midpoint y
    #[must_use]
    pub fn trunk_flexion(&self) -> f64 {
        let shoulders = self
            .point(KeypointIndex::LeftShoulder)
            .midpoint(&self.point(KeypointIndex::RightShoulder));
        let hips = self.point(KeypointIndex::LeftHip).midpoint(&self.point(KeypointIndex::RightHip));
        shoulders.y - hips.y
    }
}

/// Frames of one subject ordered by ascending frame index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSequence {
    frames: Vec<PoseFrame>,
}

impl PoseSequence {
    /// Build a sequence, rejecting frame indices that do not strictly increase
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` when the ordering invariant is violated
    pub fn new(frames: Vec<PoseFrame>) -> crate::Result<Self> {
        if let Some(pair) = frames.windows(2).find(|w| w[1].frame_index <= w[0].frame_index) {
            return Err(crate::Error::MalformedInput(format!(
                "frame index {} follows {}; indices must strictly increase",
                pair[1].frame_index, pair[0].frame_index
            )));
        }
        Ok(Self { frames })
    }

    #[must_use]
    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoseFrame> {
        self.frames.iter()
    }

    #[must_use]
    pub fn first(&self) -> Option<&PoseFrame> {
        self.frames.first()
    }

    /// Position of a frame index within the sequence
    #[must_use]
    pub fn position_of(&self, frame_index: u32) -> Option<usize> {
        self.frames
            .binary_search_by_key(&frame_index, |f| f.frame_index)
            .ok()
    }

    /// Frame with the given frame index
    #[must_use]
    pub fn frame(&self, frame_index: u32) -> Option<&PoseFrame> {
        self.position_of(frame_index).map(|pos| &self.frames[pos])
    }

    /// Frame at a sequence position
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&PoseFrame> {
        self.frames.get(position)
    }
}

impl<'a> IntoIterator for &'a PoseSequence {
    type Item = &'a PoseFrame;
    type IntoIter = std::slice::Iter<'a, PoseFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
