//! Ball tracking: fixed-width vectorization, quality classification and
//! release speed estimation.

use crate::config::BallConfig;
use crate::constants::MPS_TO_KMH;
use crate::geometry::Point2;
use crate::keypoint::BoundingBox;
use crate::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Raw response from the ball detection service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallDetectionResult {
    /// `[frame_idx, [x1, y1, x2, y2] | null]` pairs
    pub results: Vec<(i64, Value)>,
    #[serde(default)]
    pub predicted_pitch_type: Option<String>,
}

impl BallDetectionResult {
    /// Parse the service's JSON body
    ///
    /// # Errors
    ///
    /// Returns `Json` if the text does not match the response layout
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// One tracker entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallObservation {
    pub frame_index: i64,
    pub bbox: Option<BoundingBox>,
}

/// Ordered ball observations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BallTrack {
    pub observations: Vec<BallObservation>,
}

impl BallTrack {
    /// Normalize detector output; malformed boxes become `None`
    #[must_use]
    pub fn from_detection(result: &BallDetectionResult) -> Self {
        let observations = result
            .results
            .iter()
            .map(|(frame_index, raw)| BallObservation {
                frame_index: *frame_index,
                bbox: parse_box(raw),
            })
            .collect();
        Self { observations }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Exactly four non-null numbers, else `None`
fn parse_box(raw: &Value) -> Option<BoundingBox> {
    match raw.as_array()?.as_slice() {
        [x1, y1, x2, y2] => Some(BoundingBox::new(x1.as_f64()?, y1.as_f64()?, x2.as_f64()?, y2.as_f64()?)),
        _ => None,
    }
}

/// Fixed-width ball-center encoding fed to the quality classifier
#[derive(Debug, Clone, PartialEq)]
pub struct BallFeatureVector {
    xs: Vec<Option<f64>>,
    ys: Vec<Option<f64>>,
}

impl BallFeatureVector {
    /// Number of center slots
    #[must_use]
    pub fn width(&self) -> usize {
        self.xs.len()
    }

    #[must_use]
    pub fn xs(&self) -> &[Option<f64>] {
        &self.xs
    }

    #[must_use]
    pub fn ys(&self) -> &[Option<f64>] {
        &self.ys
    }

    /// `x_0..x_{n-1}` followed by `y_0..y_{n-1}`
    #[must_use]
    pub fn named_fields(&self) -> Vec<(String, Option<f64>)> {
        let xs = self.xs.iter().enumerate().map(|(i, v)| (format!("x_{i}"), *v));
        let ys = self.ys.iter().enumerate().map(|(i, v)| (format!("y_{i}"), *v));
        xs.chain(ys).collect()
    }

    /// Flat JSON record with nulls for empty slots
    #[must_use]
    pub fn to_record(&self) -> Map<String, Value> {
        self.named_fields()
            .into_iter()
            .map(|(name, v)| (name, v.map_or(Value::Null, Value::from)))
            .collect()
    }
}

/// Encode ball centers into exactly `target_length` slots
///
/// Slots follow observation order; missing or malformed boxes and padding are
/// `None`, and observations beyond `target_length` are dropped.
#[must_use]
pub fn vectorize_ball_track(track: &BallTrack, target_length: usize) -> BallFeatureVector {
    let centers = track
        .observations
        .iter()
        .map(|o| o.bbox.map(|b| b.center()))
        .chain(std::iter::repeat(None))
        .take(target_length);

    let (xs, ys) = centers.map(|c| (c.map(|p| p.x), c.map(|p| p.y))).unzip();
    BallFeatureVector { xs, ys }
}

/// Probability that a ball flight is a good pitch
pub trait BallQualityClassifier {
    /// Probability of the good-pitch class, in [0, 1]
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError` when the vector does not fit the model
    fn predict_good_probability(&self, features: &BallFeatureVector) -> Result<f64>;
}

/// Logistic model over the ball-center slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticBallClassifier {
    pub weights_x: Vec<f64>,
    pub weights_y: Vec<f64>,
    pub bias: f64,
    /// Value substituted for empty slots
    #[serde(default)]
    pub missing_value: f64,
}

impl LogisticBallClassifier {
    /// Load weights from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

impl BallQualityClassifier for LogisticBallClassifier {
    fn predict_good_probability(&self, features: &BallFeatureVector) -> Result<f64> {
        if self.weights_x.len() != features.width() || self.weights_y.len() != features.width() {
            return Err(Error::ClassifierError(format!(
                "model expects {}/{} slots, vector has {}",
                self.weights_x.len(),
                self.weights_y.len(),
                features.width()
            )));
        }

        let dot = |weights: &[f64], values: &[Option<f64>]| -> f64 {
            weights
                .iter()
                .zip(values)
                .map(|(w, v)| w * v.unwrap_or(self.missing_value))
                .sum::<f64>()
        };
        let logit = self.bias + dot(&self.weights_x, features.xs()) + dot(&self.weights_y, features.ys());
        let probability = 1.0 / (1.0 + (-logit).exp());

        if probability.is_nan() {
            return Err(Error::ClassifierError("model produced NaN".to_string()));
        }
        Ok(probability.clamp(0.0, 1.0))
    }
}

/// Classify a ball track end to end
///
/// # Errors
///
/// Propagates the classifier's error
pub fn classify_ball_quality<C: BallQualityClassifier + ?Sized>(
    track: &BallTrack,
    classifier: &C,
    target_length: usize,
) -> Result<f64> {
    let features = vectorize_ball_track(track, target_length);
    classifier.predict_good_probability(&features)
}

/// Whether a box has a plausible ball shape
#[must_use]
pub fn is_plausible_ball(bbox: &BoundingBox, config: &BallConfig) -> bool {
    let (w, h) = (bbox.width(), bbox.height());
    if w <= 0.0 || h <= 0.0 {
        return false;
    }

    let aspect_ratio = w / h;
    let area = w * h;
    let max_area = match (config.frame_width, config.frame_height) {
        (Some(fw), Some(fh)) => f64::from(fw) * f64::from(fh) * config.max_box_area_fraction,
        _ => f64::INFINITY,
    };

    (config.min_aspect_ratio..=config.max_aspect_ratio).contains(&aspect_ratio)
        && area > config.min_box_area
        && area < max_area
}

/// Highest plausible ball speed between consecutive accepted detections, km/h
///
/// Box corners are truncated to whole pixels and centers floored, matching the
/// overlay renderer. Returns 0.0 when no pair of detections gives a speed
/// within the valid range.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn max_ball_speed_kmh(track: &BallTrack, config: &BallConfig) -> f64 {
    let mut previous: Option<(i64, Point2)> = None;
    let mut max_speed: f64 = 0.0;

    for obs in &track.observations {
        let Some(raw) = obs.bbox else {
            continue;
        };
        let bbox = BoundingBox::new(raw.x1.trunc(), raw.y1.trunc(), raw.x2.trunc(), raw.y2.trunc());
        if !is_plausible_ball(&bbox, config) {
            continue;
        }

        let center = Point2::new(
            ((bbox.x1 + bbox.x2) / 2.0).floor(),
            ((bbox.y1 + bbox.y2) / 2.0).floor(),
        );

        if let Some((prev_frame, prev_center)) = previous {
            let dt = (obs.frame_index - prev_frame) as f64 / config.fps;
            if dt > 0.0 {
                let speed = center.distance(&prev_center) * config.pixel_to_meter / dt * MPS_TO_KMH;
                if (config.min_valid_speed_kmh..=config.max_valid_speed_kmh).contains(&speed) {
                    max_speed = max_speed.max(speed);
                } else {
                    debug!("Discarding implausible ball speed {speed:.1} km/h at frame {}", obs.frame_index);
                }
            }
        }
        previous = Some((obs.frame_index, center));
    }

    if max_speed == 0.0 {
        warn!("No plausible ball speed found in {} observations", track.len());
    }
    max_speed
}
