//! Pitching kinematics library for baseball motion analysis.
//!
//! This library turns per-frame 2D human pose detections of a pitching
//! motion into biomechanical features and compares them against statistical
//! profiles of reference pitchers:
//! - Key-frame detection (ball release, front-foot landing, maximum shoulder opening)
//! - Six scalar kinematic features derived from those frames
//! - Percentile/mean/std profiles built from historical pitches
//! - Z-score similarity scoring against a chosen profile
//! - Ball-flight vectorization, quality classification and speed estimation
//!
//! The analysis pipeline consists of:
//! 1. Loading the pose detector's output into a validated [`keypoint::PoseSequence`]
//! 2. Detecting key frames
//! 3. Extracting kinematic features
//! 4. Selecting a reference profile and scoring against it
//!
//! # Examples
//!
//! ## Feature Extraction
//!
//! ```no_run
//! use pitch_kinematics::{config::Config, events::detect_events,
//!                        kinematics::extract_features, loader::load_pose_sequence_from_json};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let json = std::fs::read_to_string("pose.json")?;
//!
//! let sequence = load_pose_sequence_from_json(&json, &config.loader)?;
//! let events = detect_events(&sequence, &config.events);
//! let features = extract_features(&sequence, &events);
//!
//! println!("Release frame: {:?}", events.release_frame);
//! println!("Trunk rotation at release: {:?}", features.trunk_rotation_at_br);
//! # Ok(())
//! # }
//! ```
//!
//! ## Building and Scoring Against a Profile
//!
//! ```no_run
//! use pitch_kinematics::{kinematics::KinematicFeatures, profile::build_profile,
//!                        scoring::score_against_profile};
//!
//! # fn main() {
//! let history: Vec<KinematicFeatures> = Vec::new();
//! let profile = build_profile(&history);
//!
//! let pitch = KinematicFeatures::default();
//! let score = score_against_profile(&pitch, &profile, 25.0);
//! println!("Similarity: {score}/100");
//! # }
//! ```
//!
//! ## Complete Pipeline Example
//!
//! ```no_run
//! use pitch_kinematics::{
//!     analysis::{AnalysisRequest, PitchAnalyzer},
//!     ball::BallDetectionResult,
//!     config::Config,
//!     loader::PoseDetectionResult,
//!     scoring::InMemoryProfileRepository,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryProfileRepository::from_file("profiles.yaml")?;
//! let analyzer = PitchAnalyzer::new(Config::default(), Box::new(repository))?;
//!
//! let pose = PoseDetectionResult::from_json_str(&std::fs::read_to_string("pose.json")?)?;
//! let ball = BallDetectionResult::from_json_str(&std::fs::read_to_string("ball.json")?)?;
//!
//! let request = AnalysisRequest::new("Subject").with_benchmark("Ohtani, Shohei");
//! let report = analyzer.analyze(&pose, Some(&ball), &request)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

/// 2D point math: angles, orientations and distances
pub mod geometry;

/// COCO keypoint topology, pose frames and sequences
pub mod keypoint;

/// Pose detection result normalization
pub mod loader;

/// Key-frame detectors for release, landing and shoulder opening
pub mod events;

/// Kinematic feature extraction
pub mod kinematics;

/// Statistical profile building from historical pitches
pub mod profile;

/// Profile selection and similarity scoring
pub mod scoring;

/// Ball track vectorization, classification and speed estimation
pub mod ball;

/// End-to-end pitch analysis
pub mod analysis;

pub use error::{Error, Result};
