//! Constants used throughout the library

/// Number of body keypoints in the COCO skeletal topology
pub const NUM_KEYPOINTS: usize = 17;

/// Confidence assigned when the source only provides (x, y)
pub const DEFAULT_KEYPOINT_CONFIDENCE: f64 = 1.0;

/// Release candidates within this many degrees of the widest elbow angle compete on arm length
pub const DEFAULT_RELEASE_ANGLE_TOLERANCE_DEG: f64 = 5.0;

/// Landing is taken this many sequence positions before release
pub const DEFAULT_LANDING_BACK_OFFSET: usize = 9;

/// Minimum keypoint confidence for shoulder-frame candidates
pub const DEFAULT_SHOULDER_MIN_CONFIDENCE: f64 = 0.3;

/// Number of widest-shoulder frames compared on opening angle
pub const DEFAULT_SHOULDER_TOP_CANDIDATES: usize = 3;

/// Score lost per standard deviation of deviation from the profile mean
pub const DEFAULT_PENALTY_PER_STD: f64 = 25.0;

/// Maximum per-feature and overall score
pub const MAX_SCORE: f64 = 100.0;

/// Decimal places kept in profile statistics
pub const PROFILE_DECIMALS: i32 = 4;

/// Minimum number of valid samples for a feature to enter a profile
pub const MIN_PROFILE_SAMPLES: usize = 2;

/// Lower and upper percentile used for the profile range
pub const PROFILE_LOW_QUANTILE: f64 = 0.10;
pub const PROFILE_HIGH_QUANTILE: f64 = 0.90;

/// Suffix appended to every profile model name
pub const MODEL_VERSION_SUFFIX: &str = "v1";

/// Pitch-type slot used for the all-pitches fallback profile
pub const ALL_PITCH_TYPES: &str = "all";

/// Pitch type reported by the ball tracker when it could not classify the pitch
pub const UNKNOWN_PITCH_TYPE: &str = "Unknown";

/// Model name reported when no profile was available
pub const NO_MODEL_NAME: &str = "N/A";

/// Fixed number of ball-center slots expected by the ball quality classifier
pub const DEFAULT_BALL_TRACK_LENGTH: usize = 239;

/// Pixel to meter ratio (18.44 m mound distance over roughly 450 px)
pub const DEFAULT_PIXEL_TO_METER: f64 = 0.04;

/// Default frames per second assumption
pub const DEFAULT_FPS: f64 = 30.0;

/// Ball speed plausibility bounds in km/h
pub const DEFAULT_MIN_VALID_SPEED_KMH: f64 = 30.0;
pub const DEFAULT_MAX_VALID_SPEED_KMH: f64 = 200.0;

/// Ball box shape filters
pub const DEFAULT_MIN_BALL_ASPECT_RATIO: f64 = 0.6;
pub const DEFAULT_MAX_BALL_ASPECT_RATIO: f64 = 1.5;
pub const DEFAULT_MIN_BALL_BOX_AREA: f64 = 10.0;
pub const DEFAULT_MAX_BALL_BOX_AREA_FRACTION: f64 = 0.03;

/// Meters per second to kilometers per hour
pub const MPS_TO_KMH: f64 = 3.6;
