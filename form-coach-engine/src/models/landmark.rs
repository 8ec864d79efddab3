/// Landmark models for pose estimation frames
///
/// A frame is the ordered landmark array produced by the external pose
/// estimator. Index positions follow the 33-point MediaPipe layout and are
/// fixed for the whole crate.

use serde::{Deserialize, Serialize};

/// Single tracked joint as delivered by the pose estimator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// X coordinate normalized to the image width (0-1)
    pub x: f32,
    /// Y coordinate normalized to the image height (0-1), growing downwards
    pub y: f32,
    /// Depth estimate relative to the hips, smaller is closer to the camera
    #[serde(default)]
    pub z: f32,
    /// Detection confidence (0-1), absent when the estimator did not report one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    /// Create a landmark with an explicit visibility score
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: Some(visibility),
        }
    }

    /// Whether the landmark can be trusted at the given confidence threshold.
    ///
    /// A missing visibility score or a non-finite coordinate means unknown.
    pub fn is_usable(&self, threshold: f32) -> bool {
        let confident = self
            .visibility
            .map_or(false, |v| v.is_finite() && v >= threshold);
        confident && self.x.is_finite() && self.y.is_finite()
    }

    /// 2D image position
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// 2D point in normalized image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2) -> f32 {
        self.vector_to(other).length()
    }

    /// Vector pointing from this point to `other`
    pub fn vector_to(&self, other: &Point2) -> Vector2 {
        Vector2::new(other.x - self.x, other.y - self.y)
    }

    pub fn midpoint(&self, other: &Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn offset(&self, v: Vector2) -> Point2 {
        Point2::new(self.x + v.dx, self.y + v.dy)
    }
}

/// 2D displacement in normalized image space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub dx: f32,
    pub dy: f32,
}

impl Vector2 {
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    pub fn length(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Unit vector in the same direction, `None` for a zero-length vector
    pub fn normalized(&self) -> Option<Vector2> {
        let len = self.length();
        if len <= f32::EPSILON || !len.is_finite() {
            return None;
        }
        Some(Vector2::new(self.dx / len, self.dy / len))
    }

    pub fn scaled(&self, factor: f32) -> Vector2 {
        Vector2::new(self.dx * factor, self.dy * factor)
    }
}

/// MediaPipe pose landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyPart {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyPart {
    pub const COUNT: usize = 33;

    const ALL: [BodyPart; BodyPart::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Position of this body part inside a frame
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// All body parts in index order
    pub fn all() -> &'static [BodyPart] {
        &Self::ALL
    }

    /// Get body part name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

/// One pose estimation result: landmarks in `BodyPart` index order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FrameRepr")]
pub struct Frame {
    pub landmarks: Vec<Landmark>,
}

// Recorded streams come both wrapped in an object and as bare arrays.
#[derive(Deserialize)]
#[serde(untagged)]
enum FrameRepr {
    Wrapped { landmarks: Vec<Landmark> },
    Bare(Vec<Landmark>),
}

impl From<FrameRepr> for Frame {
    fn from(repr: FrameRepr) -> Self {
        match repr {
            FrameRepr::Wrapped { landmarks } | FrameRepr::Bare(landmarks) => Self { landmarks },
        }
    }
}

impl Frame {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// Get a landmark, `None` when the frame is too short to contain it
    pub fn get(&self, part: BodyPart) -> Option<&Landmark> {
        self.landmarks.get(part.index())
    }

    /// Position of a landmark that passes the visibility threshold
    pub fn usable(&self, part: BodyPart, threshold: f32) -> Option<Point2> {
        self.get(part)
            .filter(|lm| lm.is_usable(threshold))
            .map(Landmark::point)
    }

    /// Landmark itself when it passes the visibility threshold
    pub fn usable_landmark(&self, part: BodyPart, threshold: f32) -> Option<&Landmark> {
        self.get(part).filter(|lm| lm.is_usable(threshold))
    }

    /// Check if all required body parts are usable
    pub fn all_usable(&self, parts: &[BodyPart], threshold: f32) -> bool {
        parts.iter().all(|part| self.usable(*part, threshold).is_some())
    }

    /// Midpoint of two usable landmarks
    pub fn usable_midpoint(&self, a: BodyPart, b: BodyPart, threshold: f32) -> Option<Point2> {
        Some(self.usable(a, threshold)?.midpoint(&self.usable(b, threshold)?))
    }
}
