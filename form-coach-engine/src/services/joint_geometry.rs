/// Joint geometry helpers
///
/// Angle math shared by the analyzers and the correction calculator:
/// - Three-point joint angles
/// - Signed trunk lean and shoulder/hip line rotation
/// - Rotating a joint around its vertex to reach a target angle
///
/// Every helper returns `None` instead of NaN when the input is degenerate
/// (coincident points, non-finite coordinates).

use crate::models::landmark::{BodyPart, Frame, Landmark, Point2, Vector2};

const MIN_SEGMENT_LENGTH: f32 = 1e-6;

/// Three landmarks defining an angle at `vertex`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriple {
    pub name: &'static str,
    pub a: BodyPart,
    pub vertex: BodyPart,
    pub c: BodyPart,
}

impl JointTriple {
    const fn new(name: &'static str, a: BodyPart, vertex: BodyPart, c: BodyPart) -> Self {
        Self { name, a, vertex, c }
    }

    /// Angle at the vertex in degrees, `None` if any landmark is unusable
    pub fn angle_in(&self, frame: &Frame, threshold: f32) -> Option<f32> {
        let a = frame.usable(self.a, threshold)?;
        let b = frame.usable(self.vertex, threshold)?;
        let c = frame.usable(self.c, threshold)?;
        joint_angle(&a, &b, &c)
    }
}

pub const LEFT_SHOULDER: JointTriple = JointTriple::new(
    "left_shoulder",
    BodyPart::LeftHip,
    BodyPart::LeftShoulder,
    BodyPart::LeftElbow,
);
pub const RIGHT_SHOULDER: JointTriple = JointTriple::new(
    "right_shoulder",
    BodyPart::RightHip,
    BodyPart::RightShoulder,
    BodyPart::RightElbow,
);
pub const LEFT_ELBOW: JointTriple = JointTriple::new(
    "left_elbow",
    BodyPart::LeftShoulder,
    BodyPart::LeftElbow,
    BodyPart::LeftWrist,
);
pub const RIGHT_ELBOW: JointTriple = JointTriple::new(
    "right_elbow",
    BodyPart::RightShoulder,
    BodyPart::RightElbow,
    BodyPart::RightWrist,
);
pub const LEFT_HIP: JointTriple = JointTriple::new(
    "left_hip",
    BodyPart::LeftShoulder,
    BodyPart::LeftHip,
    BodyPart::LeftKnee,
);
pub const RIGHT_HIP: JointTriple = JointTriple::new(
    "right_hip",
    BodyPart::RightShoulder,
    BodyPart::RightHip,
    BodyPart::RightKnee,
);
pub const LEFT_KNEE: JointTriple = JointTriple::new(
    "left_knee",
    BodyPart::LeftHip,
    BodyPart::LeftKnee,
    BodyPart::LeftAnkle,
);
pub const RIGHT_KNEE: JointTriple = JointTriple::new(
    "right_knee",
    BodyPart::RightHip,
    BodyPart::RightKnee,
    BodyPart::RightAnkle,
);

/// Angle at `b` between `b -> a` and `b -> c`, in degrees (0-180).
///
/// Uses `atan2(|cross|, dot)` so angles near 0° and 180° stay accurate.
pub fn joint_angle(a: &Point2, b: &Point2, c: &Point2) -> Option<f32> {
    let ba = b.vector_to(a);
    let bc = b.vector_to(c);

    if !is_segment(&ba) || !is_segment(&bc) {
        return None;
    }

    let cross = ba.dx * bc.dy - ba.dy * bc.dx;
    let dot = ba.dx * bc.dx + ba.dy * bc.dy;
    let angle = cross.abs().atan2(dot).to_degrees();

    angle.is_finite().then_some(angle)
}

/// Signed angle from `from` to `to` in degrees, wrapped to (-180, 180]
pub fn signed_angle(from: &Vector2, to: &Vector2) -> Option<f32> {
    if !is_segment(from) || !is_segment(to) {
        return None;
    }
    let angle = (to.dy.atan2(to.dx) - from.dy.atan2(from.dx)).to_degrees();
    angle.is_finite().then(|| wrap_degrees(angle))
}

/// Lean of the `base -> top` segment away from vertical, in degrees.
///
/// Positive when `top` sits to the image right of `base`.
pub fn lean_from_vertical(base: &Point2, top: &Point2) -> Option<f32> {
    // Image y grows downwards, so "up" is -y.
    let up = Vector2::new(0.0, -1.0);
    let segment = base.vector_to(top);
    signed_angle(&segment, &up).map(|a| -a)
}

/// Rotation of the line between two paired landmarks out of the image plane.
///
/// 0° when both sit at the same depth. Positive when the left landmark is
/// further from the camera than the right one. The in-plane length includes
/// the vertical offset, so tilting the line in the image does not change
/// the reading.
pub fn depth_rotation(left: &Landmark, right: &Landmark) -> Option<f32> {
    let in_plane = (left.x - right.x).hypot(left.y - right.y);
    let dz = left.z - right.z;
    if !in_plane.is_finite()
        || !dz.is_finite()
        || (in_plane < MIN_SEGMENT_LENGTH && dz.abs() < MIN_SEGMENT_LENGTH)
    {
        return None;
    }
    Some(dz.atan2(in_plane).to_degrees())
}

/// Rotate `point` around `pivot` by `degrees`
pub fn rotate_about(point: &Point2, pivot: &Point2, degrees: f32) -> Point2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let v = pivot.vector_to(point);
    pivot.offset(Vector2::new(v.dx * cos - v.dy * sin, v.dx * sin + v.dy * cos))
}

/// Wrap an angle in degrees into (-180, 180]
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut wrapped = angle % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

fn is_segment(v: &Vector2) -> bool {
    let len = v.length();
    len.is_finite() && len > MIN_SEGMENT_LENGTH
}
