/// Synthetic frontal poses
///
/// Builds full 33-landmark frames from a handful of joint angles. Used for
/// replay fixtures and tests, where real estimator output is not available.
///
/// The performer faces the camera, so their left side lands on the image
/// right. All lengths are in normalized image units.

use crate::models::landmark::{BodyPart, Frame, Landmark, Point2, Vector2};
use crate::services::joint_geometry::rotate_about;

const CENTER_X: f32 = 0.5;
const HALF_WIDTH: f32 = 0.1;
const FLOOR_Y: f32 = 0.95;
const TORSO: f32 = 0.25;
const UPPER_ARM: f32 = 0.12;
const FOREARM: f32 = 0.12;
const THIGH: f32 = 0.2;
const SHIN: f32 = 0.2;
const HEAD: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct PoseBuilder {
    arm_left: f32,
    arm_right: f32,
    elbow_bend: f32,
    thigh_left: f32,
    thigh_right: f32,
    grounded: bool,
    twist: f32,
    hip_twist: f32,
    side_bend: f32,
    visibility: f32,
    hidden: Vec<BodyPart>,
}

impl Default for PoseBuilder {
    fn default() -> Self {
        Self::standing()
    }
}

impl PoseBuilder {
    /// Upright, arms hanging, facing the camera
    pub fn standing() -> Self {
        Self {
            arm_left: 0.0,
            arm_right: 0.0,
            elbow_bend: 0.0,
            thigh_left: 0.0,
            thigh_right: 0.0,
            grounded: true,
            twist: 0.0,
            hip_twist: 0.0,
            side_bend: 0.0,
            visibility: 0.95,
            hidden: Vec::new(),
        }
    }

    /// Shoulder angles (hip-shoulder-elbow) in degrees, 0 = hanging
    pub fn arms(mut self, left: f32, right: f32) -> Self {
        self.arm_left = left;
        self.arm_right = right;
        self
    }

    /// Elbow flexion in degrees; the elbow angle becomes `180 - bend`
    pub fn elbow_bend(mut self, bend: f32) -> Self {
        self.elbow_bend = bend;
        self
    }

    /// Hip angles (shoulder-hip-knee) in degrees with the hips kept level
    pub fn knee_lift(mut self, left_hip: f32, right_hip: f32) -> Self {
        self.thigh_left = 180.0 - left_hip;
        self.thigh_right = 180.0 - right_hip;
        self.grounded = false;
        self
    }

    /// Knee angles (hip-knee-ankle) in degrees with the feet on the floor
    pub fn squat(self, knee: f32) -> Self {
        self.squat_uneven(knee, knee)
    }

    pub fn squat_uneven(mut self, left_knee: f32, right_knee: f32) -> Self {
        self.thigh_left = 180.0 - left_knee;
        self.thigh_right = 180.0 - right_knee;
        self.grounded = true;
        self
    }

    /// Shoulder line rotation in degrees, positive turns towards the
    /// performer's left
    pub fn twist(mut self, degrees: f32) -> Self {
        self.twist = degrees;
        self
    }

    pub fn hip_twist(mut self, degrees: f32) -> Self {
        self.hip_twist = degrees;
        self
    }

    /// Trunk lean in degrees, positive towards the performer's left
    pub fn side_bend(mut self, degrees: f32) -> Self {
        self.side_bend = degrees;
        self
    }

    pub fn visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility;
        self
    }

    /// Report a landmark with near-zero confidence
    pub fn hide(mut self, part: BodyPart) -> Self {
        self.hidden.push(part);
        self
    }

    pub fn build(&self) -> Frame {
        let mut points = [Point2::default(); BodyPart::COUNT];
        let mut depth = [0.0f32; BodyPart::COUNT];

        let mean_thigh = ((self.thigh_left + self.thigh_right) / 2.0).to_radians();
        let hip_y = if self.grounded {
            FLOOR_Y - SHIN - THIGH * mean_thigh.cos()
        } else {
            FLOOR_Y - SHIN - THIGH
        };

        // Hips and legs
        let (hip_half, hip_depth) = rotated_half_width(self.hip_twist);
        for (side, thigh) in [(1.0f32, self.thigh_left), (-1.0, self.thigh_right)] {
            let (hip, knee, ankle) = leg_parts(side);
            let hip_point = Point2::new(CENTER_X + side * hip_half, hip_y);
            let (sin, cos) = thigh.to_radians().sin_cos();
            let knee_point = hip_point.offset(Vector2::new(side * THIGH * sin, THIGH * cos));
            points[hip.index()] = hip_point;
            depth[hip.index()] = side * hip_depth;
            points[knee.index()] = knee_point;
            points[ankle.index()] = knee_point.offset(Vector2::new(0.0, SHIN));
        }
        let hip_mid = Point2::new(CENTER_X, hip_y);

        // Shoulders follow the twist, then the whole torso bends about the hips
        let (shoulder_half, shoulder_depth) = rotated_half_width(self.twist);
        for (side, part) in [(1.0f32, BodyPart::LeftShoulder), (-1.0, BodyPart::RightShoulder)] {
            let upright = Point2::new(CENTER_X + side * shoulder_half, hip_y - TORSO);
            points[part.index()] = rotate_about(&upright, &hip_mid, self.side_bend);
            depth[part.index()] = side * shoulder_depth;
        }
        let down = rotate_about(&Point2::new(0.0, 1.0), &Point2::default(), self.side_bend);
        let down = Vector2::new(down.x, down.y);

        for (side, angle) in [(1.0f32, self.arm_left), (-1.0, self.arm_right)] {
            let (shoulder, elbow, wrist) = arm_parts(side);
            let shoulder_point = points[shoulder.index()];
            let elbow_point = rotate_about(
                &shoulder_point.offset(down.scaled(UPPER_ARM)),
                &shoulder_point,
                -side * angle,
            );
            let arm_dir = shoulder_point.vector_to(&elbow_point).scaled(1.0 / UPPER_ARM);
            let forearm_end = elbow_point.offset(arm_dir.scaled(FOREARM));
            points[elbow.index()] = elbow_point;
            points[wrist.index()] = rotate_about(&forearm_end, &elbow_point, -side * self.elbow_bend);
        }

        // Head sits above the shoulder midpoint along the trunk
        let shoulder_mid = points[BodyPart::LeftShoulder.index()]
            .midpoint(&points[BodyPart::RightShoulder.index()]);
        let nose = shoulder_mid.offset(down.scaled(-HEAD));
        for part in &BodyPart::all()[..=BodyPart::MouthRight.index()] {
            points[part.index()] = nose;
        }

        // Hands and feet collapse onto wrists and ankles
        for (part, anchor) in [
            (BodyPart::LeftPinky, BodyPart::LeftWrist),
            (BodyPart::LeftIndex, BodyPart::LeftWrist),
            (BodyPart::LeftThumb, BodyPart::LeftWrist),
            (BodyPart::RightPinky, BodyPart::RightWrist),
            (BodyPart::RightIndex, BodyPart::RightWrist),
            (BodyPart::RightThumb, BodyPart::RightWrist),
            (BodyPart::LeftHeel, BodyPart::LeftAnkle),
            (BodyPart::LeftFootIndex, BodyPart::LeftAnkle),
            (BodyPart::RightHeel, BodyPart::RightAnkle),
            (BodyPart::RightFootIndex, BodyPart::RightAnkle),
        ] {
            points[part.index()] = points[anchor.index()];
        }

        let landmarks = BodyPart::all()
            .iter()
            .map(|part| {
                let p = points[part.index()];
                let visibility = if self.hidden.contains(part) {
                    0.05
                } else {
                    self.visibility
                };
                Landmark::new(p.x, p.y, depth[part.index()], visibility)
            })
            .collect();

        Frame::new(landmarks)
    }
}

/// Image half-width and depth offset of a paired line rotated by `degrees`
fn rotated_half_width(degrees: f32) -> (f32, f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (HALF_WIDTH * cos, HALF_WIDTH * sin)
}

fn leg_parts(side: f32) -> (BodyPart, BodyPart, BodyPart) {
    if side > 0.0 {
        (BodyPart::LeftHip, BodyPart::LeftKnee, BodyPart::LeftAnkle)
    } else {
        (BodyPart::RightHip, BodyPart::RightKnee, BodyPart::RightAnkle)
    }
}

fn arm_parts(side: f32) -> (BodyPart, BodyPart, BodyPart) {
    if side > 0.0 {
        (BodyPart::LeftShoulder, BodyPart::LeftElbow, BodyPart::LeftWrist)
    } else {
        (BodyPart::RightShoulder, BodyPart::RightElbow, BodyPart::RightWrist)
    }
}
