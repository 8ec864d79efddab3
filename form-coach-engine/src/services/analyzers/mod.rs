pub mod arm_raise;
pub mod knee_raise;
pub mod side_bend;
pub mod squat;
pub mod torso_twist;

pub use arm_raise::ArmRaiseAnalyzer;
pub use knee_raise::KneeRaiseAnalyzer;
pub use side_bend::SideBendAnalyzer;
pub use squat::SquatAnalyzer;
pub use torso_twist::TorsoTwistAnalyzer;

use crate::models::landmark::{BodyPart, Frame};
use crate::services::joint_geometry::{depth_rotation, lean_from_vertical};

/// Lean of the shoulder midpoint relative to the hip midpoint, degrees
pub(crate) fn trunk_lean(frame: &Frame, threshold: f32) -> Option<f32> {
    let hips = frame.usable_midpoint(BodyPart::LeftHip, BodyPart::RightHip, threshold)?;
    let shoulders =
        frame.usable_midpoint(BodyPart::LeftShoulder, BodyPart::RightShoulder, threshold)?;
    lean_from_vertical(&hips, &shoulders)
}

/// Depth rotation of a left/right landmark pair, degrees
pub(crate) fn pair_rotation(
    frame: &Frame,
    left: BodyPart,
    right: BodyPart,
    threshold: f32,
) -> Option<f32> {
    depth_rotation(
        frame.usable_landmark(left, threshold)?,
        frame.usable_landmark(right, threshold)?,
    )
}

pub(crate) fn angle_map(entries: &[(&str, f32)]) -> std::collections::BTreeMap<String, f32> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}
