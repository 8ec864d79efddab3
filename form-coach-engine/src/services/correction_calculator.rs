/// Joint corrections towards a target stage
///
/// Stateless. For every joint that drives the exercise the current angle is
/// compared with the angle that defines the target stage; when the gap is
/// larger than `correction.significance_degrees` the moving landmark is
/// rotated around the joint vertex to the target angle and the resulting
/// displacement is reported.

use crate::config::EngineConfig;
use crate::models::analysis::JointCorrection;
use crate::models::exercise::{ExerciseStage, ExerciseType};
use crate::models::landmark::{BodyPart, Frame, Point2, Vector2};
use crate::services::analyzers::torso_twist::twist_angles;
use crate::services::analyzers::trunk_lean;
use crate::services::joint_geometry::{
    rotate_about, signed_angle, JointTriple, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, RIGHT_HIP,
    RIGHT_KNEE, RIGHT_SHOULDER,
};

/// Which end of a joint triple moves to change the angle
#[derive(Debug, Clone, Copy)]
enum Mover {
    /// The distal landmark `c` (elbow, knee)
    Distal,
    /// The proximal landmark `a` (hip when the shin is planted)
    Proximal,
}

pub fn calculate_corrections(
    frame: &Frame,
    exercise: ExerciseType,
    target_stage: ExerciseStage,
    config: &EngineConfig,
) -> Vec<JointCorrection> {
    let descriptor = exercise.descriptor();
    let threshold = config.visibility_threshold;

    if target_stage == ExerciseStage::Idle || !descriptor.has_stage(target_stage) {
        return Vec::new();
    }
    if !frame.all_usable(descriptor.required_joints, threshold) {
        return Vec::new();
    }

    let significance = config.correction.significance_degrees;
    let thresholds = &config.thresholds;

    let corrections: Vec<JointCorrection> = match exercise {
        ExerciseType::ArmRaise => {
            let t = &thresholds.arm_raise;
            let target = if target_stage == ExerciseStage::Up {
                t.target_up
            } else {
                t.target_down
            };
            [
                (LEFT_SHOULDER, BodyPart::LeftWrist),
                (RIGHT_SHOULDER, BodyPart::RightWrist),
            ]
            .iter()
            .filter_map(|(joint, report)| {
                rotate_joint(frame, joint, Mover::Distal, *report, target, significance, threshold)
            })
            .collect()
        }
        ExerciseType::KneeRaise => {
            let t = &thresholds.knee_raise;
            if target_stage == ExerciseStage::Up {
                // Only the working leg, the one already lifted further
                let left = LEFT_HIP.angle_in(frame, threshold);
                let right = RIGHT_HIP.angle_in(frame, threshold);
                let joint = match (left, right) {
                    (Some(l), Some(r)) if r < l => RIGHT_HIP,
                    _ => LEFT_HIP,
                };
                rotate_joint(
                    frame,
                    &joint,
                    Mover::Distal,
                    joint.c,
                    t.target_up,
                    significance,
                    threshold,
                )
                .into_iter()
                .collect()
            } else {
                [LEFT_HIP, RIGHT_HIP]
                    .iter()
                    .filter_map(|joint| {
                        rotate_joint(
                            frame,
                            joint,
                            Mover::Distal,
                            joint.c,
                            t.target_down,
                            significance,
                            threshold,
                        )
                    })
                    .collect()
            }
        }
        ExerciseType::Squat => {
            let t = &thresholds.squat;
            let target = if target_stage == ExerciseStage::Down {
                t.target_down
            } else {
                t.target_up
            };
            [LEFT_KNEE, RIGHT_KNEE]
                .iter()
                .filter_map(|joint| {
                    rotate_joint(
                        frame,
                        joint,
                        Mover::Proximal,
                        joint.a,
                        target,
                        significance,
                        threshold,
                    )
                })
                .collect()
        }
        ExerciseType::TorsoTwist => {
            let target = lateral_target(target_stage, thresholds.torso_twist.target_side);
            twist_corrections(frame, target, significance, threshold)
        }
        ExerciseType::SideBend => {
            let target = lateral_target(target_stage, thresholds.side_bend.target_side);
            bend_corrections(frame, target, significance, threshold)
        }
    };

    if !corrections.is_empty() {
        tracing::debug!(
            exercise = %exercise,
            target = %target_stage,
            count = corrections.len(),
            "Computed joint corrections"
        );
    }
    corrections
}

fn lateral_target(stage: ExerciseStage, side: f32) -> f32 {
    match stage {
        ExerciseStage::Left => side,
        ExerciseStage::Right => -side,
        _ => 0.0,
    }
}

/// Rotate the moving end of `joint` so the vertex angle becomes `target`
fn rotate_joint(
    frame: &Frame,
    joint: &JointTriple,
    mover: Mover,
    report: BodyPart,
    target: f32,
    significance: f32,
    threshold: f32,
) -> Option<JointCorrection> {
    let a = frame.usable(joint.a, threshold)?;
    let vertex = frame.usable(joint.vertex, threshold)?;
    let c = frame.usable(joint.c, threshold)?;
    let reported = frame.usable(report, threshold)?;

    let signed = signed_angle(&vertex.vector_to(&a), &vertex.vector_to(&c))?;
    let current = signed.abs();
    let angle_error = target - current;
    if angle_error.abs() <= significance {
        return None;
    }

    // Keep the side the limb is already on; a zero angle opens outwards
    let sign = if signed < 0.0 { -1.0 } else { 1.0 };
    let delta = sign * target - signed;
    let rotation = match mover {
        Mover::Distal => delta,
        Mover::Proximal => -delta,
    };

    let moved = rotate_about(&reported, &vertex, rotation);
    correction(report.name(), reported, moved, angle_error)
}

fn twist_corrections(
    frame: &Frame,
    target: f32,
    significance: f32,
    threshold: f32,
) -> Vec<JointCorrection> {
    let Some((twist, _)) = twist_angles(frame, threshold) else {
        return Vec::new();
    };
    let angle_error = target - twist;
    if angle_error.abs() <= significance {
        return Vec::new();
    }
    let (Some(left), Some(right)) = (
        frame.usable(BodyPart::LeftShoulder, threshold),
        frame.usable(BodyPart::RightShoulder, threshold),
    ) else {
        return Vec::new();
    };

    // The image cannot show depth, so the cue is the arc each shoulder
    // travels: the one turning away moves towards the midline, the other
    // away from it.
    let radius = left.distance_to(&right) / 2.0;
    let arc = radius * angle_error.abs().to_radians();
    let mid = left.midpoint(&right);
    let (back, forward) = if angle_error > 0.0 {
        ((BodyPart::LeftShoulder, left), (BodyPart::RightShoulder, right))
    } else {
        ((BodyPart::RightShoulder, right), (BodyPart::LeftShoulder, left))
    };

    let mut corrections = Vec::with_capacity(2);
    for ((part, point), towards_mid) in [(back, true), (forward, false)] {
        let inward = point.vector_to(&mid);
        let direction = if towards_mid {
            inward
        } else {
            inward.scaled(-1.0)
        };
        let moved = match direction.normalized() {
            Some(unit) => point.offset(Vector2::new(unit.dx * arc, 0.0)),
            None => continue,
        };
        corrections.extend(correction(part.name(), point, moved, angle_error));
    }
    corrections
}

fn bend_corrections(
    frame: &Frame,
    target: f32,
    significance: f32,
    threshold: f32,
) -> Vec<JointCorrection> {
    let Some(lean) = trunk_lean(frame, threshold) else {
        return Vec::new();
    };
    let angle_error = target - lean;
    if angle_error.abs() <= significance {
        return Vec::new();
    }
    let Some(hips) = frame.usable_midpoint(BodyPart::LeftHip, BodyPart::RightHip, threshold) else {
        return Vec::new();
    };

    [BodyPart::LeftShoulder, BodyPart::RightShoulder]
        .iter()
        .filter_map(|part| {
            let point = frame.usable(*part, threshold)?;
            let moved = rotate_about(&point, &hips, angle_error);
            correction(part.name(), point, moved, angle_error)
        })
        .collect()
}

fn correction(
    joint_name: &str,
    from: Point2,
    to: Point2,
    angle_error: f32,
) -> Option<JointCorrection> {
    let displacement = from.vector_to(&to);
    let direction = displacement.normalized()?;
    Some(JointCorrection {
        joint_name: joint_name.to_string(),
        direction,
        magnitude: displacement.length(),
        angle_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::PoseBuilder;
    use pretty_assertions::assert_eq;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_arm_raise_points_wrists_up() {
        let frame = PoseBuilder::standing().arms(20.0, 20.0).build();
        let corrections =
            calculate_corrections(&frame, ExerciseType::ArmRaise, ExerciseStage::Up, &config());

        assert_eq!(corrections.len(), 2);
        for c in &corrections {
            assert!((c.angle_error - 150.0).abs() < 0.5);
            assert!(c.direction.dy < 0.0, "{} should move up", c.joint_name);
            assert!(c.magnitude > 0.0);
        }
        assert!(corrections.iter().any(|c| c.joint_name == "left_wrist"));
        assert!(corrections.iter().any(|c| c.joint_name == "right_wrist"));
    }

    #[test]
    fn test_close_enough_is_silent() {
        let frame = PoseBuilder::standing().arms(160.0, 165.0).build();
        let corrections =
            calculate_corrections(&frame, ExerciseType::ArmRaise, ExerciseStage::Up, &config());
        assert!(corrections.is_empty());
    }

    #[test]
    fn test_idle_or_foreign_stage_is_empty() {
        let frame = PoseBuilder::standing().build();
        assert!(
            calculate_corrections(&frame, ExerciseType::ArmRaise, ExerciseStage::Idle, &config())
                .is_empty()
        );
        assert!(
            calculate_corrections(&frame, ExerciseType::Squat, ExerciseStage::Left, &config())
                .is_empty()
        );
    }

    #[test]
    fn test_invisible_frame_is_empty() {
        let frame = PoseBuilder::standing().visibility(0.2).build();
        assert!(
            calculate_corrections(&frame, ExerciseType::ArmRaise, ExerciseStage::Up, &config())
                .is_empty()
        );
    }

    #[test]
    fn test_squat_moves_hips_down() {
        let frame = PoseBuilder::standing().squat(170.0).build();
        let corrections =
            calculate_corrections(&frame, ExerciseType::Squat, ExerciseStage::Down, &config());
        assert_eq!(corrections.len(), 2);
        for c in &corrections {
            assert!(c.joint_name.ends_with("_hip"));
            assert!(c.angle_error < -15.0);
            assert!(c.direction.dy > 0.0);
        }
    }

    #[test]
    fn test_knee_raise_corrects_working_leg() {
        let frame = PoseBuilder::standing().knee_lift(178.0, 130.0).build();
        let corrections =
            calculate_corrections(&frame, ExerciseType::KneeRaise, ExerciseStage::Up, &config());
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].joint_name, "right_knee");
        assert!(corrections[0].direction.dy < 0.0);
    }

    #[test]
    fn test_side_bend_rotates_shoulders() {
        let frame = PoseBuilder::standing().build();
        let corrections =
            calculate_corrections(&frame, ExerciseType::SideBend, ExerciseStage::Left, &config());
        assert_eq!(corrections.len(), 2);
        for c in &corrections {
            assert!((c.angle_error - 25.0).abs() < 0.5);
            // Bending to the performer's left moves the shoulders image-right
            assert!(c.direction.dx > 0.0);
        }
    }

    #[test]
    fn test_torso_twist_cues_both_shoulders() {
        let frame = PoseBuilder::standing().build();
        let corrections =
            calculate_corrections(&frame, ExerciseType::TorsoTwist, ExerciseStage::Right, &config());
        assert_eq!(corrections.len(), 2);
        assert!(corrections.iter().all(|c| (c.angle_error + 45.0).abs() < 0.5));

        let right = corrections
            .iter()
            .find(|c| c.joint_name == "right_shoulder")
            .unwrap();
        // Right shoulder turns away, towards the midline (image right)
        assert!(right.direction.dx > 0.0);
    }
}
