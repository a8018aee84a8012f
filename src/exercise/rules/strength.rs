use crate::exercise::Axis::{Horizontal, Vertical};
use crate::exercise::Severity::Warning;
use crate::exercise::{Category, ExerciseRule, FormCheck};

pub(super) fn rules() -> Vec<ExerciseRule> {
    vec![
        knee_extensor(),
        knee_flexor(),
        hip_abductor(),
        calf_raises(),
        toe_raises(),
    ]
}

fn knee_extensor() -> ExerciseRule {
    ExerciseRule::new(
        "strength-1",
        "Knee Extensor",
        Category::Strength,
        vec![
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 150.0, 180.0, "Extend your leg fully", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your back straight", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 10.0, "Keep your hips stable", Warning),
        ],
    )
}

fn knee_flexor() -> ExerciseRule {
    ExerciseRule::new(
        "strength-2",
        "Knee Flexor",
        Category::Strength,
        vec![
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 80.0, 120.0, "Bend your knee more", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your upper body upright", Warning),
            FormCheck::alignment(["right_hip", "right_knee"], Vertical, 10.0, "Keep your standing leg straight", Warning),
        ],
    )
}

fn hip_abductor() -> ExerciseRule {
    ExerciseRule::new(
        "strength-3",
        "Hip Abductor",
        Category::Strength,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your torso upright", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 165.0, 180.0, "Keep your standing leg straight", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep your shoulders level", Warning),
        ],
    )
}

fn calf_raises() -> ExerciseRule {
    ExerciseRule::new(
        "strength-4",
        "Calf Raises",
        Category::Strength,
        vec![
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 165.0, 180.0, "Keep your knees straight", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 165.0, 180.0, "Keep your knees straight", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 10.0, "Keep your body straight", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 10.0, "Keep your hips level", Warning),
        ],
    )
}

fn toe_raises() -> ExerciseRule {
    ExerciseRule::new(
        "strength-5",
        "Toe Raises",
        Category::Strength,
        vec![
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 165.0, 180.0, "Keep your legs straight", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 165.0, 180.0, "Keep your legs straight", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 10.0, "Maintain upright posture", Warning),
        ],
    )
}
