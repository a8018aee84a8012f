use crate::exercise::Axis::{Horizontal, Vertical};
use crate::exercise::Severity::Warning;
use crate::exercise::{Category, ExerciseRule, FormCheck};

pub(super) fn rules() -> Vec<ExerciseRule> {
    vec![
        head_movements(),
        neck_movements(),
        back_movements(),
        trunk_movements(),
        ankle_movements(),
    ]
}

fn head_movements() -> ExerciseRule {
    ExerciseRule::new(
        "warmup-1",
        "Head Movements",
        Category::Warmup,
        vec![
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 10.0, "Keep your shoulders still while moving your head", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your back straight", Warning),
        ],
    )
}

fn neck_movements() -> ExerciseRule {
    ExerciseRule::new(
        "warmup-2",
        "Neck Movements",
        Category::Warmup,
        vec![
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 10.0, "Keep your shoulders level and still", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 10.0, "Keep your hips still", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Maintain good posture", Warning),
        ],
    )
}

fn back_movements() -> ExerciseRule {
    ExerciseRule::new(
        "warmup-3",
        "Back Movements",
        Category::Warmup,
        vec![
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 15.0, "Keep your hips stable", Warning),
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 160.0, 180.0, "Keep your legs straight", Warning),
        ],
    )
}

fn trunk_movements() -> ExerciseRule {
    ExerciseRule::new(
        "warmup-4",
        "Trunk Movements",
        Category::Warmup,
        vec![
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 20.0, "Control the rotation from your core", Warning),
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 160.0, 180.0, "Keep your legs stable", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 160.0, 180.0, "Keep your legs stable", Warning),
        ],
    )
}

fn ankle_movements() -> ExerciseRule {
    ExerciseRule::new(
        "warmup-5",
        "Ankle Movements",
        Category::Warmup,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your upper body stable", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 10.0, "Keep your hips level for balance", Warning),
        ],
    )
}
