use crate::exercise::Axis::{Horizontal, Vertical};
use crate::exercise::Relation::Above;
use crate::exercise::Severity::{Error, Warning};
use crate::exercise::{Category, ExerciseRule, FormCheck};

pub(super) fn rules() -> Vec<ExerciseRule> {
    vec![
        knee_bends(),
        sit_to_stand(),
        sideways_walk(),
        backwards_walk(),
        walk_and_turn(),
        one_leg_stand(),
        heel_toe_stand(),
        heel_toe_walk(),
        heel_walking(),
        toe_walking(),
        heel_toe_walk_backwards(),
    ]
}

fn knee_bends() -> ExerciseRule {
    ExerciseRule::new(
        "balance-1",
        "Knee Bends",
        Category::Balance,
        vec![
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 90.0, 140.0, "Bend your knees more", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 90.0, 140.0, "Bend your knees more", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 20.0, "Keep your back straight", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 10.0, "Keep your hips level", Warning),
        ],
    )
}

fn sit_to_stand() -> ExerciseRule {
    ExerciseRule::new(
        "balance-2",
        "Sit to Stand",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 25.0, "Keep your back straight as you stand", Warning),
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 160.0, 180.0, "Stand up fully", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep your shoulders level", Warning),
        ],
    )
}

fn sideways_walk() -> ExerciseRule {
    ExerciseRule::new(
        "balance-3",
        "Sideways Walk",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 15.0, "Keep your hips level", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep your shoulders level", Warning),
        ],
    )
}

fn backwards_walk() -> ExerciseRule {
    ExerciseRule::new(
        "balance-4",
        "Backwards Walk",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 20.0, "Maintain upright posture", Warning),
            FormCheck::position("nose", "left_hip", Above, "Keep your head up", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep your shoulders level", Warning),
        ],
    )
}

fn walk_and_turn() -> ExerciseRule {
    ExerciseRule::new(
        "balance-5",
        "Walk and Turn",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 20.0, "Stay upright during turns", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 20.0, "Keep your hips stable during turns", Warning),
        ],
    )
}

/// 腰の落ち込みは組み込みで唯一のエラー扱い
fn one_leg_stand() -> ExerciseRule {
    ExerciseRule::new(
        "balance-6",
        "One Leg Stand",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 15.0, "Keep your hips level", Error),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep your shoulders level", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 165.0, 180.0, "Keep your standing leg straight", Warning),
        ],
    )
}

fn heel_toe_stand() -> ExerciseRule {
    ExerciseRule::new(
        "balance-7",
        "Heel Toe Stand",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 10.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 10.0, "Keep your shoulders level", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 10.0, "Keep your hips level", Warning),
        ],
    )
}

fn heel_toe_walk() -> ExerciseRule {
    ExerciseRule::new(
        "balance-8",
        "Heel Toe Walk",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep your shoulders level", Warning),
            FormCheck::position("nose", "left_hip", Above, "Look forward, not down", Warning),
        ],
    )
}

fn heel_walking() -> ExerciseRule {
    ExerciseRule::new(
        "balance-9",
        "Heel Walking",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 15.0, "Keep your hips level", Warning),
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 160.0, 180.0, "Keep your legs relatively straight", Warning),
        ],
    )
}

fn toe_walking() -> ExerciseRule {
    ExerciseRule::new(
        "balance-10",
        "Toe Walking",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 15.0, "Keep your hips level", Warning),
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 165.0, 180.0, "Keep your legs straight", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 165.0, 180.0, "Keep your legs straight", Warning),
        ],
    )
}

fn heel_toe_walk_backwards() -> ExerciseRule {
    ExerciseRule::new(
        "balance-11",
        "Heel Toe Walk Backwards",
        Category::Balance,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 15.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep your shoulders level", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 15.0, "Keep your hips level", Warning),
            FormCheck::position("nose", "left_hip", Above, "Keep your head up", Warning),
        ],
    )
}
