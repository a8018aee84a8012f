use crate::exercise::Axis::{Horizontal, Vertical};
use crate::exercise::Relation::Above;
use crate::exercise::Severity::Warning;
use crate::exercise::{Category, ExerciseRule, FormCheck};

pub(super) fn rules() -> Vec<ExerciseRule> {
    vec![chair_rise(), balance_test(), timed_up_and_go()]
}

fn chair_rise() -> ExerciseRule {
    ExerciseRule::new(
        "assessment-1",
        "Chair Rise",
        Category::Assessment,
        vec![
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 160.0, 180.0, "Stand up fully - straighten your legs", Warning),
            FormCheck::angle(["right_hip", "right_knee", "right_ankle"], 160.0, 180.0, "Stand up fully - straighten your legs", Warning),
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 20.0, "Keep your back straight as you stand", Warning),
            FormCheck::position("nose", "left_hip", Above, "Keep your head up", Warning),
        ],
    )
}

/// 4段階バランステスト（直立、肩と腰が水平）
fn balance_test() -> ExerciseRule {
    ExerciseRule::new(
        "assessment-2",
        "4-Stage Balance Test",
        Category::Assessment,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 10.0, "Keep your body upright", Warning),
            FormCheck::alignment(["right_shoulder", "right_hip"], Vertical, 10.0, "Keep your body upright", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 10.0, "Keep your shoulders level", Warning),
            FormCheck::alignment(["left_hip", "right_hip"], Horizontal, 10.0, "Keep your hips level", Warning),
        ],
    )
}

fn timed_up_and_go() -> ExerciseRule {
    ExerciseRule::new(
        "assessment-3",
        "Timed Up and Go",
        Category::Assessment,
        vec![
            FormCheck::alignment(["left_shoulder", "left_hip"], Vertical, 25.0, "Maintain upright posture while walking", Warning),
            FormCheck::position("nose", "left_hip", Above, "Keep your head up while walking", Warning),
            FormCheck::alignment(["left_shoulder", "right_shoulder"], Horizontal, 15.0, "Keep shoulders level during turns", Warning),
        ],
    )
}
