//! 姿勢を運動ルールに照らして評価する

use serde::Serialize;

use crate::exercise::{
    AlignmentCheck, AngleCheck, Axis, DistanceCheck, ExerciseRegistry, FormCheck, PositionCheck,
    Relation, Severity,
};
use crate::geometry;
use crate::pose::{Keypoint, Pose};

/// このスコア以上なら良いフォーム
pub const GOOD_FORM_SCORE: u8 = 70;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormViolation {
    pub body_part: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormFeedback {
    /// ルール順
    pub violations: Vec<FormViolation>,
    /// 0〜100
    pub score: u8,
    pub is_good_form: bool,
}

impl FormFeedback {
    pub fn from_violations(violations: Vec<FormViolation>) -> Self {
        let score = calculate_score(&violations);
        Self {
            violations,
            score,
            is_good_form: score >= GOOD_FORM_SCORE,
        }
    }

    /// 指摘なしのフィードバック
    pub fn perfect() -> Self {
        Self::from_violations(Vec::new())
    }
}

/// 100 からエラー1件20点、警告1件10点を引く（下限0）
pub fn calculate_score(violations: &[FormViolation]) -> u8 {
    let penalty: u32 = violations.iter().map(|v| v.severity.penalty()).sum();
    100u32.saturating_sub(penalty) as u8
}

/// `exercise_id` について `pose` を解析
///
/// 未知の運動はチェックなしで100点。キーポイントが解決できないチェック
/// （未知の名前、またはルールの `min_confidence` 未満）は飛ばす。
/// 呼び出し間で状態は持たない。
pub fn analyze_pose(pose: &Pose, exercise_id: &str, registry: &ExerciseRegistry) -> FormFeedback {
    let Some(rule) = registry.exercise_rules(exercise_id) else {
        return FormFeedback::perfect();
    };

    let resolver = Resolver {
        pose,
        min_confidence: rule.min_confidence,
    };
    let violations = rule
        .checks
        .iter()
        .filter_map(|check| evaluate(&resolver, check))
        .collect();

    FormFeedback::from_violations(violations)
}

/// チェック1件を評価。合格または評価不能なら `None`
pub fn evaluate_check(pose: &Pose, check: &FormCheck) -> Option<FormViolation> {
    evaluate(
        &Resolver {
            pose,
            min_confidence: None,
        },
        check,
    )
}

struct Resolver<'a> {
    pose: &'a Pose,
    min_confidence: Option<f32>,
}

impl<'a> Resolver<'a> {
    fn get(&self, name: &str) -> Option<&'a Keypoint> {
        let kp = self.pose.by_name(name)?;
        match self.min_confidence {
            Some(min) if !geometry::is_confident(kp, min) => None,
            _ => Some(kp),
        }
    }
}

fn evaluate(resolver: &Resolver<'_>, check: &FormCheck) -> Option<FormViolation> {
    match check {
        FormCheck::Angle(c) => check_angle(resolver, c),
        FormCheck::Alignment(c) => check_alignment(resolver, c),
        FormCheck::Position(c) => check_position(resolver, c),
        FormCheck::Distance(c) => check_distance(resolver, c),
    }
}

fn violation(body_part: &str, message: &str, severity: Severity) -> FormViolation {
    FormViolation {
        body_part: body_part.to_string(),
        message: message.to_string(),
        severity,
    }
}

fn check_angle(resolver: &Resolver<'_>, check: &AngleCheck) -> Option<FormViolation> {
    let [a, vertex, c] = &check.keypoints;
    let angle = geometry::angle_at_vertex(resolver.get(a)?, resolver.get(vertex)?, resolver.get(c)?);

    if angle >= check.min && angle <= check.max {
        return None;
    }
    Some(violation(vertex, &check.message, check.severity))
}

fn check_alignment(resolver: &Resolver<'_>, check: &AlignmentCheck) -> Option<FormViolation> {
    let [p, q] = &check.keypoints;
    let (kp_p, kp_q) = (resolver.get(p)?, resolver.get(q)?);

    let deviation = match check.axis {
        Axis::Vertical => geometry::deviation_from_vertical(kp_p, kp_q),
        Axis::Horizontal => geometry::deviation_from_horizontal(kp_p, kp_q),
    };

    // 許容値ちょうどでも違反
    if deviation < check.tolerance {
        return None;
    }
    Some(violation(q, &check.message, check.severity))
}

fn check_position(resolver: &Resolver<'_>, check: &PositionCheck) -> Option<FormViolation> {
    let keypoint = resolver.get(&check.keypoint)?;
    let reference = resolver.get(&check.reference)?;

    let holds = match check.relation {
        Relation::Above => geometry::is_above(keypoint, reference),
        Relation::Below => geometry::is_below(keypoint, reference),
        Relation::LeftOf => geometry::is_left_of(keypoint, reference),
        Relation::RightOf => geometry::is_right_of(keypoint, reference),
    };

    if holds {
        return None;
    }
    Some(violation(&check.keypoint, &check.message, check.severity))
}

fn check_distance(resolver: &Resolver<'_>, check: &DistanceCheck) -> Option<FormViolation> {
    let [p, q] = &check.keypoints;
    let [r, s] = &check.reference_keypoints;

    let measured = geometry::distance(resolver.get(p)?, resolver.get(q)?);
    let reference = geometry::distance(resolver.get(r)?, resolver.get(s)?);
    // 基準ペアが重なっている（比較できる尺度がない）
    if reference == 0.0 {
        return None;
    }

    let ratio = measured / reference;
    if ratio >= check.min_ratio && ratio <= check.max_ratio {
        return None;
    }
    Some(violation(q, &check.message, check.severity))
}
