//! 運動ルールのモデル（型付きの幾何チェックを運動ごとにまとめる）

mod registry;
mod rules;

use serde::{Deserialize, Serialize};

pub use registry::{builtin_registry, ExerciseRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// 違反1件あたりの減点
    pub fn penalty(self) -> u32 {
        match self {
            Severity::Warning => 10,
            Severity::Error => 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// 上下に並ぶ
    Vertical,
    /// 左右に水平に並ぶ
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Above,
    Below,
    LeftOf,
    RightOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Assessment,
    Warmup,
    Strength,
    Balance,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Assessment,
        Category::Warmup,
        Category::Strength,
        Category::Balance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Assessment => "assessment",
            Category::Warmup => "warmup",
            Category::Strength => "strength",
            Category::Balance => "balance",
        }
    }
}

/// 中央キーポイントの関節角度が `[min, max]` 度に収まること
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleCheck {
    /// (a, 頂点, c)
    pub keypoints: [String; 3],
    pub min: f32,
    pub max: f32,
    pub message: String,
    pub severity: Severity,
}

/// 2点を結ぶ線分の軸からのずれが `tolerance` 度未満であること
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentCheck {
    pub keypoints: [String; 2],
    #[serde(alias = "direction")]
    pub axis: Axis,
    pub tolerance: f32,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionCheck {
    pub keypoint: String,
    pub reference: String,
    pub relation: Relation,
    pub message: String,
    pub severity: Severity,
}

/// 基準ペア（肩幅など）に対する2点間距離の比が `[min_ratio, max_ratio]` に収まること
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceCheck {
    pub keypoints: [String; 2],
    pub reference_keypoints: [String; 2],
    pub min_ratio: f32,
    pub max_ratio: f32,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormCheck {
    Angle(AngleCheck),
    Alignment(AlignmentCheck),
    Position(PositionCheck),
    Distance(DistanceCheck),
}

impl FormCheck {
    pub fn angle(keypoints: [&str; 3], min: f32, max: f32, message: &str, severity: Severity) -> Self {
        FormCheck::Angle(AngleCheck {
            keypoints: keypoints.map(String::from),
            min,
            max,
            message: message.to_string(),
            severity,
        })
    }

    pub fn alignment(
        keypoints: [&str; 2],
        axis: Axis,
        tolerance: f32,
        message: &str,
        severity: Severity,
    ) -> Self {
        FormCheck::Alignment(AlignmentCheck {
            keypoints: keypoints.map(String::from),
            axis,
            tolerance,
            message: message.to_string(),
            severity,
        })
    }

    pub fn position(
        keypoint: &str,
        reference: &str,
        relation: Relation,
        message: &str,
        severity: Severity,
    ) -> Self {
        FormCheck::Position(PositionCheck {
            keypoint: keypoint.to_string(),
            reference: reference.to_string(),
            relation,
            message: message.to_string(),
            severity,
        })
    }

    pub fn distance(
        keypoints: [&str; 2],
        reference_keypoints: [&str; 2],
        min_ratio: f32,
        max_ratio: f32,
        message: &str,
        severity: Severity,
    ) -> Self {
        FormCheck::Distance(DistanceCheck {
            keypoints: keypoints.map(String::from),
            reference_keypoints: reference_keypoints.map(String::from),
            min_ratio,
            max_ratio,
            message: message.to_string(),
            severity,
        })
    }

    pub fn severity(&self) -> Severity {
        match self {
            FormCheck::Angle(c) => c.severity,
            FormCheck::Alignment(c) => c.severity,
            FormCheck::Position(c) => c.severity,
            FormCheck::Distance(c) => c.severity,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FormCheck::Angle(c) => &c.message,
            FormCheck::Alignment(c) => &c.message,
            FormCheck::Position(c) => &c.message,
            FormCheck::Distance(c) => &c.message,
        }
    }
}

/// 1運動分のルール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseRule {
    /// 例: "balance-1"
    pub id: String,
    /// 表示名。例: "Knee Bends"
    pub name: String,
    pub category: Category,
    pub checks: Vec<FormCheck>,
    /// この信頼度未満のキーポイントは欠損扱い
    #[serde(default)]
    pub min_confidence: Option<f32>,
}

impl ExerciseRule {
    pub fn new(id: &str, name: &str, category: Category, checks: Vec<FormCheck>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            checks,
            min_confidence: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        exercises: Vec<ExerciseRule>,
    }

    #[test]
    fn test_penalties() {
        assert_eq!(Severity::Warning.penalty(), 10);
        assert_eq!(Severity::Error.penalty(), 20);
    }

    #[test]
    fn test_rule_from_toml() {
        let src = r#"
            [[exercises]]
            id = "custom-1"
            name = "Wall Sit"
            category = "strength"
            min_confidence = 0.5
            checks = [
                { type = "angle", keypoints = ["left_hip", "left_knee", "left_ankle"], min = 80.0, max = 100.0, message = "Hold the sit", severity = "warning" },
                { type = "alignment", keypoints = ["left_shoulder", "left_hip"], direction = "vertical", tolerance = 10.0, message = "Back to the wall", severity = "error" },
                { type = "position", keypoint = "left_wrist", reference = "left_hip", relation = "left_of", message = "Hands by your side", severity = "warning" },
                { type = "distance", keypoints = ["left_ankle", "right_ankle"], reference_keypoints = ["left_shoulder", "right_shoulder"], min_ratio = 0.8, max_ratio = 1.2, message = "Feet shoulder-width apart", severity = "warning" },
            ]
        "#;
        let parsed: Wrapper = toml::from_str(src).unwrap();
        let rule = &parsed.exercises[0];

        assert_eq!(rule.category, Category::Strength);
        assert_eq!(rule.min_confidence, Some(0.5));
        assert_eq!(rule.checks.len(), 4);
        assert_eq!(
            rule.checks[0],
            FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 80.0, 100.0, "Hold the sit", Severity::Warning)
        );
        assert!(matches!(
            &rule.checks[1],
            FormCheck::Alignment(AlignmentCheck { axis: Axis::Vertical, severity: Severity::Error, .. })
        ));
        assert!(matches!(
            &rule.checks[2],
            FormCheck::Position(PositionCheck { relation: Relation::LeftOf, .. })
        ));
        assert_eq!(rule.checks[3].message(), "Feet shoulder-width apart");
    }

    #[test]
    fn test_unknown_check_type_is_rejected() {
        let src = r#"
            [[exercises]]
            id = "x"
            name = "x"
            category = "balance"
            checks = [{ type = "velocity", message = "m", severity = "warning" }]
        "#;
        assert!(toml::from_str::<Wrapper>(src).is_err());
    }
}
