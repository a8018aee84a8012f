use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::info;

use super::{rules, Category, ExerciseRule};

/// 運動ID → ルールの読み取り専用テーブル
///
/// 起動時に一度だけ構築する。以降は `&self` のメソッドしかないため、
/// 共有参照をロックなしで任意のスレッドから読める。
#[derive(Debug, Clone)]
pub struct ExerciseRegistry {
    rules: Vec<ExerciseRule>,
    index: HashMap<String, usize>,
}

impl ExerciseRegistry {
    /// 組み込みの運動カタログ
    pub fn builtin() -> Self {
        Self::from_rules(rules::all())
    }

    /// `rules` から構築。重複IDは後勝ちだが一覧上の位置は最初のまま
    pub fn from_rules(rules: Vec<ExerciseRule>) -> Self {
        let mut registry = Self {
            rules: Vec::with_capacity(rules.len()),
            index: HashMap::with_capacity(rules.len()),
        };
        for rule in rules {
            registry.insert(rule);
        }
        registry
    }

    /// 共有前に追加ルール（設定ファイル等）をマージ
    pub fn with_rules(mut self, extra: Vec<ExerciseRule>) -> Self {
        for rule in extra {
            if self.index.contains_key(&rule.id) {
                info!(id = %rule.id, "overriding built-in exercise rules");
            }
            self.insert(rule);
        }
        self
    }

    fn insert(&mut self, rule: ExerciseRule) {
        match self.index.get(&rule.id) {
            Some(&pos) => self.rules[pos] = rule,
            None => {
                self.index.insert(rule.id.clone(), self.rules.len());
                self.rules.push(rule);
            }
        }
    }

    /// `id` のルール。未知のIDは `None`
    pub fn exercise_rules(&self, id: &str) -> Option<&ExerciseRule> {
        self.index.get(id).map(|&pos| &self.rules[pos])
    }

    /// 定義順の全運動ID
    pub fn list_exercise_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.id.as_str()).collect()
    }

    pub fn list_by_category(&self, category: Category) -> Vec<&ExerciseRule> {
        self.rules
            .iter()
            .filter(|rule| rule.category == category)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ExerciseRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// プロセス共通の組み込みレジストリ
pub fn builtin_registry() -> &'static ExerciseRegistry {
    static REGISTRY: OnceLock<ExerciseRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ExerciseRegistry::builtin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::{FormCheck, Severity};
    use crate::pose::KeypointIndex;

    #[test]
    fn test_builtin_catalogue_size() {
        let registry = ExerciseRegistry::builtin();
        assert_eq!(registry.len(), 24);
        assert_eq!(registry.list_by_category(Category::Assessment).len(), 3);
        assert_eq!(registry.list_by_category(Category::Warmup).len(), 5);
        assert_eq!(registry.list_by_category(Category::Strength).len(), 5);
        assert_eq!(registry.list_by_category(Category::Balance).len(), 11);
    }

    #[test]
    fn test_ids_in_definition_order() {
        let registry = builtin_registry();
        let ids = registry.list_exercise_ids();
        assert_eq!(ids[0], "assessment-1");
        assert_eq!(ids[3], "warmup-1");
        assert_eq!(ids[13], "balance-1");
        assert_eq!(ids[23], "balance-11");
    }

    #[test]
    fn test_lookup() {
        let registry = builtin_registry();
        let rule = registry.exercise_rules("balance-1").unwrap();
        assert_eq!(rule.name, "Knee Bends");
        assert_eq!(rule.category, Category::Balance);
        assert_eq!(rule.checks.len(), 4);
        assert!(registry.exercise_rules("balance-99").is_none());
        assert!(registry.exercise_rules("").is_none());
    }

    #[test]
    fn test_ids_match_category_prefix() {
        for rule in builtin_registry().iter() {
            assert!(
                rule.id.starts_with(rule.category.as_str()),
                "{} filed under {:?}",
                rule.id,
                rule.category
            );
        }
    }

    #[test]
    fn test_builtin_rules_use_canonical_names() {
        for rule in builtin_registry().iter() {
            for check in &rule.checks {
                let names: Vec<&str> = match check {
                    FormCheck::Angle(c) => c.keypoints.iter().map(String::as_str).collect(),
                    FormCheck::Alignment(c) => c.keypoints.iter().map(String::as_str).collect(),
                    FormCheck::Position(c) => vec![c.keypoint.as_str(), c.reference.as_str()],
                    FormCheck::Distance(c) => c
                        .keypoints
                        .iter()
                        .chain(c.reference_keypoints.iter())
                        .map(String::as_str)
                        .collect(),
                };
                for name in names {
                    assert!(
                        KeypointIndex::from_name(name).is_some(),
                        "{}: unknown keypoint {}",
                        rule.id,
                        name
                    );
                }
            }
        }
    }

    #[test]
    fn test_with_rules_appends_and_overrides() {
        let custom = ExerciseRule::new(
            "custom-1",
            "Wall Sit",
            Category::Strength,
            vec![FormCheck::angle(["left_hip", "left_knee", "left_ankle"], 80.0, 100.0, "Hold the sit", Severity::Warning)],
        );
        let replacement = ExerciseRule::new("balance-1", "Knee Bends (easy)", Category::Balance, vec![]);

        let registry = ExerciseRegistry::builtin().with_rules(vec![custom, replacement]);
        assert_eq!(registry.len(), 25);
        assert_eq!(registry.list_exercise_ids()[24], "custom-1");
        assert_eq!(registry.list_exercise_ids()[13], "balance-1");
        assert_eq!(registry.exercise_rules("balance-1").unwrap().name, "Knee Bends (easy)");
        assert_eq!(registry.list_by_category(Category::Strength).len(), 6);
    }

    #[test]
    fn test_concurrent_reads() {
        let registry = builtin_registry();
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(move || registry.exercise_rules("balance-6").map(|r| r.checks.len())))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(4));
        }
    }
}
