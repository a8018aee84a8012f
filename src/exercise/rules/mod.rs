//! 組み込みルール（カテゴリごとに1モジュール）

mod assessment;
mod balance;
mod strength;
mod warmup;

use super::ExerciseRule;

/// レジストリ順の全組み込み運動
pub(super) fn all() -> Vec<ExerciseRule> {
    let mut rules = assessment::rules();
    rules.extend(warmup::rules());
    rules.extend(strength::rules());
    rules.extend(balance::rules());
    rules
}
