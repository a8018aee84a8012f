use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::exercise::{ExerciseRegistry, ExerciseRule};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// 組み込みカタログに上書きマージする追加ルール
    #[serde(default)]
    pub exercises: Vec<ExerciseRule>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// ONNXモデルファイル
    #[serde(default = "default_model_path")]
    pub path: String,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    /// 姿勢として報告する検出スコアの下限
    #[serde(default = "default_min_pose_confidence")]
    pub min_pose_confidence: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// スナップショット通知の最小間隔
    #[serde(default = "default_publish_interval_ms")]
    pub publish_interval_ms: u64,
    /// Nフレームに1回推論する
    #[serde(default = "default_frame_skip")]
    pub frame_skip: u32,
}

fn default_model_path() -> String { "models/yolo26n_pose.onnx".to_string() }
fn default_input_name() -> String { "images".to_string() }
fn default_output_name() -> String { "output0".to_string() }
fn default_min_pose_confidence() -> f32 { 0.3 }
fn default_publish_interval_ms() -> u64 { 200 }
fn default_frame_skip() -> u32 { 3 }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            input_name: default_input_name(),
            output_name: default_output_name(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_pose_confidence: default_min_pose_confidence(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            publish_interval_ms: default_publish_interval_ms(),
            frame_skip: default_frame_skip(),
        }
    }
}

impl SessionConfig {
    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// `path` があれば読み込み、無ければデフォルト
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// 組み込みカタログに設定のルールをマージしたもの
    pub fn registry(&self) -> ExerciseRegistry {
        ExerciseRegistry::builtin().with_rules(self.exercises.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.model.path, "models/yolo26n_pose.onnx");
        assert_eq!(config.model.input_name, "images");
        assert_eq!(config.model.output_name, "output0");
        assert_eq!(config.detection.min_pose_confidence, 0.3);
        assert_eq!(config.session.publish_interval(), Duration::from_millis(200));
        assert_eq!(config.session.frame_skip, 3);
        assert!(config.exercises.is_empty());
        assert_eq!(config.registry().len(), 24);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [model]
            path = "/data/pose.onnx"

            [session]
            frame_skip = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.model.path, "/data/pose.onnx");
        assert_eq!(config.model.input_name, "images");
        assert_eq!(config.session.frame_skip, 1);
        assert_eq!(config.session.publish_interval_ms, 200);
    }

    #[test]
    fn test_exercises_merge_into_registry() {
        let config: Config = toml::from_str(
            r#"
            [[exercises]]
            id = "custom-1"
            name = "Wall Sit"
            category = "strength"
            checks = [
              { type = "angle", keypoints = ["left_hip", "left_knee", "left_ankle"], min = 80.0, max = 100.0, message = "Hold the sit", severity = "warning" },
            ]
            "#,
        )
        .unwrap();
        let registry = config.registry();
        assert_eq!(registry.len(), 25);
        assert_eq!(registry.exercise_rules("custom-1").unwrap().name, "Wall Sit");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/peer_vision.toml").unwrap();
        assert_eq!(config.session.frame_skip, 3);
        assert!(Config::load("/nonexistent/peer_vision.toml").is_err());
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("peer_vision_config_{}.toml", std::process::id()));
        fs::write(&path, "[detection]\nmin_pose_confidence = 0.5\n").unwrap();
        let config = Config::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.detection.min_pose_confidence, 0.5);
    }

    #[test]
    fn test_legacy_input_size_key_is_ignored() {
        // 入力サイズはリサイズ側の責務。古い設定ファイルもそのまま読める
        let config: Config = toml::from_str(
            r#"
            [model]
            path = "/data/pose.onnx"
            input_size = 640
            "#,
        )
        .unwrap();
        assert_eq!(config.model.path, "/data/pose.onnx");
        assert_eq!(config.model.output_name, "output0");
    }
}
