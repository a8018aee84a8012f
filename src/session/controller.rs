use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::analyzer::{analyze_pose, FormFeedback};
use crate::exercise::ExerciseRegistry;
use crate::pose::Pose;

/// ホストアプリのフォアグラウンド状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycle {
    Active,
    Inactive,
    Background,
}

/// 購読者に配信される状態
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionSnapshot {
    pub is_tracking: bool,
    pub exercise_id: Option<String>,
    pub current_pose: Option<Pose>,
    pub current_feedback: Option<FormFeedback>,
    pub error: Option<String>,
}

/// プロデューサーから渡される1フレーム分の結果
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// キャプチャ時点のセッション世代
    pub generation: u64,
    /// 全プロデューサー共通で単調増加
    pub seq: u64,
    pub pose: Option<Pose>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Idle,
    Tracking { exercise_id: String },
}

/// 単一ライターのセッション状態機械
///
/// 時刻は呼び出し側が渡す（スロットルを決定的に駆動するため）。
/// 各メソッドは配信すべきスナップショットを返す。
/// - 開始・停止・エラーは即時配信
/// - フレーム結果は配信間隔内なら保留し、`poll` で期限到来時に配信
/// - 保留中の配信内容は常に最新状態から組み立てる（後勝ち）
pub struct SessionController {
    registry: Arc<ExerciseRegistry>,
    interval: Duration,
    state: SessionState,
    generation: u64,
    last_seq: Option<u64>,
    last_pose: Option<Pose>,
    last_feedback: Option<FormFeedback>,
    error: Option<String>,
    /// 未配信のフレーム結果あり
    dirty: bool,
    next_publish_at: Instant,
}

impl SessionController {
    pub fn new(registry: Arc<ExerciseRegistry>, interval: Duration) -> Self {
        Self {
            registry,
            interval,
            state: SessionState::Idle,
            generation: 0,
            last_seq: None,
            last_pose: None,
            last_feedback: None,
            error: None,
            dirty: false,
            next_publish_at: Instant::now(),
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, SessionState::Tracking { .. })
    }

    pub fn exercise_id(&self) -> Option<&str> {
        match &self.state {
            SessionState::Tracking { exercise_id } => Some(exercise_id),
            SessionState::Idle => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> VisionSnapshot {
        VisionSnapshot {
            is_tracking: self.is_tracking(),
            exercise_id: self.exercise_id().map(str::to_string),
            current_pose: self.last_pose.clone(),
            current_feedback: self.last_feedback.clone(),
            error: self.error.clone(),
        }
    }

    /// `exercise_id` のトラッキングを開始。ランタイム未準備なら何もしない。
    pub fn start(
        &mut self,
        exercise_id: &str,
        generation: u64,
        runtime_ready: bool,
        now: Instant,
    ) -> Option<VisionSnapshot> {
        if !runtime_ready {
            info!(exercise_id, "start ignored, inference runtime not ready");
            return None;
        }
        if self.registry.exercise_rules(exercise_id).is_none() {
            debug!(exercise_id, "tracking unknown exercise, every frame will score 100");
        }

        self.generation = generation;
        self.state = SessionState::Tracking {
            exercise_id: exercise_id.to_string(),
        };
        self.reset_frame_state();
        self.error = None;
        self.next_publish_at = now + self.interval;
        info!(exercise_id, generation, "tracking started");
        Some(self.snapshot())
    }

    pub fn stop(&mut self, generation: u64) -> Option<VisionSnapshot> {
        self.generation = generation;
        if !self.is_tracking() {
            return None;
        }
        self.state = SessionState::Idle;
        self.reset_frame_state();
        info!(generation, "tracking stopped");
        Some(self.snapshot())
    }

    /// フォアグラウンドを離れたら（Inactive / Background）停止
    pub fn on_app_state(&mut self, app: AppLifecycle, generation: u64) -> Option<VisionSnapshot> {
        if app == AppLifecycle::Active {
            return None;
        }
        if self.is_tracking() {
            info!(?app, "app left foreground, stopping tracking");
        }
        self.stop(generation)
    }

    pub fn set_error(&mut self, error: Option<String>) -> Option<VisionSnapshot> {
        if self.error == error {
            return None;
        }
        self.error = error;
        Some(self.snapshot())
    }

    /// デコード済みフレームを解析して保持
    ///
    /// 別世代のフレーム、既に見た seq 以下のフレーム、Idle 中のフレームは破棄。
    pub fn on_frame(&mut self, frame: DecodedFrame, now: Instant) -> Option<VisionSnapshot> {
        let SessionState::Tracking { exercise_id } = &self.state else {
            return None;
        };
        if frame.generation != self.generation {
            debug!(
                frame_generation = frame.generation,
                generation = self.generation,
                "discarding frame from a previous session"
            );
            return None;
        }
        if self.last_seq.is_some_and(|last| frame.seq <= last) {
            debug!(seq = frame.seq, "discarding out-of-order frame");
            return None;
        }
        self.last_seq = Some(frame.seq);

        self.last_feedback = frame
            .pose
            .as_ref()
            .map(|pose| analyze_pose(pose, exercise_id, &self.registry));
        self.last_pose = frame.pose;

        if now >= self.next_publish_at {
            self.dirty = false;
            self.next_publish_at = now + self.interval;
            Some(self.snapshot())
        } else {
            self.dirty = true;
            None
        }
    }

    /// 配信時刻が来ていれば保留中の結果を配信
    pub fn poll(&mut self, now: Instant) -> Option<VisionSnapshot> {
        if !self.dirty || now < self.next_publish_at {
            return None;
        }
        self.dirty = false;
        self.next_publish_at = now + self.interval;
        Some(self.snapshot())
    }

    /// 次に `poll` が配信する時刻
    pub fn next_deadline(&self) -> Option<Instant> {
        self.dirty.then_some(self.next_publish_at)
    }

    fn reset_frame_state(&mut self) {
        self.last_seq = None;
        self.last_pose = None;
        self.last_feedback = None;
        self.dirty = false;
    }
}
