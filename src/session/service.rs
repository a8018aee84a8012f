use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::controller::{AppLifecycle, DecodedFrame, SessionController, VisionSnapshot};
use super::frame::FrameProcessor;
use crate::config::Config;
use crate::error::VisionError;
use crate::exercise::{Category, ExerciseRegistry, ExerciseRule};
use crate::pose::{InferenceRuntime, ModelHandle, PoseDecoder};

/// 呼び出し側・プロデューサー・ワーカーで共有する状態
///
/// `epoch` は開始/停止のたびにコマンド送信前に進める。処理中のフレームは
/// 古い世代を持つことになる。
#[derive(Debug, Default)]
pub(crate) struct SessionGate {
    pub(crate) epoch: AtomicU64,
    pub(crate) tracking: AtomicBool,
    /// 全プロデューサー共通のフレーム番号
    frame_seq: AtomicU64,
}

impl SessionGate {
    fn advance(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn next_seq(&self) -> u64 {
        self.frame_seq.fetch_add(1, Ordering::AcqRel) + 1
    }
}

pub(crate) enum Command {
    Frame(DecodedFrame),
    Start { exercise_id: String, generation: u64 },
    Stop { generation: u64 },
    AppState { state: AppLifecycle, generation: u64 },
    SetError(Option<String>),
    Subscribe(Sender<VisionSnapshot>),
    Shutdown,
}

/// ビジョンセッションの公開インターフェース
///
/// セッション状態を唯一書き換えるワーカースレッドを所有する。
/// フレームは [`VisionService::frame_processor`] が返す [`FrameProcessor`]
/// から入り、スナップショットは [`VisionService::subscribe`] から出る。
pub struct VisionService {
    tx: Sender<Command>,
    gate: Arc<SessionGate>,
    model: ModelHandle,
    registry: Arc<ExerciseRegistry>,
    decoder: PoseDecoder,
    frame_skip: u32,
    worker: Option<thread::JoinHandle<()>>,
}

impl VisionService {
    pub fn new(config: &Config, model: ModelHandle) -> Result<Self> {
        Self::with_registry(config, Arc::new(config.registry()), model)
    }

    pub fn with_registry(
        config: &Config,
        registry: Arc<ExerciseRegistry>,
        model: ModelHandle,
    ) -> Result<Self> {
        let decoder = PoseDecoder::with_threshold(config.detection.min_pose_confidence);
        let (tx, rx) = mpsc::channel();
        let gate = Arc::new(SessionGate::default());
        let controller = SessionController::new(registry.clone(), config.session.publish_interval());

        let worker = {
            let gate = gate.clone();
            let model = model.clone();
            thread::Builder::new()
                .name("vision-session".to_string())
                .spawn(move || run_worker(controller, rx, gate, model))
                .context("failed to spawn session worker")?
        };

        info!(
            interval_ms = config.session.publish_interval_ms,
            frame_skip = config.session.frame_skip,
            exercises = registry.len(),
            "vision service started"
        );

        Ok(Self {
            tx,
            gate,
            model,
            registry,
            decoder,
            frame_skip: config.session.frame_skip,
            worker: Some(worker),
        })
    }

    fn send(&self, command: Command) -> Result<(), VisionError> {
        self.tx.send(command).map_err(|_| VisionError::ServiceStopped)
    }

    /// 推論ランタイムを読み込む。失敗は購読者にも配信する（リトライなし）。
    pub fn initialize_model<F>(&self, loader: F) -> Result<(), VisionError>
    where
        F: FnOnce() -> Result<Box<dyn InferenceRuntime>>,
    {
        match self.model.initialize(loader) {
            Ok(()) => {
                self.send(Command::SetError(None))?;
                Ok(())
            }
            Err(e) => {
                self.send(Command::SetError(Some(e.to_string())))?;
                Err(e)
            }
        }
    }

    /// トラッキングを止めてランタイムを解放
    pub fn release_model(&self) -> Result<(), VisionError> {
        self.stop_tracking()?;
        self.model.release();
        Ok(())
    }

    pub fn is_model_ready(&self) -> bool {
        self.model.is_ready()
    }

    /// このセッションに紐づく新しいプロデューサー
    pub fn frame_processor(&self) -> FrameProcessor {
        FrameProcessor::new(
            self.model.clone(),
            self.decoder,
            self.frame_skip,
            self.tx.clone(),
            self.gate.clone(),
        )
    }

    /// スナップショットを購読（最初に現在の状態が届く）
    pub fn subscribe(&self) -> Result<Receiver<VisionSnapshot>, VisionError> {
        let (tx, rx) = mpsc::channel();
        self.send(Command::Subscribe(tx))?;
        Ok(rx)
    }

    /// `exercise_id` のトラッキングを開始。モデル準備前は何もしない。
    pub fn start_tracking(&self, exercise_id: &str) -> Result<(), VisionError> {
        if !self.model.is_ready() {
            info!(exercise_id, "start_tracking ignored, model not ready");
            return Ok(());
        }
        let generation = self.gate.advance();
        self.gate.tracking.store(true, Ordering::Release);
        self.send(Command::Start {
            exercise_id: exercise_id.to_string(),
            generation,
        })
    }

    /// 処理中のフレームにも効く（その結果は配信されない）
    pub fn stop_tracking(&self) -> Result<(), VisionError> {
        let generation = self.gate.advance();
        self.gate.tracking.store(false, Ordering::Release);
        self.send(Command::Stop { generation })
    }

    pub fn on_app_state(&self, state: AppLifecycle) -> Result<(), VisionError> {
        if state == AppLifecycle::Active {
            return Ok(());
        }
        let generation = self.gate.advance();
        self.gate.tracking.store(false, Ordering::Release);
        self.send(Command::AppState { state, generation })
    }

    /// フレームを処理中か
    pub fn is_tracking(&self) -> bool {
        self.gate.tracking.load(Ordering::Acquire)
    }

    pub fn exercise_rules(&self, id: &str) -> Option<&ExerciseRule> {
        self.registry.exercise_rules(id)
    }

    pub fn list_exercise_ids(&self) -> Vec<&str> {
        self.registry.list_exercise_ids()
    }

    pub fn list_by_category(&self, category: Category) -> Vec<&ExerciseRule> {
        self.registry.list_by_category(category)
    }

    pub fn registry(&self) -> &Arc<ExerciseRegistry> {
        &self.registry
    }
}

impl Drop for VisionService {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("session worker panicked");
            }
        }
    }
}

struct Subscribers(Vec<Sender<VisionSnapshot>>);

impl Subscribers {
    fn publish(&mut self, snapshot: &VisionSnapshot) {
        self.0.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

fn run_worker(
    mut controller: SessionController,
    rx: Receiver<Command>,
    gate: Arc<SessionGate>,
    model: ModelHandle,
) {
    let mut subscribers = Subscribers(Vec::new());

    loop {
        let command = match controller.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            },
        };

        // ライフサイクル変化は常に配信、フレーム結果は現行セッションの間のみ
        let mut frame_update = None;
        match command {
            Some(Command::Frame(frame)) => {
                frame_update = controller.on_frame(frame, Instant::now());
            }
            Some(Command::Start { exercise_id, generation }) => {
                let started = controller.start(&exercise_id, generation, model.is_ready(), Instant::now());
                match started {
                    Some(snapshot) => subscribers.publish(&snapshot),
                    None => {
                        // 呼び出し側の確認後にモデルが解放された
                        if gate.epoch.load(Ordering::Acquire) == generation {
                            gate.tracking.store(false, Ordering::Release);
                        }
                    }
                }
            }
            Some(Command::Stop { generation }) => {
                if let Some(snapshot) = controller.stop(generation) {
                    subscribers.publish(&snapshot);
                }
            }
            Some(Command::AppState { state, generation }) => {
                if let Some(snapshot) = controller.on_app_state(state, generation) {
                    subscribers.publish(&snapshot);
                }
            }
            Some(Command::SetError(error)) => {
                if let Some(snapshot) = controller.set_error(error) {
                    subscribers.publish(&snapshot);
                }
            }
            Some(Command::Subscribe(tx)) => {
                if tx.send(controller.snapshot()).is_ok() {
                    subscribers.0.push(tx);
                }
            }
            Some(Command::Shutdown) => break,
            None => {}
        }

        let flushed = controller.poll(Instant::now());
        for snapshot in frame_update.into_iter().chain(flushed) {
            if controller.generation() != gate.epoch.load(Ordering::Acquire) {
                debug!("session superseded, dropping frame update");
                continue;
            }
            subscribers.publish(&snapshot);
        }
    }

    debug!("session worker exiting");
}
