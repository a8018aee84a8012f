use std::sync::atomic::Ordering;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use ndarray::Array4;
use tracing::warn;

use super::controller::DecodedFrame;
use super::service::{Command, SessionGate};
use crate::error::VisionError;
use crate::pose::{ModelHandle, PoseDecoder};

/// `every` フレームごとに1枚を通す（最初のフレームは必ず通す）
#[derive(Debug, Clone)]
pub struct FrameSampler {
    every: u32,
    count: u64,
}

impl FrameSampler {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            count: 0,
        }
    }

    pub fn tick(&mut self) -> bool {
        let hit = self.count % u64::from(self.every) == 0;
        self.count += 1;
        hit
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// トラッキング中でないため何もしていない
    Idle,
    /// サンプラーで間引かれた
    Skipped,
    /// 推論とデコードを実行した（姿勢が得られたか）
    Decoded { has_pose: bool },
}

/// セッションのプロデューサー側
///
/// カメラ/フレームスレッド上で、間引き後のフレームに推論とデコードを行い、
/// 結果をセッションワーカーへ渡す。チャネルを渡るのはデコード済みの値のみ。
pub struct FrameProcessor {
    model: ModelHandle,
    decoder: PoseDecoder,
    sampler: FrameSampler,
    scratch: Vec<f32>,
    tx: Sender<Command>,
    gate: Arc<SessionGate>,
}

impl FrameProcessor {
    pub(super) fn new(
        model: ModelHandle,
        decoder: PoseDecoder,
        frame_skip: u32,
        tx: Sender<Command>,
        gate: Arc<SessionGate>,
    ) -> Self {
        Self {
            model,
            decoder,
            sampler: FrameSampler::new(frame_skip),
            scratch: Vec::with_capacity(decoder.required_len()),
            tx,
            gate,
        }
    }

    /// カメラフレーム1枚を処理
    ///
    /// `prepare` はリサイズ済みのモデル入力を作る。トラッキング中かつ
    /// サンプラーを通ったフレームでのみ呼ばれる。
    pub fn on_frame<F>(&mut self, prepare: F) -> Result<FrameOutcome, VisionError>
    where
        F: FnOnce() -> Array4<f32>,
    {
        if !self.gate.tracking.load(Ordering::Acquire) {
            self.sampler.reset();
            return Ok(FrameOutcome::Idle);
        }
        if !self.sampler.tick() {
            return Ok(FrameOutcome::Skipped);
        }

        // 推論前の世代。推論中に停止されるとこのフレームは古い世代になる
        let generation = self.gate.epoch.load(Ordering::Acquire);

        let pose = match self.model.run(prepare(), &mut self.scratch) {
            Ok(()) => self.decoder.decode(&self.scratch),
            Err(e) => {
                warn!("frame dropped: {}", e);
                None
            }
        };
        self.scratch.clear();

        // 推論後に採番（プロデューサーが複数でも全体で単調増加）
        let seq = self.gate.next_seq();
        let has_pose = pose.is_some();
        self.tx
            .send(Command::Frame(DecodedFrame {
                generation,
                seq,
                pose,
            }))
            .map_err(|_| VisionError::ServiceStopped)?;

        Ok(FrameOutcome::Decoded { has_pose })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::InferenceRuntime;
    use std::sync::mpsc;

    struct EmptyRuntime;

    impl InferenceRuntime for EmptyRuntime {
        fn run_inference(&mut self, _input: Array4<f32>, output: &mut Vec<f32>) -> anyhow::Result<()> {
            output.clear();
            Ok(())
        }
    }

    fn input() -> Array4<f32> {
        Array4::zeros((1, 3, 4, 4))
    }

    #[test]
    fn test_sampler_every_third() {
        let mut sampler = FrameSampler::new(3);
        let hits: Vec<bool> = (0..7).map(|_| sampler.tick()).collect();
        assert_eq!(hits, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_sampler_zero_means_every_frame() {
        let mut sampler = FrameSampler::new(0);
        assert!((0..5).all(|_| sampler.tick()));
    }

    #[test]
    fn test_sampler_reset() {
        let mut sampler = FrameSampler::new(2);
        assert!(sampler.tick());
        sampler.reset();
        assert!(sampler.tick());
        assert!(!sampler.tick());
    }

    #[test]
    fn test_sequence_is_shared_between_producers() {
        let (tx, rx) = mpsc::channel();
        let gate = Arc::new(SessionGate::default());
        gate.tracking.store(true, Ordering::Release);
        let model = ModelHandle::with_runtime(Box::new(EmptyRuntime));

        let mut a = FrameProcessor::new(model.clone(), PoseDecoder::new(), 1, tx.clone(), gate.clone());
        let mut b = FrameProcessor::new(model, PoseDecoder::new(), 1, tx, gate);
        let decoded = FrameOutcome::Decoded { has_pose: false };
        assert_eq!(a.on_frame(input).unwrap(), decoded);
        assert_eq!(b.on_frame(input).unwrap(), decoded);
        assert_eq!(b.on_frame(input).unwrap(), decoded);
        assert_eq!(a.on_frame(input).unwrap(), decoded);

        let seqs: Vec<u64> = rx
            .try_iter()
            .map(|command| match command {
                Command::Frame(frame) => frame.seq,
                _ => panic!("unexpected command"),
            })
            .collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_idle_gate_skips_inference() {
        let (tx, rx) = mpsc::channel();
        let gate = Arc::new(SessionGate::default());
        let mut processor = FrameProcessor::new(ModelHandle::new(), PoseDecoder::new(), 1, tx, gate);
        let outcome = processor
            .on_frame(|| -> Array4<f32> { panic!("input must not be prepared while idle") })
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Idle);
        assert!(rx.try_recv().is_err());
    }
}
