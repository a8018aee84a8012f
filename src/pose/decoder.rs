use std::time::Instant;

use tracing::debug;

use super::keypoint::{Keypoint, KeypointIndex, Pose};

/// 出力テンソルあたりの候補数（YOLO pose、640x640入力）
pub const NUM_DETECTIONS: usize = 8400;
/// ボックス4 + 信頼度1 + 17 * (x, y, 信頼度)
pub const VALUES_PER_DETECTION: usize = 5 + KeypointIndex::COUNT * 3;
/// 検出信頼度のフィールド
pub const CONFIDENCE_FIELD: usize = 4;
/// 最初のキーポイントのフィールド。キーポイント k は 5+3k .. 5+3k+2
pub const KEYPOINT_FIELD_OFFSET: usize = 5;
/// この信頼度未満は「誰もいない」扱い
pub const MIN_POSE_CONFIDENCE: f32 = 0.3;

/// フィールド優先の `[1, 56, N]` 出力から最良の姿勢を1つ取り出す
///
/// バッファはフィールドごとに並ぶ（N 個の信頼度が連続）。検出 `i` の
/// フィールド `f` は `f * N + i` にある。
#[derive(Debug, Clone, Copy)]
pub struct PoseDecoder {
    num_detections: usize,
    min_confidence: f32,
}

impl PoseDecoder {
    pub fn new() -> Self {
        Self::with_threshold(MIN_POSE_CONFIDENCE)
    }

    pub fn with_threshold(min_confidence: f32) -> Self {
        Self {
            num_detections: NUM_DETECTIONS,
            min_confidence,
        }
    }

    /// 候補数が異なるモデル用
    pub fn with_detections(num_detections: usize, min_confidence: f32) -> Self {
        Self {
            num_detections,
            min_confidence,
        }
    }

    pub fn num_detections(&self) -> usize {
        self.num_detections
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// 正しい出力に必要な最小長
    pub fn required_len(&self) -> usize {
        self.num_detections * VALUES_PER_DETECTION
    }

    /// 信頼度が厳密に最大の候補のインデックスと信頼度
    ///
    /// 同点は小さいインデックスを残す。0以下（または NaN）の候補は選ばない。
    pub fn best_detection(&self, data: &[f32]) -> Option<(usize, f32)> {
        if data.len() < self.required_len() {
            return None;
        }

        let n = self.num_detections;
        let confidences = &data[CONFIDENCE_FIELD * n..(CONFIDENCE_FIELD + 1) * n];

        let mut best_score: f32 = 0.0;
        let mut best_idx: Option<usize> = None;
        for (i, &score) in confidences.iter().enumerate() {
            if score > best_score {
                best_score = score;
                best_idx = Some(i);
            }
        }

        best_idx.map(|i| (i, best_score))
    }

    /// 最良の検出をデコード。使える検出が無ければ `None`
    ///
    /// 短いバッファや低信頼度はエラーではなく「姿勢なし」のフレーム。
    pub fn decode(&self, data: &[f32]) -> Option<Pose> {
        if data.len() < self.required_len() {
            debug!(
                expected = self.required_len(),
                got = data.len(),
                "pose output shorter than expected"
            );
            return None;
        }

        let (idx, score) = self.best_detection(data)?;
        if score < self.min_confidence {
            return None;
        }

        let n = self.num_detections;
        let keypoints: [Keypoint; KeypointIndex::COUNT] = std::array::from_fn(|k| {
            let base = (KEYPOINT_FIELD_OFFSET + k * 3) * n + idx;
            Keypoint::new(
                KeypointIndex::ALL[k],
                data[base],
                data[base + n],
                data[base + 2 * n],
            )
        });

        Some(Pose::with_timestamp(keypoints, Instant::now()))
    }
}

impl Default for PoseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SMALL_N: usize = 32;

    fn empty_buffer(n: usize) -> Vec<f32> {
        vec![0.0; n * VALUES_PER_DETECTION]
    }

    fn set_field(data: &mut [f32], n: usize, field: usize, idx: usize, value: f32) {
        data[field * n + idx] = value;
    }

    /// 検出を1件書き込む（信頼度と、キーポイント k を (k/100, k/50, 0.8) に）
    fn write_detection(data: &mut [f32], n: usize, idx: usize, confidence: f32) {
        set_field(data, n, CONFIDENCE_FIELD, idx, confidence);
        for k in 0..KeypointIndex::COUNT {
            let field = KEYPOINT_FIELD_OFFSET + k * 3;
            set_field(data, n, field, idx, k as f32 / 100.0);
            set_field(data, n, field + 1, idx, k as f32 / 50.0);
            set_field(data, n, field + 2, idx, 0.8);
        }
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(VALUES_PER_DETECTION, 56);
        assert_eq!(PoseDecoder::new().required_len(), 8400 * 56);
    }

    #[test]
    fn test_decode_full_size_buffer() {
        let decoder = PoseDecoder::new();
        let mut data = empty_buffer(NUM_DETECTIONS);
        write_detection(&mut data, NUM_DETECTIONS, 4321, 0.9);

        let pose = decoder.decode(&data).expect("pose expected");
        let elbow = pose.get(KeypointIndex::LeftElbow);
        assert_eq!(elbow.part, KeypointIndex::LeftElbow);
        assert!((elbow.x - 0.07).abs() < 1e-6);
        assert!((elbow.y - 0.14).abs() < 1e-6);
        assert!((pose.confidence - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_decode_picks_highest_confidence() {
        let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
        let mut data = empty_buffer(SMALL_N);
        write_detection(&mut data, SMALL_N, 3, 0.5);
        write_detection(&mut data, SMALL_N, 20, 0.95);
        set_field(&mut data, SMALL_N, KEYPOINT_FIELD_OFFSET, 20, 0.42);

        assert_eq!(decoder.best_detection(&data), Some((20, 0.95)));
        let pose = decoder.decode(&data).unwrap();
        assert_eq!(pose.get(KeypointIndex::Nose).x, 0.42);
    }

    #[test]
    fn test_tie_keeps_first_index() {
        let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
        let mut data = empty_buffer(SMALL_N);
        write_detection(&mut data, SMALL_N, 7, 0.6);
        write_detection(&mut data, SMALL_N, 9, 0.6);
        assert_eq!(decoder.best_detection(&data), Some((7, 0.6)));
    }

    #[test]
    fn test_undersized_buffer_is_no_pose() {
        let decoder = PoseDecoder::new();
        let mut data = empty_buffer(NUM_DETECTIONS);
        write_detection(&mut data, NUM_DETECTIONS, 10, 0.9);
        data.pop();
        assert!(decoder.decode(&data).is_none());
        assert!(decoder.decode(&[]).is_none());
    }

    #[test]
    fn test_longer_buffer_is_accepted() {
        let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
        let mut data = empty_buffer(SMALL_N);
        write_detection(&mut data, SMALL_N, 1, 0.7);
        data.extend_from_slice(&[9.0; 16]);
        assert!(decoder.decode(&data).is_some());
    }

    #[test]
    fn test_low_confidence_is_no_pose() {
        let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
        let mut data = empty_buffer(SMALL_N);
        write_detection(&mut data, SMALL_N, 5, 0.29);
        assert!(decoder.decode(&data).is_none());

        write_detection(&mut data, SMALL_N, 6, 0.3);
        assert!(decoder.decode(&data).is_some(), "threshold is inclusive");
    }

    #[test]
    fn test_all_zero_confidence_is_no_pose() {
        let decoder = PoseDecoder::with_detections(SMALL_N, 0.0);
        let data = empty_buffer(SMALL_N);
        assert!(decoder.best_detection(&data).is_none());
        assert!(decoder.decode(&data).is_none());
    }

    #[test]
    fn test_nan_confidence_is_ignored() {
        let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
        let mut data = empty_buffer(SMALL_N);
        write_detection(&mut data, SMALL_N, 0, f32::NAN);
        write_detection(&mut data, SMALL_N, 2, 0.4);
        assert_eq!(decoder.best_detection(&data), Some((2, 0.4)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_selects_strict_maximum(
            base in 0usize..SMALL_N,
            other in 0usize..SMALL_N,
            base_conf in 0.3f32..0.6,
            bump in 0.01f32..0.4,
        ) {
            let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
            let mut data = empty_buffer(SMALL_N);
            write_detection(&mut data, SMALL_N, base, base_conf);
            prop_assert_eq!(decoder.best_detection(&data).map(|(i, _)| i), Some(base));

            // 厳密に高い信頼度があれば選択が移る
            write_detection(&mut data, SMALL_N, other, base_conf + bump);
            prop_assert_eq!(decoder.best_detection(&data).map(|(i, _)| i), Some(other));
        }

        #[test]
        fn prop_below_threshold_never_decodes(
            idx in 0usize..SMALL_N,
            conf in 0.0f32..0.3,
        ) {
            let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
            let mut data = empty_buffer(SMALL_N);
            write_detection(&mut data, SMALL_N, idx, conf);
            prop_assert!(decoder.decode(&data).is_none());
        }

        #[test]
        fn prop_short_buffer_never_decodes(cut in 1usize..VALUES_PER_DETECTION * SMALL_N) {
            let decoder = PoseDecoder::with_detections(SMALL_N, MIN_POSE_CONFIDENCE);
            let mut data = empty_buffer(SMALL_N);
            write_detection(&mut data, SMALL_N, 0, 0.99);
            data.truncate(data.len() - cut);
            prop_assert!(decoder.decode(&data).is_none());
        }
    }
}
