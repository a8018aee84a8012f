use std::time::Instant;

use serde::{Deserialize, Serialize};

/// COCO 17キーポイントのインデックス（モデル出力順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = 17;

    pub const ALL: [KeypointIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 運動ルールで使う snake_case 名
    pub fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    /// [`KeypointIndex::name`] の逆引き。未知の名前は `None`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|part| part.name() == name)
    }
}

/// 単一キーポイント
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keypoint {
    pub part: KeypointIndex,
    /// 正規化X座標 (モデル入力に対し0.0-1.0)
    pub x: f32,
    /// 正規化Y座標（下向きに増加）
    pub y: f32,
    /// 信頼度 (0.0-1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(part: KeypointIndex, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            part,
            x,
            y,
            confidence,
        }
    }

    pub fn name(&self) -> &'static str {
        self.part.name()
    }

    /// 信頼度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// 1フレーム中の1人分の17キーポイント骨格
///
/// 全部位が常に存在する。検出できなかった部位は省かれず低い信頼度を持つ。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pose {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
    /// キーポイント信頼度の平均
    pub confidence: f32,
    #[serde(skip_serializing)]
    pub timestamp: Instant,
}

impl Pose {
    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self::with_timestamp(keypoints, Instant::now())
    }

    pub fn with_timestamp(keypoints: [Keypoint; KeypointIndex::COUNT], timestamp: Instant) -> Self {
        let confidence = average_confidence(&keypoints);
        Self {
            keypoints,
            confidence,
            timestamp,
        }
    }

    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// 名前でキーポイントを引く
    pub fn by_name(&self, name: &str) -> Option<&Keypoint> {
        KeypointIndex::from_name(name).map(|index| self.get(index))
    }

    pub fn average_confidence(&self) -> f32 {
        average_confidence(&self.keypoints)
    }
}

fn average_confidence(keypoints: &[Keypoint; KeypointIndex::COUNT]) -> f32 {
    let sum: f32 = keypoints.iter().map(|k| k.confidence).sum();
    sum / KeypointIndex::COUNT as f32
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(std::array::from_fn(|i| {
            Keypoint::new(KeypointIndex::ALL[i], 0.0, 0.0, 0.0)
        }))
    }
}
