use super::KeypointIndex;

/// 姿勢描画用のボーン接続 (始点キーポイント, 終点キーポイント)
pub const SKELETON_CONNECTIONS: [(KeypointIndex, KeypointIndex); 18] = [
    // 頭部
    (KeypointIndex::Nose, KeypointIndex::LeftEye),
    (KeypointIndex::Nose, KeypointIndex::RightEye),
    (KeypointIndex::LeftEye, KeypointIndex::LeftEar),
    (KeypointIndex::RightEye, KeypointIndex::RightEar),
    // 首
    (KeypointIndex::Nose, KeypointIndex::LeftShoulder),
    (KeypointIndex::Nose, KeypointIndex::RightShoulder),
    // 上半身
    (KeypointIndex::LeftShoulder, KeypointIndex::RightShoulder),
    (KeypointIndex::LeftShoulder, KeypointIndex::LeftElbow),
    (KeypointIndex::LeftElbow, KeypointIndex::LeftWrist),
    (KeypointIndex::RightShoulder, KeypointIndex::RightElbow),
    (KeypointIndex::RightElbow, KeypointIndex::RightWrist),
    // 胴体
    (KeypointIndex::LeftShoulder, KeypointIndex::LeftHip),
    (KeypointIndex::RightShoulder, KeypointIndex::RightHip),
    (KeypointIndex::LeftHip, KeypointIndex::RightHip),
    // 下半身
    (KeypointIndex::LeftHip, KeypointIndex::LeftKnee),
    (KeypointIndex::LeftKnee, KeypointIndex::LeftAnkle),
    (KeypointIndex::RightHip, KeypointIndex::RightKnee),
    (KeypointIndex::RightKnee, KeypointIndex::RightAnkle),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_part_is_connected() {
        for part in KeypointIndex::ALL {
            assert!(
                SKELETON_CONNECTIONS.iter().any(|&(a, b)| a == part || b == part),
                "{} has no bone",
                part.name()
            );
        }
    }
}
