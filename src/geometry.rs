//! 正規化キーポイント上の平面幾何
//!
//! 画像座標系: x は右、y は下向きに増える（「上」は y が小さい）。
//! 全関数が全域で、退化した入力には NaN ではなく固定値を返す。

use nalgebra::{Point2, Vector2};

use crate::pose::Keypoint;

fn point(kp: &Keypoint) -> Point2<f32> {
    Point2::new(kp.x, kp.y)
}

/// Angle at `vertex` between `vertex→a` and `vertex→c`, in degrees [0, 180].
///
/// どちらかの腕の長さが0なら0を返す
pub fn angle_at_vertex(a: &Keypoint, vertex: &Keypoint, c: &Keypoint) -> f32 {
    let v1: Vector2<f32> = point(a) - point(vertex);
    let v2: Vector2<f32> = point(c) - point(vertex);

    let mag1 = v1.norm();
    let mag2 = v2.norm();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// 線分 p-q の垂直からの傾き（度、[0, 90]）
/// 0 = 完全に垂直、dy == 0（水平）なら 90
pub fn deviation_from_vertical(p: &Keypoint, q: &Keypoint) -> f32 {
    let dx = (q.x - p.x).abs();
    let dy = (q.y - p.y).abs();
    if dy == 0.0 {
        return 90.0;
    }
    (dx / dy).atan().to_degrees()
}

/// 線分 p-q の水平からの傾き（度、[0, 90]）
/// 0 = 完全に水平、dx == 0（垂直）なら 90
pub fn deviation_from_horizontal(p: &Keypoint, q: &Keypoint) -> f32 {
    let dx = (q.x - p.x).abs();
    let dy = (q.y - p.y).abs();
    if dx == 0.0 {
        return 90.0;
    }
    (dy / dx).atan().to_degrees()
}

/// 正規化座標でのユークリッド距離
pub fn distance(p: &Keypoint, q: &Keypoint) -> f32 {
    nalgebra::distance(&point(p), &point(q))
}

pub fn midpoint(p: &Keypoint, q: &Keypoint) -> (f32, f32) {
    let m = nalgebra::center(&point(p), &point(q));
    (m.x, m.y)
}

/// 画面上で `a` が `b` より厳密に上。同じ高さはどちらでもない
pub fn is_above(a: &Keypoint, b: &Keypoint) -> bool {
    a.y < b.y
}

/// 画面上で `a` が `b` より厳密に下
pub fn is_below(a: &Keypoint, b: &Keypoint) -> bool {
    a.y > b.y
}

pub fn is_left_of(a: &Keypoint, b: &Keypoint) -> bool {
    a.x < b.x
}

pub fn is_right_of(a: &Keypoint, b: &Keypoint) -> bool {
    a.x > b.x
}

pub fn is_confident(kp: &Keypoint, min_confidence: f32) -> bool {
    kp.is_valid(min_confidence)
}
