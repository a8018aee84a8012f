use anyhow::Result;
use std::time::Instant;

use peer_vision::analyzer::analyze_pose;
use peer_vision::exercise::builtin_registry;
use peer_vision::pose::{PoseDecoder, NUM_DETECTIONS, VALUES_PER_DETECTION};

/// 信頼度が単調増加する合成出力（最後の検出が最大になる）
fn synthetic_output() -> Vec<f32> {
    let n = NUM_DETECTIONS;
    let mut data = vec![0.0f32; n * VALUES_PER_DETECTION];
    for i in 0..n {
        data[4 * n + i] = 0.3 + 0.6 * i as f32 / n as f32;
    }
    for k in 0..17 {
        data[(5 + 3 * k) * n + n - 1] = 0.5;
        data[(6 + 3 * k) * n + n - 1] = 0.1 + 0.05 * k as f32;
        data[(7 + 3 * k) * n + n - 1] = 0.9;
    }
    data
}

fn main() -> Result<()> {
    println!("bench_decode ({})", peer_vision::VERSION);

    let data = synthetic_output();
    let decoder = PoseDecoder::new();
    let registry = builtin_registry();

    // ウォームアップ
    for _ in 0..10 {
        let _ = decoder.decode(&data);
    }

    let iterations = 1000;
    let start = Instant::now();
    let mut decoded = 0;
    for _ in 0..iterations {
        if decoder.decode(&data).is_some() {
            decoded += 1;
        }
    }
    let elapsed = start.elapsed();
    let avg_us = elapsed.as_micros() as f64 / iterations as f64;
    println!("Decode: {:.1}us/frame ({} / {} decoded)", avg_us, decoded, iterations);

    let Some(pose) = decoder.decode(&data) else {
        anyhow::bail!("synthetic output did not decode");
    };
    let start = Instant::now();
    for _ in 0..iterations {
        for id in registry.list_exercise_ids() {
            let _ = analyze_pose(&pose, id, registry);
        }
    }
    let per_rule_us = start.elapsed().as_micros() as f64 / (iterations * registry.len()) as f64;
    println!("Analyze: {:.2}us/exercise ({} exercises)", per_rule_us, registry.len());

    Ok(())
}
