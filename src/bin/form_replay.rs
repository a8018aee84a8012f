//! 姿勢モデル出力のダンプをデコードとフォーム解析に通して再生する
//!
//! 入力ファイル1つにリトルエンディアン `f32` の出力テンソル1つ
//! （8400 x 56 値、フィールド優先）。ファイルごとに JSON を1行出力する。
//!
//! ```bash
//! form_replay --exercise balance-1 dumps/*.bin
//! form_replay --list
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use peer_vision::analyzer::analyze_pose;
use peer_vision::config::Config;
use peer_vision::exercise::{Category, ExerciseRegistry};
use peer_vision::pose::PoseDecoder;

#[derive(Parser, Debug)]
#[command(name = "form_replay", version = peer_vision::VERSION, about = "Replay pose output dumps through form analysis")]
struct Args {
    /// TOML設定（無ければデフォルト）
    #[arg(short, long, value_name = "FILE", default_value = "peer_vision.toml")]
    config: PathBuf,

    /// 解析対象の運動ID（例: balance-1）
    #[arg(short, long)]
    exercise: Option<String>,

    /// 運動カタログを表示して終了
    #[arg(long, default_value_t = false)]
    list: bool,

    /// 出力テンソルのダンプ
    files: Vec<PathBuf>,
}

fn read_tensor(path: &Path) -> Result<Vec<f32>> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if bytes.len() % 4 != 0 {
        bail!("{}: {} bytes is not a whole number of f32 values", path.display(), bytes.len());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn print_catalogue(registry: &ExerciseRegistry) {
    for category in Category::ALL {
        println!("[{}]", category.as_str());
        for rule in registry.list_by_category(category) {
            println!("  {:<12} {} ({} checks)", rule.id, rule.name, rule.checks.len());
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = Config::load_or_default(&args.config)?;
    let registry = config.registry();

    if args.list {
        print_catalogue(&registry);
        return Ok(());
    }

    let Some(exercise) = args.exercise else {
        bail!("--exercise is required unless --list is given");
    };
    let Some(rule) = registry.exercise_rules(&exercise) else {
        bail!("unknown exercise id: {}", exercise);
    };
    info!("form_replay ({}) exercise={} \"{}\"", peer_vision::VERSION, rule.id, rule.name);

    let decoder = PoseDecoder::with_threshold(config.detection.min_pose_confidence);
    let mut poses = 0usize;
    for path in &args.files {
        let tensor = match read_tensor(path) {
            Ok(t) => t,
            Err(e) => {
                warn!("skipping: {:#}", e);
                continue;
            }
        };

        let pose = decoder.decode(&tensor);
        let feedback = pose.as_ref().map(|p| analyze_pose(p, &exercise, &registry));
        if pose.is_some() {
            poses += 1;
        }

        let line = serde_json::json!({
            "file": path.display().to_string(),
            "pose": pose,
            "feedback": feedback,
        });
        println!("{}", serde_json::to_string(&line)?);
    }

    info!("{} files, {} with a pose", args.files.len(), poses);
    Ok(())
}
