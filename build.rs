use std::process::Command;

/// `<パッケージ版>+<git describe>`、git が無ければパッケージ版のみ
fn build_version() -> String {
    let package = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    let describe = Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty());

    match describe {
        Some(rev) => format!("{}+{}", package, rev),
        None => package,
    }
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rustc-env=PEER_VISION_VERSION={}", build_version());
}
