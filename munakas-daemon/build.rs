// Build script to capture build metadata and locate the native reader library

use std::env;
use std::process::Command;

fn main() {
    // Capture target triple
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TARGET={}", target);

    // Try to capture git commit hash
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        if output.status.success() {
            let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
            println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit);
        }
    }

    // libmunakas is built outside cargo; only needed with the native bridge
    if env::var_os("CARGO_FEATURE_NATIVE_BRIDGE").is_some() {
        if let Ok(dir) = env::var("MUNAKAS_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
        }
    }

    println!("cargo:rerun-if-env-changed=MUNAKAS_LIB_DIR");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
