// build.rs

use std::env;

/// Lets release builds stamp their own version via `BOTLINK_VERSION`.
fn main() {
    let version = env::var("BOTLINK_VERSION")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "dev".to_string()));

    println!("cargo:rustc-env=BOTLINK_BUILD_VERSION={version}");
    println!("cargo:rerun-if-env-changed=BOTLINK_VERSION");
}
