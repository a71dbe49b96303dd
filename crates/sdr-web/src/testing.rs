//! Test fixtures shared by the sdr crates.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fresh directory under the system temp dir, unique per process and call.
pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{}-{}-{}", prefix, std::process::id(), ts));
    std::fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}
