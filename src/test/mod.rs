mod context;
mod links;
mod packets;
mod series;
mod timeline;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Write a trace file into a unique temp location for parser-level tests.
pub(crate) fn write_temp_trace(prefix: &str, contents: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "netanim-rs-{prefix}-{}-{nanos}.xml",
        std::process::id()
    ));
    std::fs::write(&path, contents).expect("write temp trace");
    path
}
