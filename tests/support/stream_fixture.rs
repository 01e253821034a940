//! Test fixture utilities: load SSE fixtures as byte chunks.

use std::io;
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Raw fixture text with normalized line endings.
pub fn load_sse_fixture(name: &str) -> io::Result<String> {
    let raw = std::fs::read_to_string(fixture_path(name))?;
    Ok(raw.replace("\r\n", "\n"))
}

/// Split a fixture into one chunk per SSE event, the way a server flushes them.
pub fn load_sse_fixture_as_chunks(name: &str) -> io::Result<Vec<Vec<u8>>> {
    let normalized = load_sse_fixture(name)?;
    let mut out = Vec::new();
    for chunk in normalized.split("\n\n") {
        let s = chunk.trim_end_matches('\n');
        if s.is_empty() {
            continue;
        }
        let mut owned = String::from(s);
        owned.push_str("\n\n");
        out.push(owned.into_bytes());
    }
    Ok(out)
}
