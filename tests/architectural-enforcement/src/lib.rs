//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code; the engine works on deadlines
//! - The engine crate stays free of terminal UI dependencies
//!
//! The helpers here walk the workspace sources for the tests in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root (two levels above this crate)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    if !root.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Production lines of a source file as `(line number, code)`.
///
/// Stops at the first `#[cfg(test)]` and drops `//` comments.
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .collect()
}

/// Lines in production code under `dirs` that contain any of `patterns`
pub fn find_violations(dirs: &[&str], patterns: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for dir in dirs {
        for path in rust_files(dir) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            for (line_number, code) in production_lines(&content) {
                if patterns.iter().any(|p| code.contains(p)) {
                    violations.push(format!(
                        "{}:{} - {}",
                        path.display(),
                        line_number,
                        code.trim()
                    ));
                }
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let src = "fn a() {} // sleep(\n#[cfg(test)]\nfn b() { sleep(1) }\n";
        let lines = production_lines(src);
        assert_eq!(lines, vec![(1, "fn a() {} ")]);
    }
}
