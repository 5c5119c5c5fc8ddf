//! Hygiene: coding standards checked at test time.
//!
//! Scans the production sources under `src/` for antipatterns. Each pattern
//! has a budget of zero; test files (`*_test.rs`) are exempt.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        if !path.extension().is_some_and(|e| e == "rs") {
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn check_budget(pattern: &str, max: usize) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found under src/");
    let found = hits(&files, pattern);
    let count: usize = found.iter().map(|(_, c)| c).sum();
    let listing = found.iter().map(|(path, c)| format!("  {path}: {c}")).collect::<Vec<_>>().join("\n");
    assert!(count <= max, "`{pattern}` budget exceeded: found {count}, max {max}.\n{listing}");
}

// Panics.

#[test]
fn unwrap_budget() {
    check_budget(".unwrap()", 0);
}

#[test]
fn expect_budget() {
    check_budget(".expect(", 0);
}

#[test]
fn panic_budget() {
    check_budget("panic!(", 0);
}

#[test]
fn unreachable_budget() {
    check_budget("unreachable!(", 0);
}

#[test]
fn todo_budget() {
    check_budget("todo!(", 0);
}

#[test]
fn unimplemented_budget() {
    check_budget("unimplemented!(", 0);
}

// Silent loss.

#[test]
fn silent_discard_budget() {
    check_budget("let _ =", 0);
}

#[test]
fn dot_ok_budget() {
    check_budget(".ok()", 0);
}

// Structure.

#[test]
fn allow_dead_code_budget() {
    check_budget("#[allow(dead_code)]", 0);
}
