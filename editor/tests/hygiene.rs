//! Hygiene: source-level standards for the editor crate, checked at test time.
//!
//! Each pattern has a budget (zero everywhere). Production code under `src/`
//! is scanned; `*_test.rs` files are exempt. The budget never grows: to add an
//! occurrence, remove another first.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding test modules.
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
        let path_str = path.to_string_lossy().to_string();
        if !path_str.ends_with(".rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Per-file count of lines containing `pattern`, skipping `//` comment lines.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//") && line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn check_budget(pattern: &str, max: usize, why: &str) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found; run from the crate root");
    let found = hits(&files, pattern);
    let count: usize = found.iter().map(|(_, c)| c).sum();
    let listing = found.iter().map(|(p, c)| format!("  {p}: {c}")).collect::<Vec<_>>().join("\n");
    assert!(count <= max, "`{pattern}` budget exceeded ({why}): found {count}, max {max}.\n{listing}");
}

macro_rules! budget {
    ($name:ident, $pattern:expr, $max:expr, $why:expr) => {
        #[test]
        fn $name() {
            check_budget($pattern, $max, $why);
        }
    };
}

// Panics: a crashed editor loses the user's masks.
budget!(unwrap_budget, ".unwrap()", 0, "panics");
budget!(expect_budget, ".expect(", 0, "panics");
budget!(panic_budget, "panic!(", 0, "panics");
budget!(unreachable_budget, "unreachable!(", 0, "panics");
budget!(todo_budget, "todo!(", 0, "stubs");
budget!(unimplemented_budget, "unimplemented!(", 0, "stubs");

// Silent loss: errors discarded without inspection.
budget!(silent_discard_budget, "let _ =", 0, "discarded result");
budget!(dot_ok_budget, ".ok()", 0, "discarded error");

// Output goes through tracing, never straight to the terminal.
budget!(println_budget, "println!(", 0, "use tracing");
budget!(eprintln_budget, "eprintln!(", 0, "use tracing");
budget!(dbg_budget, "dbg!(", 0, "debug leftover");

// Structure.
budget!(allow_dead_code_budget, "#[allow(dead_code)]", 0, "dead code");
