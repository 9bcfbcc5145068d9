//! Duplicate scan and report specs
//!
//! Verify `dups` discovers duplicate files across scan directories and
//! writes the tree dump and duplicate-group report.

use crate::prelude::*;

#[test]
fn duplicate_files_are_grouped_and_reported() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("keep/original.txt", "same content");
    project.file("junk/copy.txt", "same content");
    project.file("unique.txt", "nothing else matches this");

    project.dups().passes();

    let report = std::fs::read_to_string(project.data_dir().join("duplicates.txt")).expect("duplicates.txt written");
    assert!(report.contains("original.txt"));
    assert!(report.contains("copy.txt"));
    assert!(!report.contains("unique.txt"));

    let tree = std::fs::read_to_string(project.data_dir().join("all.txt")).expect("all.txt written");
    assert!(tree.contains("unique.txt"));
}

#[test]
fn scan_dir_flag_extends_configured_directories() {
    let project = Project::empty();
    project.config("min_file_size_bytes = 0\n");
    project.file("a/one.txt", "duplicate payload");
    project.file("b/two.txt", "duplicate payload");

    project.dups().args(&["--scan-dir", "a", "--scan-dir", "b"]).passes();

    let report = std::fs::read_to_string(project.data_dir().join("duplicates.txt")).unwrap();
    assert!(report.contains("one.txt"));
    assert!(report.contains("two.txt"));
}

#[test]
fn exclude_pattern_skips_matching_paths() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
exclusion_patterns = ["junk"]
"#,
    );
    project.file("keep/original.txt", "same content");
    project.file("junk/copy.txt", "same content");

    project.dups().passes();

    let report = std::fs::read_to_string(project.data_dir().join("duplicates.txt")).unwrap();
    assert!(report.trim().is_empty(), "expected no groups, got:\n{report}");
}

#[test]
fn min_size_drops_small_files_from_duplicate_groups() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 1024
"#,
    );
    project.file("a.txt", "tiny");
    project.file("b.txt", "tiny");

    project.dups().passes();

    let report = std::fs::read_to_string(project.data_dir().join("duplicates.txt")).unwrap();
    assert!(report.trim().is_empty(), "files below min-size should be ignored, got:\n{report}");
}

#[test]
fn dup_files_line_format_matches_group_hash_size_path() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("first.txt", "identical");
    project.file("second.txt", "identical");

    project.dups().passes();

    let report = std::fs::read_to_string(project.data_dir().join("duplicates.txt")).unwrap();
    let line = report.lines().next().expect("at least one duplicate line");
    let fields: Vec<&str> = line.split('|').collect();
    assert_eq!(fields.len(), 4, "expected group_id|sha256|size|path, got: {line}");
    assert_eq!(fields[0], "1");
    assert_eq!(fields[1].len(), 16);
    assert_eq!(fields[2], "identical".len().to_string());
}
