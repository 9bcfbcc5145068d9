//! Config loading and CLI-merge specs
//!
//! Verify a missing or malformed config file, custom `--cfg-file` paths,
//! and CLI flags overriding/extending the loaded config.

use crate::prelude::*;

#[test]
fn missing_config_file_is_not_an_error() {
    let project = Project::empty();

    project.dups().passes();

    assert!(project.data_dir().join("duplicates.txt").exists());
    assert!(project.data_dir().join("all.txt").exists());
}

#[test]
fn malformed_config_file_exits_with_usage_code() {
    let project = Project::empty();
    project.config("scan_directories = [[[\n");

    project.dups().exit_code(2).stderr_has("malformed config");
}

#[test]
fn custom_cfg_file_path_is_honored() {
    let project = Project::empty();
    project.file(
        "alt.toml",
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("a.txt", "same bytes");
    project.file("b.txt", "same bytes");

    project.dups().args(&["--cfg-file", "alt.toml"]).passes();

    let report = std::fs::read_to_string(project.data_dir().join("duplicates.txt")).unwrap();
    assert!(report.contains("a.txt"));
    assert!(report.contains("b.txt"));
}

#[test]
fn min_size_flag_overrides_config_value() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 1024
"#,
    );
    project.file("a.txt", "tiny");
    project.file("b.txt", "tiny");

    project.dups().args(&["--min-size", "0"]).passes();

    let report = std::fs::read_to_string(project.data_dir().join("duplicates.txt")).unwrap();
    assert!(report.contains("a.txt"));
    assert!(report.contains("b.txt"));
}

#[test]
fn dup_files_flag_overrides_report_destination() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("a.txt", "same");
    project.file("b.txt", "same");

    project.dups().args(&["--dup-files", "custom-dups.txt"]).passes();

    assert!(project.data_dir().join("custom-dups.txt").exists());
    assert!(!project.data_dir().join("duplicates.txt").exists());
}
