//! Dry-run specs
//!
//! Verify `--dry-run` (and `dry_run = true` in config) leave every file in
//! place while still walking the review workflow.

use crate::prelude::*;

#[test]
fn dry_run_flag_leaves_files_on_disk() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("first_copy.bin", "same bytes");
    project.file("second_copy.bin", "same bytes");

    project.dups().args(&["--dry-run"]).stdin("1\n").passes();

    assert!(project.path().join("first_copy.bin").exists());
    assert!(project.path().join("second_copy.bin").exists());
}

#[test]
fn dry_run_config_key_has_same_effect_as_flag() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
dry_run = true
"#,
    );
    project.file("left.bin", "identical payload");
    project.file("right.bin", "identical payload");

    project.dups().stdin("2\n").passes();

    assert!(project.path().join("left.bin").exists());
    assert!(project.path().join("right.bin").exists());
}

#[test]
fn no_backup_directory_created_under_dry_run() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
dry_run = true
"#,
    );
    project.file("x.bin", "payload");
    project.file("y.bin", "payload");

    project.dups().stdin("1\n").passes();

    assert!(!project.data_dir().join("backup").exists());
}
