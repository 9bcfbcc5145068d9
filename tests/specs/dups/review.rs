//! Interactive review specs
//!
//! Verify the keep/delete menu, auto-resolution by keep-path, and the
//! ignored-group list persisting across runs.

use crate::prelude::*;

#[test]
fn ignoring_a_group_persists_across_runs() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("weird_a.bin", "dup payload");
    project.file("weird_b.bin", "dup payload");

    // First run: pick "i" to ignore the only group.
    project.dups().stdin("i\n").passes();

    assert!(std::path::Path::new(&project.path().join("weird_a.bin")).exists());
    assert!(std::path::Path::new(&project.path().join("weird_b.bin")).exists());

    let ignored = std::fs::read_to_string(project.data_dir().join("ignored.txt")).expect("ignored.txt written");
    assert!(ignored.contains("weird_a.bin") || ignored.contains("weird_b.bin"));

    // Second run: group is in the ignored list and should not prompt again,
    // so closed stdin (immediate EOF) must still exit cleanly.
    project.dups().passes();
}

#[test]
fn keep_path_flag_auto_resolves_without_prompting() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
dry_run = true
"#,
    );
    project.file("keep_here/weird_a.bin", "dup payload");
    project.file("elsewhere/weird_b.bin", "dup payload");

    // Closed stdin: if this group needed the interactive menu the run would
    // just quit without resolving anything. It passing with the file kept
    // confirms --keep-path alone pushed the group through auto-resolution.
    project.dups().args(&["--keep-path", "keep_here"]).passes();

    assert!(project.path().join("keep_here/weird_a.bin").exists());
}

#[test]
fn keep_from_submenu_add_and_back_out_then_resolve() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("alpha_name.bin", "dup payload");
    project.file("bravo_name.bin", "dup payload");

    // k -> edit keep-from list, a -> add, 1 -> the single candidate dir,
    // b -> back out of the add sub-menu, b -> back out of the edit menu,
    // 2 -> resolve the group by keeping entry 2.
    project.dups().stdin("k\na\n1\nb\nb\n2\n").passes();

    let alpha_gone = !project.path().join("alpha_name.bin").exists();
    let bravo_gone = !project.path().join("bravo_name.bin").exists();
    assert!(alpha_gone ^ bravo_gone, "expected exactly one file deleted");
}

#[test]
fn numeric_choice_keeps_selected_entry_and_deletes_rest() {
    let project = Project::empty();
    project.config(
        r#"
scan_directories = ["."]
min_file_size_bytes = 0
"#,
    );
    project.file("alpha_name.bin", "dup payload");
    project.file("bravo_name.bin", "dup payload");

    project.dups().stdin("2\n").passes();

    let alpha_gone = !project.path().join("alpha_name.bin").exists();
    let bravo_gone = !project.path().join("bravo_name.bin").exists();
    // exactly one of the two survives; which one depends on the sort order
    // `DeletionWorkflow` presents them in, so assert the shape, not the name.
    assert!(alpha_gone ^ bravo_gone, "expected exactly one file deleted");
}
