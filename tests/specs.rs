//! Workspace-level black-box specs, driven through the `dups` binary with
//! `assert_cmd`.

mod prelude;

#[path = "specs/dups/config.rs"]
mod dups_config;
#[path = "specs/dups/dry_run.rs"]
mod dups_dry_run;
#[path = "specs/dups/review.rs"]
mod dups_review;
#[path = "specs/dups/scan.rs"]
mod dups_scan;
