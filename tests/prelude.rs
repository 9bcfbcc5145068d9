//! Shared fixtures for the `dups` black-box specs: a scratch scan-root
//! plus an isolated data directory (`DUPS_DATA_DIR`), so a run never
//! touches the operator's real app-data directory or collides with
//! another test's single-instance lock.

use std::path::Path;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::Command;
use tempfile::TempDir;

pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// Polls `check` every 20ms until it returns true or `max_ms` elapses.
pub fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    loop {
        if check() {
            return true;
        }
        if start.elapsed().as_millis() as u64 >= max_ms {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

pub struct Project {
    root: TempDir,
    data_dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            root: TempDir::new().expect("tempdir"),
            data_dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Writes `content` to `relpath` under the scan root, creating parent directories.
    pub fn file(&self, relpath: &str, content: &str) -> &Self {
        let full = self.root.path().join(relpath);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("mkdir fixture parent");
        }
        std::fs::write(&full, content).expect("write fixture file");
        self
    }

    /// Writes `dups.toml` at the scan root, the default `--cfg-file` name.
    pub fn config(&self, toml: &str) -> &Self {
        self.file("dups.toml", toml)
    }

    /// A `dups` invocation scoped to this project: cwd at the scan root,
    /// `DUPS_DATA_DIR` pointed at an isolated data directory.
    pub fn dups(&self) -> CommandBuilder<'_> {
        CommandBuilder::new(self)
    }
}

pub struct CommandBuilder<'a> {
    project: &'a Project,
    cmd: Command,
}

impl<'a> CommandBuilder<'a> {
    fn new(project: &'a Project) -> Self {
        let mut cmd = Command::cargo_bin("dups").expect("dups binary built");
        cmd.current_dir(project.path());
        cmd.env("DUPS_DATA_DIR", project.data_dir());
        cmd.stdin(Stdio::null());
        Self { project, cmd }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Feeds `input` as stdin, replacing the default closed stdin — for
    /// driving the interactive review menu.
    pub fn stdin(mut self, input: &str) -> Self {
        self.cmd.write_stdin(input.as_bytes());
        self
    }

    pub fn passes(mut self) -> Assertion {
        let output = self.cmd.output().expect("spawn dups");
        assert!(
            output.status.success(),
            "expected success in {}, got {:?}\nstdout: {}\nstderr: {}",
            self.project.path().display(),
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Assertion { output }
    }

    pub fn fails(mut self) -> Assertion {
        let output = self.cmd.output().expect("spawn dups");
        assert!(
            !output.status.success(),
            "expected failure in {}, got success\nstdout: {}",
            self.project.path().display(),
            String::from_utf8_lossy(&output.stdout),
        );
        Assertion { output }
    }

    pub fn exit_code(mut self, code: i32) -> Assertion {
        let output = self.cmd.output().expect("spawn dups");
        assert_eq!(output.status.code(), Some(code), "unexpected exit code in {}", self.project.path().display());
        Assertion { output }
    }
}

pub struct Assertion {
    output: Output,
}

impl Assertion {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout missing `{needle}`:\n{}", self.stdout());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr missing `{needle}`:\n{}", self.stderr());
        self
    }
}
