// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk repository: one JSON line per observation under
//! `<reports_dir>/<username>/<year>/raw/raw-<DOY>-<MMDD>.dat`, with snapshot
//! images written alongside under `<reports_dir>/<username>/<year>/snapshots/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Utc};

use crate::error::RepoError;
use crate::repository::Repository;
use crate::types::{Entry, Filter};

#[derive(Debug, Clone)]
pub struct FileSystemRepository {
    reports_dir: PathBuf,
}

impl FileSystemRepository {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    fn user_dir(&self, username: &str) -> PathBuf {
        self.reports_dir.join(username)
    }

    fn year_dirs(&self, username: &str, year: i32) -> (PathBuf, PathBuf) {
        let root = self.user_dir(username).join(year.to_string());
        (root.join("snapshots"), root.join("raw"))
    }
}

impl Repository for FileSystemRepository {
    fn add(&mut self, entry: &Entry) -> Result<(), RepoError> {
        let when = DateTime::<Utc>::from_timestamp_millis(entry.entry.ts.when)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
        let (snapshots_dir, raw_dir) = self.year_dirs(&entry.username, when.year());
        fs::create_dir_all(&snapshots_dir).map_err(|source| RepoError::Write {
            path: snapshots_dir.clone(),
            source,
        })?;
        fs::create_dir_all(&raw_dir).map_err(|source| RepoError::Write {
            path: raw_dir.clone(),
            source,
        })?;

        let mut stored = entry.entry.clone();
        if let Some(name) = stored.wnd.img.name.clone() {
            if let Some(bytes) = stored.wnd.img.decode_bytes()? {
                let image_path = snapshots_dir.join(&name);
                fs::write(&image_path, &bytes).map_err(|source| RepoError::Write {
                    path: image_path,
                    source,
                })?;
            }
        }
        stored.wnd.img.bytes = None;
        stored.wnd.img.encoded = false;

        let raw_file = raw_dir.join(raw_filename(when));
        let mut line = serde_json::to_string(&stored)?;
        line.push('\n');
        append(&raw_file, &line)?;

        Ok(())
    }

    fn query_users(&self) -> Vec<String> {
        let Ok(dir) = fs::read_dir(&self.reports_dir) else {
            return Vec::new();
        };
        let mut users: Vec<String> = dir
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        users.sort();
        users
    }

    fn query_entries(&self, filter: &Filter) -> Vec<Entry> {
        if filter.from > filter.to {
            return Vec::new();
        }

        let user_dir = self.user_dir(&filter.username);
        let Ok(years) = fs::read_dir(&user_dir) else {
            return Vec::new();
        };

        let from_name = raw_filename(system_time_to_utc(filter.from));
        let to_name = raw_filename(system_time_to_utc(filter.to));

        let mut results = Vec::new();
        for year_entry in years.filter_map(|e| e.ok()) {
            if !year_entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let Some(year) = year_entry
                .file_name()
                .to_str()
                .and_then(|s| s.parse::<i32>().ok())
            else {
                continue;
            };
            let (_snapshots_dir, raw_dir) = self.year_dirs(&filter.username, year);
            scan_raw_dir(&raw_dir, &from_name, &to_name, filter, &mut results);
        }
        results
    }
}

fn scan_raw_dir(
    raw_dir: &Path,
    from_name: &str,
    to_name: &str,
    filter: &Filter,
    results: &mut Vec<Entry>,
) {
    let Ok(files) = fs::read_dir(raw_dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = files.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name < from_name || name > to_name {
            continue;
        }
        read_entries(&path, &filter.username, filter, results);
    }
}

fn read_entries(path: &Path, username: &str, filter: &Filter, results: &mut Vec<Entry>) {
    let Ok(contents) = fs::read_to_string(path) else {
        tracing::warn!(path = %path.display(), "failed to read raw report file");
        return;
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: kpr_wire::Entry = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping malformed report line");
                continue;
            }
        };

        let when = DateTime::<Utc>::from_timestamp_millis(parsed.ts.when)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
        let when_system: SystemTime = when.into();
        if when_system < filter.from || when_system > filter.to {
            continue;
        }

        results.push(Entry {
            username: username.to_string(),
            entry: parsed,
        });
    }
}

fn system_time_to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// `raw-<day-of-year>-<month><day>.dat`, day-of-year zero-based to match the
/// original agent's `tm_yday` convention.
fn raw_filename(when: DateTime<Utc>) -> String {
    format!(
        "raw-{:03}-{:02}{:02}.dat",
        when.ordinal0(),
        when.month(),
        when.day()
    )
}

fn append(path: &Path, line: &str) -> Result<(), RepoError> {
    use std::io::Write;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| RepoError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(line.as_bytes())
        .map_err(|source| RepoError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[path = "fs_repository_tests.rs"]
mod fs_repository_tests;
