//! The list of files waiting to be converted.
//!
//! Mirrors the drop list a user builds before starting a batch: only existing
//! regular files are accepted, order is kept, and entries can be removed by
//! position.

use crate::error::CoreResult;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a path was not added to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Missing, a directory, or otherwise not a regular file.
    NotAFile,
    Duplicate,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAFile => f.write_str("not a file"),
            RejectReason::Duplicate => f.write_str("already queued"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub path: PathBuf,
    pub reason: RejectReason,
}

/// Result of [`FileQueue::add_paths`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOutcome {
    pub added: usize,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, Default)]
pub struct FileQueue {
    paths: Vec<PathBuf>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every path that is an existing regular file and not already
    /// queued. Paths are stored absolute, so `a.mp4` and `./a.mp4` are the
    /// same entry.
    pub fn add_paths<I, P>(&mut self, paths: I) -> AddOutcome
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut outcome = AddOutcome::default();
        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                outcome.rejected.push(Rejection {
                    path: path.to_path_buf(),
                    reason: RejectReason::NotAFile,
                });
                continue;
            }

            let absolute = absolute_path(path);
            if self.contains(&absolute) {
                outcome.rejected.push(Rejection {
                    path: path.to_path_buf(),
                    reason: RejectReason::Duplicate,
                });
            } else {
                self.paths.push(absolute);
                outcome.added += 1;
            }
        }
        outcome
    }

    /// Adds the regular files directly inside `dir`, sorted by name.
    /// Subdirectories are not searched.
    pub fn add_directory(&mut self, dir: &Path) -> CoreResult<AddOutcome> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                path.is_file().then_some(path)
            })
            .collect();
        files.sort();
        Ok(self.add_paths(files))
    }

    /// Removes the entries at `indices`. Out-of-range and repeated indices are
    /// ignored. Returns the number of entries removed.
    pub fn remove_indices(&mut self, indices: &[usize]) -> usize {
        let doomed: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.paths.len())
            .collect();
        // Highest first so earlier positions stay valid.
        for &index in doomed.iter().rev() {
            self.paths.remove(index);
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|queued| queued == path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

/// `path` made absolute against the working directory, with `.` components
/// removed. Symlinks are not resolved. Falls back to `path` itself if the
/// working directory cannot be read.
pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
