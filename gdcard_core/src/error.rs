// SPDX-License-Identifier: GPL-3.0
// error.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{
    io,
    path::PathBuf,
};

use thiserror::Error;

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, BuildError>;

/// This enum represents everything that can stop a card build. Precondition
/// variants are raised before anything in the target tree is touched.
#[derive(Debug, Error)]
pub enum BuildError {

    // Precondition errors.
    #[error("game list file not found: {0}")]
    GameListMissing(PathBuf),

    #[error("source directory not found: {0}")]
    SourceMissing(PathBuf),

    #[error("target directory not found: {0}")]
    TargetMissing(PathBuf),

    #[error("required tool '{0}' is not installed or not on PATH")]
    ToolMissing(String),

    #[error("bundled resource not found: {0}")]
    ResourceMissing(PathBuf),

    #[error("a previous run was interrupted, clean up these directories first: {}", .0.join(", "))]
    LeftoverSession(Vec<String>),

    // Fatal mid-run errors.
    #[error("all 99 slots are in use, cannot place '{0}'")]
    SlotsExhausted(String),

    #[error("'{command}' failed with {status}")]
    ToolFailed { command: String, status: String },

    #[error("extraction of {0} failed, the target may be out of space")]
    ExtractionFailed(PathBuf),

    #[error("could not move {from} to {to}, the target may be out of space: {source}")]
    RelocationFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("disc header in {path} is {length} bytes, expected at least 256")]
    HeaderTooShort { path: PathBuf, length: usize },

    #[error("no disc header source found in {0}")]
    HeaderSourceMissing(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {

    /// Returns the process exit code the command line front end should use.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::GameListMissing(_) => 2,
            BuildError::SourceMissing(_) => 3,
            BuildError::TargetMissing(_) => 4,
            BuildError::ToolMissing(_) => 5,
            BuildError::LeftoverSession(_) => 6,
            _ => 7,
        }
    }

    /// Builds an `Io` variant from an error and the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Extension trait to attach a path to `std::io` results, so every filesystem
/// failure names the file it happened on.
pub trait IoContext<T> {

    /// Converts the error side into `BuildError::Io` for the given path.
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {

    fn at_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| BuildError::io(path, source))
    }
}
