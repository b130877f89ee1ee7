//! Executes filesystem commands.

use super::FsCommand;
use crate::error::ExecutionError;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::info;

/// Performs commands one at a time
pub trait FilesystemExecutor: Send + Sync {
    fn execute(&self, command: &FsCommand) -> Result<(), ExecutionError>;
}

/// Executor backed by `std::fs`
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFsExecutor;

impl StdFsExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FilesystemExecutor for StdFsExecutor {
    fn execute(&self, command: &FsCommand) -> Result<(), ExecutionError> {
        info!("Executing {}", command);
        match command {
            FsCommand::SetModified { path, mtime } => set_modified(path, secs_to_system_time(*mtime)),
            FsCommand::Move { from, to } => {
                if fs::symlink_metadata(to).is_ok() {
                    return Err(ExecutionError::TargetExists { target: to.clone() });
                }
                fs::rename(from, to).map_err(io_error("move", from))
            }
            FsCommand::Remove { path } => fs::remove_file(path).map_err(io_error("remove", path)),
            FsCommand::CopyOverwrite { from, to } => copy_preserving(from, to),
        }
    }
}

fn copy_preserving(from: &Path, to: &Path) -> Result<(), ExecutionError> {
    let source = fs::metadata(from).map_err(io_error("read", from))?;
    fs::copy(from, to).map_err(io_error("copy", to))?;

    // an incomplete copy must not be followed by removing the replaced file
    let copied = fs::metadata(to).map_err(io_error("read", to))?;
    if copied.len() != source.len() {
        return Err(ExecutionError::Io {
            op: "verify copy",
            path: to.to_path_buf(),
            source: io::Error::other(format!(
                "source {} bytes, copy {} bytes",
                source.len(),
                copied.len()
            )),
        });
    }

    let modified = source.modified().map_err(io_error("read", from))?;
    set_modified(to, modified)
}

fn set_modified(path: &Path, time: SystemTime) -> Result<(), ExecutionError> {
    // the owner may set times through a read-only handle, Windows needs write access
    let file = if cfg!(unix) {
        File::open(path)
    } else {
        File::options().write(true).open(path)
    };
    file.and_then(|file| file.set_modified(time))
        .map_err(io_error("set modification time of", path))
}

fn secs_to_system_time(secs: i64) -> SystemTime {
    if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
    }
}

fn io_error(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> ExecutionError {
    let path: PathBuf = path.to_path_buf();
    move |source| ExecutionError::Io { op, path, source }
}
