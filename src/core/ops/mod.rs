//! # Ops Module
//!
//! Filesystem commands derived from decisions.
//!
//! ## Flow
//! An `Action` expands into one or more `FsCommand` tuples. Inspect mode
//! hands them to a `CommandEmitter` (the CLI turns them into shell text);
//! Execute mode runs them through a `FilesystemExecutor`. Both see the same
//! commands in the same order.

mod executor;

pub use executor::{FilesystemExecutor, StdFsExecutor};

use crate::core::decision::Action;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One primitive filesystem operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsCommand {
    /// Set the modification time, in Unix seconds
    SetModified { path: PathBuf, mtime: i64 },
    /// Rename without overwriting an existing target
    Move { from: PathBuf, to: PathBuf },
    Remove { path: PathBuf },
    /// Copy over `to`, keeping the source modification time
    CopyOverwrite { from: PathBuf, to: PathBuf },
}

impl FsCommand {
    /// Short verb for logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            FsCommand::SetModified { .. } => "set-modified",
            FsCommand::Move { .. } => "move",
            FsCommand::Remove { .. } => "remove",
            FsCommand::CopyOverwrite { .. } => "copy-overwrite",
        }
    }

    /// Path the command changes
    pub fn target(&self) -> &Path {
        match self {
            FsCommand::SetModified { path, .. } | FsCommand::Remove { path } => path,
            FsCommand::Move { from, .. } => from,
            FsCommand::CopyOverwrite { to, .. } => to,
        }
    }

    /// Expand a decided action into the commands that perform it
    pub fn from_action(action: &Action) -> Vec<FsCommand> {
        match action {
            Action::Redate { path, to, .. } => vec![FsCommand::SetModified {
                path: path.clone(),
                mtime: *to,
            }],
            Action::Rename { path, target } => vec![FsCommand::Move {
                from: path.clone(),
                to: target.clone(),
            }],
            Action::Delete { path } => vec![FsCommand::Remove { path: path.clone() }],
            Action::ReplaceWithOriginal { target, source } => {
                if target.file_name() == source.file_name() {
                    return vec![FsCommand::CopyOverwrite {
                        from: source.clone(),
                        to: target.clone(),
                    }];
                }
                // the replacement takes the source's name
                let renamed = match (target.parent(), source.file_name()) {
                    (Some(dir), Some(name)) => dir.join(name),
                    _ => target.clone(),
                };
                vec![
                    FsCommand::CopyOverwrite {
                        from: source.clone(),
                        to: renamed,
                    },
                    FsCommand::Remove {
                        path: target.clone(),
                    },
                ]
            }
        }
    }

    /// Expand a whole action list, preserving order
    pub fn expand(actions: &[Action]) -> Vec<FsCommand> {
        actions.iter().flat_map(FsCommand::from_action).collect()
    }
}

impl fmt::Display for FsCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsCommand::SetModified { path, mtime } => {
                write!(f, "{} {} @{}", self.kind(), path.display(), mtime)
            }
            FsCommand::Move { from, to } | FsCommand::CopyOverwrite { from, to } => {
                write!(f, "{} {} {}", self.kind(), from.display(), to.display())
            }
            FsCommand::Remove { path } => write!(f, "{} {}", self.kind(), path.display()),
        }
    }
}

/// Receives the commands Execute mode would run (Inspect mode)
pub trait CommandEmitter {
    fn emit(&mut self, command: &FsCommand);
}

/// Keeps emitted commands in order
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    pub commands: Vec<FsCommand>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommandEmitter for CollectingEmitter {
    fn emit(&mut self, command: &FsCommand) {
        self.commands.push(command.clone());
    }
}

/// Drops every command
#[derive(Debug, Default)]
pub struct NullEmitter;

impl CommandEmitter for NullEmitter {
    fn emit(&mut self, _command: &FsCommand) {}
}
