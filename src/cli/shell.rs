//! Shell rendering of filesystem commands for `--inspect`.

use duplicate_file_matcher::core::ops::{CommandEmitter, FsCommand};
use std::path::Path;

/// Collects one shell line per command
#[derive(Debug, Default)]
pub struct ShellEmitter {
    pub lines: Vec<String>,
}

impl CommandEmitter for ShellEmitter {
    fn emit(&mut self, command: &FsCommand) {
        self.lines.push(shell_line(command));
    }
}

/// The command as a POSIX shell line
pub fn shell_line(command: &FsCommand) -> String {
    match command {
        FsCommand::SetModified { path, mtime } => format!("touch -d @{} {}", mtime, quote(path)),
        FsCommand::Move { from, to } => format!("mv -n {} {}", quote(from), quote(to)),
        FsCommand::Remove { path } => format!("rm {}", quote(path)),
        FsCommand::CopyOverwrite { from, to } => {
            format!("cp --preserve {} {}", quote(from), quote(to))
        }
    }
}

/// Single-quote a path unless it only holds safe characters
fn quote(path: &Path) -> String {
    let text = path.to_string_lossy();
    let safe = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+,:@%".contains(c));
    if safe {
        text.into_owned()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}
