//! File filtering for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Decides which walked files become records
#[derive(Debug, Clone, Default)]
pub struct SuffixFilter {
    /// Lower-cased extensions to accept; `None` accepts everything
    suffixes: Option<HashSet<String>>,
    include_hidden: bool,
}

impl SuffixFilter {
    /// Accept every regular file except hidden ones
    pub fn new() -> Self {
        Self::default()
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Restrict to these extensions. A leading dot and case are ignored.
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.suffixes = Some(
            suffixes
                .into_iter()
                .map(|s| s.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        );
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && is_hidden(path) {
            return false;
        }

        match &self.suffixes {
            None => true,
            Some(accepted) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| accepted.contains(&ext.to_lowercase()))
                .unwrap_or(false),
        }
    }
}

pub(super) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_everything_by_default() {
        let filter = SuffixFilter::new();
        assert!(filter.should_include(Path::new("/work/notes.txt")));
        assert!(filter.should_include(Path::new("/work/no_extension")));
    }

    #[test]
    fn excludes_hidden_by_default() {
        let filter = SuffixFilter::new();
        assert!(!filter.should_include(Path::new("/work/.DS_Store")));
        assert!(SuffixFilter::new()
            .with_hidden(true)
            .should_include(Path::new("/work/.DS_Store")));
    }

    #[test]
    fn suffix_restriction_ignores_case_and_dot() {
        let filter = SuffixFilter::new().with_suffixes([".JPG", "mov"]);
        assert!(filter.should_include(Path::new("/work/a.jpg")));
        assert!(filter.should_include(Path::new("/work/b.MOV")));
        assert!(!filter.should_include(Path::new("/work/c.png")));
        assert!(!filter.should_include(Path::new("/work/no_extension")));
    }
}
