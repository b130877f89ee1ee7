//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, SuffixFilter};
use super::{FileRecord, FileScanner, MediaKind, ScanResult};
use crate::core::metadata;
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Only scan files with these extensions (None = all files)
    pub suffixes: Option<Vec<String>>,
    /// Read the EXIF capture time of images
    pub read_exif: bool,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: SuffixFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = SuffixFilter::new().with_hidden(config.include_hidden);

        if let Some(ref suffixes) = config.suffixes {
            filter = filter.with_suffixes(suffixes);
        }

        Self { config, filter }
    }

    fn walk(&self, root: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        let root = std::path::absolute(root).map_err(|e| ScanError::ReadDirectory {
            path: root.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        let mut errors = Vec::new();

        let mut walker = WalkDir::new(&root).follow_links(false).sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(|entry| include_hidden || entry.depth() == 0 || !is_hidden(entry.path()));

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let denied = e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied);

                    // the root itself must be readable
                    if e.depth() == 0 {
                        return Err(if denied {
                            ScanError::PermissionDenied { path: root.clone() }
                        } else {
                            ScanError::ReadDirectory {
                                path: root.clone(),
                                source: std::io::Error::other(e.to_string()),
                            }
                        });
                    }

                    let error = if denied {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };
                    warn!("{}", error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_symlink() {
                debug!("Skipping symlink {}", entry.path().display());
                continue;
            }
            if !file_type.is_file() || !self.filter.should_include(entry.path()) {
                continue;
            }

            match FileRecord::from_path(entry.path()) {
                Ok(record) => {
                    let record = if self.config.read_exif && record.kind() == MediaKind::Image {
                        let exif_time = metadata::capture_time(&record.path);
                        record.with_exif_time(exif_time)
                    } else {
                        record
                    };
                    files.push(record);
                }
                Err(error) => {
                    warn!("{}", error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path: entry.path().to_path_buf(),
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        Ok(ScanResult { files, errors })
    }
}

impl FileScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &crate::events::null_sender())
    }

    fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let result = self.walk(root, events)?;
        debug!(
            "Scanned {} files under {} ({} errors)",
            result.files.len(),
            root.display(),
            result.errors.len()
        );

        events.send(Event::Scan(ScanEvent::Completed {
            root: root.to_path_buf(),
            total_files: result.files.len(),
        }));

        Ok(result)
    }
}
