//! # Normalize Module
//!
//! Turns a file stem into the key used to pair work files with originals.
//!
//! ## Steps
//! 1. Casefold (`casefold`)
//! 2. Replace spaces (`space2char`)
//! 3. Repeated until nothing changes:
//!    - strip a trailing `(N)` counter (`strip_end_counter`)
//!    - strip the end matched by `strip_suffix`
//!    - originals only: truncate to `work_file_stem_shortened` characters
//!
//! Work files are looked up with [`Normalizer::key`], originals are indexed
//! with [`Normalizer::original_key`]. A Google Photos work stem cut to 47
//! characters thus finds its full-length original, while a work stem longer
//! than the limit only matches an original of exactly that stem. Repeating the
//! stripping steps makes both functions idempotent.
//!
//! The extension is never part of the key.

use crate::core::config::NameRules;
use regex::Regex;

/// Pure, total stem → key function
#[derive(Debug, Clone)]
pub struct Normalizer {
    casefold: bool,
    space2char: Option<String>,
    strip_end_counter: bool,
    strip_suffix: Option<Regex>,
    max_chars: Option<usize>,
}

impl Normalizer {
    pub fn new(rules: &NameRules) -> Self {
        Self {
            casefold: rules.casefold,
            // a placeholder must survive casefolding unchanged
            space2char: rules.space2char.map(|c| {
                if rules.casefold {
                    c.to_lowercase().collect()
                } else {
                    c.to_string()
                }
            }),
            strip_end_counter: rules.strip_end_counter,
            strip_suffix: rules.strip_suffix.clone(),
            max_chars: rules.work_file_stem_shortened,
        }
    }

    /// Normalizer that returns stems unchanged
    pub fn identity() -> Self {
        Self {
            casefold: false,
            space2char: None,
            strip_end_counter: false,
            strip_suffix: None,
            max_chars: None,
        }
    }

    /// Comparison key of a work file stem
    pub fn key(&self, stem: &str) -> String {
        self.normalize(stem, false)
    }

    /// Comparison key of an original stem, truncated when configured
    pub fn original_key(&self, stem: &str) -> String {
        self.normalize(stem, true)
    }

    fn normalize(&self, stem: &str, truncate: bool) -> String {
        let mut key = if self.casefold {
            stem.to_lowercase()
        } else {
            stem.to_string()
        };

        if let Some(placeholder) = &self.space2char {
            key = key.replace(' ', placeholder);
        }

        loop {
            let next = self.strip_once(&key, truncate);
            if next == key {
                return key;
            }
            key = next;
        }
    }

    /// Extension comparison used by the plain (non-media) mode
    pub fn same_suffix(&self, a: &str, b: &str) -> bool {
        if self.casefold {
            a.to_lowercase() == b.to_lowercase()
        } else {
            a == b
        }
    }

    fn strip_once(&self, key: &str, truncate: bool) -> String {
        let mut next = key;
        if self.strip_end_counter {
            next = strip_counter(next);
        }

        let mut next = match &self.strip_suffix {
            Some(pattern) => pattern.replace(next, "").into_owned(),
            None => next.to_string(),
        };

        if let Some(max) = self.max_chars.filter(|_| truncate) {
            if let Some((cut, _)) = next.char_indices().nth(max) {
                next.truncate(cut);
            }
        }
        next
    }
}

/// "IMG_0001(3)" → "IMG_0001"
fn strip_counter(stem: &str) -> &str {
    let Some(body) = stem.strip_suffix(')') else {
        return stem;
    };
    match body.rfind('(') {
        Some(open) => {
            let digits = &body[open + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                &stem[..open]
            } else {
                stem
            }
        }
        None => stem,
    }
}
