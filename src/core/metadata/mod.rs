//! # Metadata Module
//!
//! Extracts the EXIF capture time from image files.
//!
//! ## Extracted Fields
//! - DateTimeOriginal, falling back to DateTimeDigitized and DateTime
//!
//! EXIF stores wall-clock time without an offset; it is interpreted in the
//! local timezone, like file modification times are displayed.

use chrono::{Local, NaiveDateTime, TimeZone};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Tags consulted, most trusted first
const DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Capture time in seconds since the Unix epoch, if the file carries one
pub fn capture_time(path: &Path) -> Option<i64> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(&file);
    let exif = Reader::new().read_from_container(&mut bufreader).ok()?;

    DATE_TAGS.iter().find_map(|tag| {
        let field = exif.get_field(*tag, In::PRIMARY)?;
        match field.value {
            Value::Ascii(ref vec) => vec
                .first()
                .and_then(|bytes| std::str::from_utf8(bytes).ok())
                .and_then(parse_exif_date),
            _ => None,
        }
    })
}

/// Parse an EXIF "YYYY:MM:DD HH:MM:SS" value as local time
pub fn parse_exif_date(value: &str) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), EXIF_DATE_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|time| time.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parses_exif_format() {
        let parsed = parse_exif_date("2023:06:15 14:30:00").unwrap();
        let expected = Local
            .with_ymd_and_hms(2023, 6, 15, 14, 30, 0)
            .earliest()
            .unwrap()
            .timestamp();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_exif_date("2023-06-15 14:30:00").is_none());
        assert!(parse_exif_date("").is_none());
    }

    #[test]
    fn capture_time_of_missing_file_is_none() {
        assert!(capture_time(Path::new("/nonexistent/photo.jpg")).is_none());
    }

    #[test]
    fn capture_time_of_file_without_exif_is_none() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not an image").unwrap();
        assert!(capture_time(file.path()).is_none());
    }
}
