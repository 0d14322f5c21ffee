//! Capture-time resolution for discovered files.
//!
//! EXIF metadata is typically present in JPEG, TIFF and most raw
//! containers; files without it fall back to filesystem timestamps.

use chrono::{DateTime, NaiveDateTime, Utc};
use exif::{In, Reader, Tag, Value};
use std::fs::{File, Metadata};
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;

/// Resolves when a photo was captured.
///
/// EXIF `DateTimeOriginal` wins, then EXIF `DateTime`, then the file's
/// modification time, then its creation time. A file with no usable
/// timestamp at all resolves to the Unix epoch so the record is never
/// dropped over missing metadata.
pub fn capture_timestamp(path: &Path, metadata: &Metadata) -> DateTime<Utc> {
    if let Some(taken) = exif_timestamp(path) {
        return taken;
    }
    if let Ok(modified) = metadata.modified() {
        return DateTime::from(modified);
    }
    if let Ok(created) = metadata.created() {
        return DateTime::from(created);
    }
    DateTime::from(SystemTime::UNIX_EPOCH)
}

/// Reads the capture time from EXIF data, if the file carries any.
fn exif_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let file = File::open(path).ok()?;
    let mut bufreader = BufReader::new(&file);
    let exif = Reader::new().read_from_container(&mut bufreader).ok()?;

    for tag in [Tag::DateTimeOriginal, Tag::DateTime] {
        if let Some(field) = exif.get_field(tag, In::PRIMARY) {
            if let Some(parsed) = parse_exif_datetime(&field.value) {
                return Some(parsed);
            }
        }
    }
    None
}

/// Parses the EXIF date format "YYYY:MM:DD HH:MM:SS".
fn parse_exif_datetime(value: &Value) -> Option<DateTime<Utc>> {
    if let Value::Ascii(vec) = value {
        let bytes = vec.first()?;
        let s = std::str::from_utf8(bytes).ok()?;
        let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y:%m:%d %H:%M:%S").ok()?;
        return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_exif_date_format() {
        let value = Value::Ascii(vec![b"2024:01:05 09:12:33".to_vec()]);
        let parsed = parse_exif_datetime(&value).unwrap();

        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 1);
        assert_eq!(parsed.day(), 5);
        assert_eq!(parsed.hour(), 9);
    }

    #[test]
    fn rejects_malformed_exif_date() {
        let value = Value::Ascii(vec![b"last tuesday".to_vec()]);
        assert!(parse_exif_datetime(&value).is_none());
    }

    #[test]
    fn file_without_exif_has_no_exif_timestamp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("IMG_0001.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        assert!(exif_timestamp(&path).is_none());
    }

    #[test]
    fn falls_back_to_modification_time() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("IMG_0002.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        let metadata = fs::metadata(&path).unwrap();
        let expected: DateTime<Utc> = DateTime::from(metadata.modified().unwrap());

        assert_eq!(capture_timestamp(&path, &metadata), expected);
    }
}
