//! Utility functions for shardfs

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::Path;

/// Percent-encoding set for file ids used in chunk file names
const KEY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'\\')
    .add(b'%')
    .add(b' ')
    .add(b'?')
    .add(b'#')
    .add(b'&')
    .add(b'_');

/// Maximum length of a file identifier in bytes
pub const MAX_FILE_ID_LEN: usize = 1024;

/// Encode a file id for filesystem usage
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Parse duration string (e.g., "500ms", "30s", "5m")
pub fn parse_duration(s: &str) -> crate::Result<std::time::Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(crate::Error::InvalidConfig("empty duration".into()));
    }

    let (num_str, unit) = if let Some(num) = s.strip_suffix("ms") {
        (num, "ms")
    } else {
        let split = s.len() - s.chars().last().map(char::len_utf8).unwrap_or(0);
        (&s[..split], &s[split..])
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| crate::Error::InvalidConfig(format!("invalid duration: {}", s)))?;

    let duration = match unit {
        "ms" => std::time::Duration::from_millis(num),
        "s" => std::time::Duration::from_secs(num),
        "m" => std::time::Duration::from_secs(num * 60),
        "h" => std::time::Duration::from_secs(num * 3600),
        _ => {
            return Err(crate::Error::InvalidConfig(format!(
                "unknown duration unit: {}",
                unit
            )))
        }
    };

    Ok(duration)
}

/// Validate a file id (must be non-empty, reasonable length, printable)
pub fn validate_file_id(file_id: &str) -> crate::Result<()> {
    if file_id.is_empty() {
        return Err(crate::Error::InvalidArgument(
            "file id cannot be empty".into(),
        ));
    }

    if file_id.len() > MAX_FILE_ID_LEN {
        return Err(crate::Error::InvalidArgument(format!(
            "file id too long (max {} bytes)",
            MAX_FILE_ID_LEN
        )));
    }

    if file_id.chars().any(|c| c.is_control()) {
        return Err(crate::Error::InvalidArgument(
            "file id contains invalid characters".into(),
        ));
    }

    Ok(())
}

/// File type tag of a path: everything after the last dot of the file
/// name, or "". A leading dot counts, so `.bashrc` has type `bashrc`.
pub fn file_type_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .unwrap_or_default()
}

/// Default file id for an upload: the base name without its extension
pub fn file_id_of(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Number of `chunk_size` windows needed to cover `file_size` bytes
pub fn chunk_count(file_size: u64, chunk_size: u64) -> u64 {
    file_size.div_ceil(chunk_size)
}

/// Prefix `http://` unless the address already names a scheme
pub fn with_http_scheme(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key() {
        let encoded = encode_key("reports/2024_q1");
        assert_eq!(encoded, "reports%2F2024%5Fq1");
        assert_eq!(encode_key("plain"), "plain");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(
            parse_duration("500ms").unwrap(),
            std::time::Duration::from_millis(500)
        );
        assert_eq!(
            parse_duration("5s").unwrap(),
            std::time::Duration::from_secs(5)
        );
        assert_eq!(
            parse_duration("2m").unwrap(),
            std::time::Duration::from_secs(120)
        );
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
    }

    #[test]
    fn test_validate_file_id() {
        assert!(validate_file_id("report").is_ok());
        assert!(validate_file_id("dir/report").is_ok());
        assert!(validate_file_id("").is_err());
        assert!(validate_file_id("bad\nid").is_err());
        assert!(validate_file_id(&"x".repeat(2000)).is_err());
    }

    #[test]
    fn test_file_type_and_id() {
        let path = Path::new("/tmp/data/report.txt");
        assert_eq!(file_type_of(path), "txt");
        assert_eq!(file_id_of(path).as_deref(), Some("report"));

        let bare = Path::new("Makefile");
        assert_eq!(file_type_of(bare), "");
        assert_eq!(file_id_of(bare).as_deref(), Some("Makefile"));

        assert_eq!(file_type_of(Path::new("/home/u/.bashrc")), "bashrc");
        assert_eq!(file_type_of(Path::new("archive.tar.gz")), "gz");
        assert_eq!(file_type_of(Path::new("v1.2/notes")), "");
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 4), 0);
        assert_eq!(chunk_count(4, 4), 1);
        assert_eq!(chunk_count(5, 4), 2);
        assert_eq!(chunk_count(8, 4), 2);
    }

    #[test]
    fn test_with_http_scheme() {
        assert_eq!(with_http_scheme("127.0.0.1:80"), "http://127.0.0.1:80");
        assert_eq!(with_http_scheme("http://a:1"), "http://a:1");
    }
}
