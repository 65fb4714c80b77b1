//! Wordlist loading

use std::path::Path;

use tracing::debug;

use crate::error::{Result, TargetError};

/// Read a wordlist: one word per line, surrounding whitespace trimmed,
/// blank lines skipped. Bytes that are not valid UTF-8 are dropped.
pub fn read_wordlist(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| TargetError::Wordlist {
        path: path.to_path_buf(),
        source,
    })?;
    let words = parse_wordlist(&bytes);
    debug!(path = %path.display(), words = words.len(), "Wordlist loaded");
    Ok(words)
}

/// Split raw wordlist bytes into words.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
pub fn parse_wordlist(bytes: &[u8]) -> Vec<String> {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_blank_and_trims() {
        let words = parse_wordlist(b"admin\n\n  login \r\n\t\nregister");
        assert_eq!(words, vec!["admin", "login", "register"]);
    }

    #[test]
    fn test_parse_drops_invalid_utf8() {
        let words = parse_wordlist(b"ad\xffmin\n\xfe\n");
        assert_eq!(words, vec!["admin"]);
    }

    #[test]
    fn test_parse_keeps_encoded_replacement_char() {
        let words = parse_wordlist("caf\u{FFFD}\n".as_bytes());
        assert_eq!(words, vec!["caf\u{FFFD}"]);
    }

    #[test]
    fn test_parse_splits_on_lone_carriage_return() {
        let words = parse_wordlist(b"one\rtwo\r\nthree\n");
        assert_eq!(words, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_read_wordlist_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1' OR '1'='1").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "<script>").unwrap();
        let words = read_wordlist(file.path()).unwrap();
        assert_eq!(words, vec!["1' OR '1'='1", "<script>"]);
    }

    #[test]
    fn test_missing_file() {
        let err = read_wordlist(Path::new("/nonexistent/words.txt")).unwrap_err();
        assert!(matches!(err, TargetError::Wordlist { .. }));
        assert!(err.to_string().contains("/nonexistent/words.txt"));
    }
}
