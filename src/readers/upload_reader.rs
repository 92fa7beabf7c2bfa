use crate::error::Result;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use encoding_rs::UTF_8;
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

/// Reads an uploaded file into text lines.
pub struct UploadReader {
    use_mmap: bool,
}

impl UploadReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    pub fn read_path(&self, path: &Path) -> Result<Vec<String>> {
        if self.use_mmap {
            self.read_mmap(path)
        } else {
            self.read_buffered(path)
        }
    }

    fn read_buffered(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::decode_lines(&bytes))
    }

    fn read_mmap(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path)?;
        // Mapping a zero-length file fails on some platforms
        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::decode_lines(&mmap))
    }

    /// Decode raw upload bytes and split them into lines.
    ///
    /// A byte order mark selects UTF-8 or UTF-16; without one the bytes are
    /// read as UTF-8. `\r\n` endings are accepted and a final newline does not
    /// produce an extra empty line.
    pub fn decode_lines(bytes: &[u8]) -> Vec<String> {
        let (text, encoding, had_errors) = UTF_8.decode(bytes);
        if had_errors {
            warn!(
                encoding = encoding.name(),
                "Upload contained malformed byte sequences; replaced with U+FFFD"
            );
        }

        text.lines().map(str::to_string).collect()
    }
}

impl Default for UploadReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_decode_crlf_and_trailing_newline() {
        let lines = UploadReader::decode_lines(b"header\r\n2023-01-01;1;5\r\n");
        assert_eq!(lines, vec!["header", "2023-01-01;1;5"]);
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let lines = UploadReader::decode_lines(b"\xEF\xBB\xBFheader\n2023-01-01;1;5");
        assert_eq!(lines, vec!["header", "2023-01-01;1;5"]);
    }

    #[test]
    fn test_decode_utf16le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "h\nx;1;2".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(UploadReader::decode_lines(&bytes), vec!["h", "x;1;2"]);
    }

    #[test]
    fn test_decode_empty_upload() {
        assert!(UploadReader::decode_lines(b"").is_empty());
    }

    #[test]
    fn test_read_buffered_and_mmap_agree() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "header\n2023-01-01;1.0;5.0\n2023-01-02;3.0;7.0")?;

        let buffered = UploadReader::new().read_path(temp_file.path())?;
        let mapped = UploadReader::with_mmap(true).read_path(temp_file.path())?;

        assert_eq!(buffered.len(), 3);
        assert_eq!(buffered, mapped);
        Ok(())
    }

    #[test]
    fn test_mmap_empty_file() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        assert!(UploadReader::with_mmap(true).read_path(temp_file.path())?.is_empty());
        Ok(())
    }
}
