//! Safe file reading
//!
//! Every component that touches file bytes goes through [`SafeFileReader`]:
//! - Missing files fail with `NotFound`
//! - Files over the size cap fail with `TooLarge` before any bytes are read
//! - UTF-8 is tried first; invalid UTF-8 is decoded as Latin-1, which never fails

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::config::DEFAULT_MAX_FILE_SIZE;
use crate::core::error::{EngineError, Result};

/// Encoding that produced the decoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Utf8,
    /// Single-byte fallback: every byte maps to the code point of the same value
    Latin1,
}

/// Decoded file content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    pub content: String,
    pub encoding: Encoding,
    pub size: u64,
}

/// Size-capped reader with a two-step decode
#[derive(Debug, Clone, Copy)]
pub struct SafeFileReader {
    max_file_size: u64,
}

impl Default for SafeFileReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl SafeFileReader {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Read and decode a file
    pub fn read(&self, path: &Path) -> Result<DecodedFile> {
        let metadata = fs::metadata(path).map_err(|e| map_io_error(e, path))?;
        let size = metadata.len();

        if size > self.max_file_size {
            return Err(EngineError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_file_size,
            });
        }

        let bytes = fs::read(path).map_err(|e| map_io_error(e, path))?;

        let decoded = match String::from_utf8(bytes) {
            Ok(content) => DecodedFile {
                content,
                encoding: Encoding::Utf8,
                size,
            },
            Err(err) => {
                tracing::debug!(path = %path.display(), "invalid UTF-8, decoding as Latin-1");
                DecodedFile {
                    content: decode_latin1(err.as_bytes()),
                    encoding: Encoding::Latin1,
                    size,
                }
            }
        };

        Ok(decoded)
    }

    /// Read a file and return only its text
    pub fn read_text(&self, path: &Path) -> Result<String> {
        self.read(path).map(|decoded| decoded.content)
    }
}

/// Split decoded text into lines, treating `\r\n`, `\n` and a lone `\r` as line breaks.
///
/// A trailing break yields a final empty line, as splitting on `\n` does.
pub fn text_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .split('\n')
        .flat_map(|line| line.strip_suffix('\r').unwrap_or(line).split('\r'))
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn map_io_error(err: std::io::Error, path: &Path) -> EngineError {
    match err.kind() {
        ErrorKind::NotFound => EngineError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => EngineError::PermissionDenied(path.to_path_buf()),
        _ => EngineError::Io(err),
    }
}
