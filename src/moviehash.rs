//! Content fingerprint ("movie hash")
//!
//! Pairs subtitles with a specific video encoding. The digest is MD5 over
//! the first chunk, the last chunk and the decimal file size, in that order.
//! It is a best-effort key: two different files can collide, and nothing
//! in this crate relies on fingerprints being unique.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{Result, SyncError};

/// Distance of the near-start and near-end windows from the file edges
pub const CHUNK_SIZE: u64 = 64 * 1024;

/// Size of each sampled window
pub const WINDOW_SIZE: u64 = 8;

/// Fingerprint from pre-supplied chunks
pub fn fingerprint(file_size: u64, first_chunk: &[u8], last_chunk: &[u8]) -> String {
    let mut ctx = md5::Context::new();
    ctx.consume(first_chunk);
    ctx.consume(last_chunk);
    ctx.consume(file_size.to_string().as_bytes());
    format!("{:x}", ctx.compute())
}

/// Byte windows sampled from a local file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashWindows {
    pub file_size: u64,
    /// Start window followed by the near-start window
    pub first: Vec<u8>,
    /// Near-end window followed by the final window
    pub last: Vec<u8>,
}

impl HashWindows {
    pub fn fingerprint(&self) -> String {
        fingerprint(self.file_size, &self.first, &self.last)
    }
}

/// Window offsets for a file of `size` bytes: start, near-start, near-end
/// and the final 8 bytes
pub fn window_offsets(size: u64) -> [u64; 4] {
    [
        0,
        CHUNK_SIZE.min(size),
        size.saturating_sub(CHUNK_SIZE).max(CHUNK_SIZE),
        size.saturating_sub(WINDOW_SIZE),
    ]
}

/// Read the four hash windows from a local file
pub fn read_windows<P: AsRef<Path>>(path: P) -> Result<HashWindows> {
    let mut file = File::open(path.as_ref())?;
    let file_size = file.metadata()?.len();
    let offsets = window_offsets(file_size);

    let mut windows: Vec<Vec<u8>> = Vec::with_capacity(offsets.len());
    for offset in offsets {
        windows.push(read_window(&mut file, offset, file_size)?);
    }

    let last = [windows[2].as_slice(), windows[3].as_slice()].concat();
    let first = [windows[0].as_slice(), windows[1].as_slice()].concat();
    Ok(HashWindows {
        file_size,
        first,
        last,
    })
}

fn read_window(file: &mut File, offset: u64, file_size: u64) -> Result<Vec<u8>> {
    if offset >= file_size {
        return Ok(Vec::new());
    }
    let len = WINDOW_SIZE.min(file_size - offset) as usize;
    let mut buf = vec![0u8; len];
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// Fingerprint a local file
pub fn fingerprint_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let windows = read_windows(path)?;
    let hash = windows.fingerprint();
    tracing::debug!(path = %path.display(), size = windows.file_size, %hash, "Computed movie hash");
    Ok(hash)
}

/// File size as clients send it: a JSON number or a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileSize {
    Bytes(u64),
    Text(String),
}

impl FileSize {
    pub fn bytes(&self) -> Option<u64> {
        match self {
            FileSize::Bytes(n) => Some(*n),
            FileSize::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<u64> for FileSize {
    fn from(n: u64) -> Self {
        FileSize::Bytes(n)
    }
}

/// Movie-hash request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieHashRequest {
    pub url: Option<String>,
    pub size: Option<FileSize>,
    pub first_bytes: Option<String>,
    pub last_bytes: Option<String>,
}

/// Movie-hash response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MovieHashResponse {
    Hash { hash: String, size: u64 },
    Error { success: bool, error: String },
}

impl MovieHashResponse {
    pub fn error(message: impl Into<String>) -> Self {
        MovieHashResponse::Error {
            success: false,
            error: message.into(),
        }
    }
}

impl MovieHashRequest {
    /// Evaluate the request. Unsupported or incomplete input yields a
    /// structured error response rather than an `Err`.
    pub fn evaluate(&self) -> MovieHashResponse {
        if self.url.is_some() {
            return MovieHashResponse::error(
                "Remote file hash calculation not supported via URL. Provide file size and bytes.",
            );
        }
        let size = match &self.size {
            Some(raw) => match raw.bytes() {
                Some(n) => Some(n),
                None => return MovieHashResponse::error("Invalid size"),
            },
            None => None,
        };
        match (size, &self.first_bytes, &self.last_bytes) {
            (Some(size), Some(first), Some(last)) if size > 0 && !first.is_empty() && !last.is_empty() => {
                match decode_chunks(first, last) {
                    Ok((first, last)) => MovieHashResponse::Hash {
                        hash: fingerprint(size, &first, &last),
                        size,
                    },
                    Err(e) => MovieHashResponse::error(e.to_string()),
                }
            }
            _ => MovieHashResponse::error("Missing parameters"),
        }
    }
}

fn decode_chunks(first: &str, last: &str) -> std::result::Result<(Vec<u8>, Vec<u8>), SyncError> {
    Ok((hex::decode(first.trim())?, hex::decode(last.trim())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint(1000, b"first", b"last");
        assert_eq!(a, fingerprint(1000, b"first", b"last"));
        assert_eq!(a.len(), 32);
        assert_ne!(a, fingerprint(1000, b"first", b"lasT"));
        assert_ne!(a, fingerprint(1001, b"first", b"last"));
    }

    #[test]
    fn test_fingerprint_known_value() {
        // md5("ab" + "cd" + "4") == md5("abcd4")
        assert_eq!(
            fingerprint(4, b"ab", b"cd"),
            format!("{:x}", md5::compute(b"abcd4"))
        );
    }

    #[test]
    fn test_window_offsets() {
        assert_eq!(window_offsets(1_000_000), [0, 65_536, 934_464, 999_992]);
        assert_eq!(window_offsets(100), [0, 100, 65_536, 92]);
        assert_eq!(window_offsets(4), [0, 4, 65_536, 0]);
    }

    #[test]
    fn test_file_variant_matches_chunk_variant() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&data).unwrap();

        let size = data.len() as u64;
        let [a, b, c, d] = window_offsets(size).map(|o| o as usize);
        let first = [&data[a..a + 8], &data[b..b + 8]].concat();
        let last = [&data[c..c + 8], &data[d..d + 8]].concat();

        let windows = read_windows(file.path()).unwrap();
        assert_eq!(windows.first, first);
        assert_eq!(windows.last, last);
        assert_eq!(
            fingerprint_file(file.path()).unwrap(),
            fingerprint(size, &first, &last)
        );
    }

    #[test]
    fn test_small_file_windows_truncated() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"tiny").unwrap();

        let windows = read_windows(file.path()).unwrap();
        assert_eq!(windows.file_size, 4);
        assert_eq!(windows.first, b"tiny".to_vec());
        assert_eq!(windows.last, b"tiny".to_vec());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = fingerprint_file("/definitely/not/here.mkv").unwrap_err();
        assert!(matches!(err, SyncError::Io(_)));
    }

    #[test]
    fn test_request_hash() {
        let request = MovieHashRequest {
            size: Some(4.into()),
            first_bytes: Some("6162".to_string()),
            last_bytes: Some("6364".to_string()),
            ..Default::default()
        };
        assert_eq!(
            request.evaluate(),
            MovieHashResponse::Hash {
                hash: fingerprint(4, b"ab", b"cd"),
                size: 4
            }
        );
    }

    #[test]
    fn test_request_errors() {
        let remote = MovieHashRequest {
            url: Some("http://example.com/movie.mkv".to_string()),
            ..Default::default()
        };
        assert!(matches!(remote.evaluate(), MovieHashResponse::Error { .. }));

        let missing = MovieHashRequest {
            size: Some(10.into()),
            ..Default::default()
        };
        assert_eq!(
            missing.evaluate(),
            MovieHashResponse::Error {
                success: false,
                error: "Missing parameters".to_string()
            }
        );

        let bad_hex = MovieHashRequest {
            size: Some(10.into()),
            first_bytes: Some("zz".to_string()),
            last_bytes: Some("00".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad_hex.evaluate(), MovieHashResponse::Error { .. }));
    }

    #[test]
    fn test_request_size_as_string() {
        let request: MovieHashRequest = serde_json::from_value(serde_json::json!({
            "size": "4",
            "firstBytes": "6162",
            "lastBytes": "6364"
        }))
        .unwrap();
        assert_eq!(request.size, Some(FileSize::Text("4".to_string())));
        assert_eq!(
            request.evaluate(),
            MovieHashResponse::Hash {
                hash: fingerprint(4, b"ab", b"cd"),
                size: 4
            }
        );
    }

    #[test]
    fn test_request_size_not_a_number() {
        let request = MovieHashRequest {
            size: Some(FileSize::Text("big".to_string())),
            first_bytes: Some("6162".to_string()),
            last_bytes: Some("6364".to_string()),
            ..Default::default()
        };
        assert!(matches!(request.evaluate(), MovieHashResponse::Error { success: false, .. }));
    }

    #[test]
    fn test_response_json_shape() {
        let json = serde_json::to_value(MovieHashResponse::Hash {
            hash: "abc".to_string(),
            size: 5,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"hash": "abc", "size": 5}));
    }
}
