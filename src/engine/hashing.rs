//! File hashing utilities

use blake3::Hasher;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::utils::config::HashingConsts;

/// Hash a file with blake3, streaming it in fixed-size blocks. Returns the lowercase hex digest.
///
/// Used only as a duplicate/identity hint. Callers treat an error as "hash absent" for that file.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Short hex tag for a string (first `len` hex chars of its blake3 digest).
pub fn short_tag(s: &str, len: usize) -> String {
    let hex = blake3::hash(s.as_bytes()).to_hex().to_string();
    hex.chars().take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_matches_one_shot_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        // Larger than one block so the loop runs more than once.
        let data: Vec<u8> = (0..(HashingConsts::HASH_READ_CHUNK_SIZE * 2 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&data)
            .unwrap();

        let got = hash_file(&path).unwrap();
        assert_eq!(got, blake3::hash(&data).to_hex().to_string());
        assert_eq!(got.len(), 64);
    }

    #[test]
    fn hash_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::File::create(&path).unwrap();
        assert_eq!(
            hash_file(&path).unwrap(),
            blake3::hash(b"").to_hex().to_string()
        );
    }

    #[test]
    fn hash_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(hash_file(&dir.path().join("nope.jpg")).is_err());
    }

    #[test]
    fn short_tag_is_stable_and_truncated() {
        assert_eq!(short_tag("/a/b.jpg", 8), short_tag("/a/b.jpg", 8));
        assert_eq!(short_tag("/a/b.jpg", 8).len(), 8);
        assert_ne!(short_tag("/a/b.jpg", 8), short_tag("/c/b.jpg", 8));
    }
}
