//! Framing between raw byte streams and 32-bit little-endian words.

use std::path::Path;

use anyhow::Result;
use thiserror::Error;

use crate::codec::{word_from_bytes, word_to_bytes};

pub const WORD_BYTES: usize = 4;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("binary size {len} is not a multiple of 4 bytes")]
    InvalidFileSize { len: usize },
}

pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<u32>, ImageError> {
    if bytes.len() % WORD_BYTES != 0 {
        return Err(ImageError::InvalidFileSize { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(WORD_BYTES)
        .map(|c| word_from_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * WORD_BYTES);
    for &w in words {
        out.extend_from_slice(&word_to_bytes(w));
    }
    out
}

pub fn load_words(path: &Path) -> Result<Vec<u32>> {
    let bytes = std::fs::read(path)?;
    Ok(words_from_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_round_trips() {
        let words = vec![0x0120_0003, 0xFFFF_FFFF, 0];
        let bytes = words_to_bytes(&words);
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[..4], &[0x03, 0x00, 0x20, 0x01]);
        assert_eq!(words_from_bytes(&bytes).unwrap(), words);
    }

    #[test]
    fn ragged_input_is_rejected() {
        let err = words_from_bytes(&[1, 2, 3, 4, 5]).unwrap_err();
        assert!(matches!(err, ImageError::InvalidFileSize { len: 5 }));
    }
}
