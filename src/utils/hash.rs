//! Stable hashing utilities using BLAKE3.
//!
//! Hashes here end up in file names on disk, so they must not change
//! between runs, builds, or platforms.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint("/home/me/tree-sitter-json", 12); // -> "a1b2c3d4e5f6"
//! ```

/// Compute the full hex digest of byte data.
#[inline]
pub fn digest<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex::encode(blake3::hash(data.as_ref()).as_bytes())
}

/// Compute a short hex fingerprint of `len` characters (max 64).
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T, len: usize) -> String {
    let mut hex = digest(data);
    hex.truncate(len.min(64));
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_length() {
        assert_eq!(fingerprint("abc", 12).len(), 12);
        assert_eq!(fingerprint("abc", 100).len(), 64);
    }

    #[test]
    fn test_fingerprint_is_prefix_of_digest() {
        let full = digest("/tmp/grammar");
        assert!(full.starts_with(&fingerprint("/tmp/grammar", 8)));
    }

    #[test]
    fn test_known_value() {
        // BLAKE3 of the empty input
        assert_eq!(
            digest(""),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }
}
