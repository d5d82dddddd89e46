//! SHA-256 checksum utility for record and dataset fingerprints.

use sha2::{Digest, Sha256};

/// Compute SHA256 checksum of a string
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_checksum_known_value() {
        assert_eq!(
            compute_checksum(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_compute_checksum_differs_on_content() {
        assert_ne!(compute_checksum("f0.20"), compute_checksum("f0.35"));
        assert_eq!(compute_checksum("abc").len(), 64);
    }
}
