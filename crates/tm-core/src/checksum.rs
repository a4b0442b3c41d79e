//! SHA-256 checksums for migration drift detection.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of a script, hex-encoded lowercase.
pub fn compute_checksum(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Compute the checksum after normalizing CRLF line endings to LF.
///
/// Validation and repair compare against this before declaring a mismatch so
/// that a checkout with different line endings is not reported as a tampered
/// script.
pub fn normalized_checksum(s: &str) -> String {
    compute_checksum(&s.replace("\r\n", "\n"))
}

#[cfg(test)]
#[path = "checksum_test.rs"]
mod tests;
