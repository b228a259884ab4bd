use sha1::{Digest, Sha1};

/// Length of a hex-encoded fingerprint.
pub const FINGERPRINT_LEN: usize = 40;

/// Hex SHA-1 of the full content at one point in a resource's history.
pub fn fingerprint(content: &str) -> String {
    hex::encode(Sha1::digest(content.as_bytes()))
}
