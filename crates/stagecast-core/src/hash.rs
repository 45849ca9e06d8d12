//! Content hashing for deterministic rendering verification.
//!
//! Produces a SHA-256 hash of frame buffer data so the preview and live
//! renderers can be checked for bit-exact agreement.

use sha2::{Digest, Sha256};

use crate::frame::FrameBuffer;

/// A content hash digest (SHA-256, 32 bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 32],
}

impl ContentHash {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compute the content hash of a single frame buffer.
pub fn hash_frame(frame: &FrameBuffer) -> ContentHash {
    let mut hasher = Sha256::new();
    // Dimensions are part of the hash so equal bytes at different sizes differ.
    hasher.update(frame.width.to_le_bytes());
    hasher.update(frame.height.to_le_bytes());
    hasher.update(&frame.data);
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    ContentHash::from_bytes(bytes)
}
