//! Stable identifiers for generated config sections.

use sha2::{Digest, Sha256};

/// Short identity for a routed path: first 6 hex characters of its SHA-256.
/// Collisions across configured paths are not detected.
pub fn route_hash(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    format!("{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2])
}

/// Backend section name for a routed path.
pub fn routed_backend_name(path: &str) -> String {
    format!("http-routed-backend-{}", route_hash(path))
}

/// Backend section name for a TCP proxy.
pub fn tcp_backend_name(name: &str) -> String {
    format!("tcp-{name}")
}

/// Frontend section name for a TCP proxy.
pub fn tcp_frontend_name(name: &str) -> String {
    format!("tcp-frontend_{name}")
}
