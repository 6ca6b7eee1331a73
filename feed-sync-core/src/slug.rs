use sha1::{Digest, Sha1};

/// Derives the CMS slug for a feed entry: lowercase hex SHA-1 of the raw GUID bytes.
pub fn guid_to_slug(guid: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(guid.as_bytes());
    format!("{:x}", hasher.finalize())
}
