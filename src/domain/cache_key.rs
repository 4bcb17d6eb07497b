use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use super::ArtifactLocator;

const MAX_KEY_LEN: usize = 160;
const HASHED_PREFIX: &str = "sha256-";

/// Filesystem-safe identifier addressing an extracted artifact on disk.
///
/// Keys derived from a locator are the URL-safe base64 of the locator and can be
/// decoded back with [`CacheKey::locator`]. Locators too long to fit in a single
/// path component are hashed instead; those keys carry the `sha256-` prefix and are
/// never decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_locator(locator: &ArtifactLocator) -> Self {
        let encoded = URL_SAFE_NO_PAD.encode(locator.as_str().as_bytes());
        if encoded.len() <= MAX_KEY_LEN {
            return Self(encoded);
        }
        let digest = Sha256::digest(locator.as_str().as_bytes());
        Self(format!("{HASHED_PREFIX}{digest:x}"))
    }

    /// Accepts an opaque key supplied by a caller. Only the alphabet produced by
    /// [`CacheKey::from_locator`] is allowed so a key cannot escape the cache root.
    pub fn parse(raw: &str) -> Result<Self, InvalidCacheKey> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_KEY_LEN
            && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidCacheKey(raw.to_string()))
        }
    }

    /// Recovers the locator this key was derived from, if it is a reversible key.
    pub fn locator(&self) -> Option<ArtifactLocator> {
        if self.is_hashed() {
            return None;
        }
        let bytes = URL_SAFE_NO_PAD.decode(&self.0).ok()?;
        String::from_utf8(bytes).ok().map(ArtifactLocator::new)
    }

    pub fn is_hashed(&self) -> bool {
        self.0.starts_with(HASHED_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cache key: {0:?}")]
pub struct InvalidCacheKey(pub String);
