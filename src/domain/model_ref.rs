use super::{ArtifactLocator, CacheKey};

/// How a job names the model it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    Locator(ArtifactLocator),
    /// A pre-resolved key; `fallback` is fetched if the key is not cached yet.
    Cached {
        key: CacheKey,
        fallback: Option<ArtifactLocator>,
    },
}

impl ModelRef {
    pub fn cache_key(&self) -> CacheKey {
        match self {
            ModelRef::Locator(locator) => CacheKey::from_locator(locator),
            ModelRef::Cached { key, .. } => key.clone(),
        }
    }

    /// The locator to download from when the artifact is not cached.
    pub fn source(&self) -> Option<ArtifactLocator> {
        match self {
            ModelRef::Locator(locator) => Some(locator.clone()),
            ModelRef::Cached {
                fallback: Some(locator),
                ..
            } => Some(locator.clone()),
            ModelRef::Cached {
                key,
                fallback: None,
            } => key.locator().filter(ArtifactLocator::is_remote),
        }
    }
}
