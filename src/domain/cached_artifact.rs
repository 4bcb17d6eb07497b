use std::path::PathBuf;

use super::CacheKey;

pub const WEIGHTS_EXTENSION: &str = "pth";
pub const INDEX_EXTENSION: &str = "index";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    pub cache_key: CacheKey,
    pub weights_path: PathBuf,
    pub index_path: PathBuf,
}
