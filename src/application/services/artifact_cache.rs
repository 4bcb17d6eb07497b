use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::application::ports::{ArchiveExtractor, ExtractError, FetchError, RemoteFetcher};
use crate::domain::{
    ArtifactLocator, CacheKey, CachedArtifact, INDEX_EXTENSION, InvalidCacheKey, ModelRef,
    WEIGHTS_EXTENSION,
};

const ARCHIVE_EXTENSION: &str = "zip";

/// Write-once store of downloaded and unpacked model archives.
///
/// Layout under `models_dir`:
/// - `{key}.zip` is the downloaded archive
/// - `{key}/` is the extraction directory, complete as soon as it is non-empty
///
/// First-time fetch and extraction of a key is serialized by a per-key lock, and the
/// extraction directory only appears through a rename, so readers never observe a
/// partially extracted artifact.
pub struct ArtifactCache {
    models_dir: PathBuf,
    fetcher: Arc<dyn RemoteFetcher>,
    extractor: Arc<dyn ArchiveExtractor>,
    locks: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl ArtifactCache {
    pub fn new(
        models_dir: PathBuf,
        fetcher: Arc<dyn RemoteFetcher>,
        extractor: Arc<dyn ArchiveExtractor>,
    ) -> Result<Self, ArtifactCacheError> {
        std::fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            fetcher,
            extractor,
            locks: DashMap::new(),
        })
    }

    pub fn archive_path(&self, key: &CacheKey) -> PathBuf {
        self.models_dir
            .join(format!("{}.{ARCHIVE_EXTENSION}", key.as_str()))
    }

    pub fn extraction_dir(&self, key: &CacheKey) -> PathBuf {
        self.models_dir.join(key.as_str())
    }

    #[tracing::instrument(skip(self, model), fields(cache_key = tracing::field::Empty))]
    pub async fn resolve(&self, model: &ModelRef) -> Result<CachedArtifact, ArtifactCacheError> {
        let key = model.cache_key();
        tracing::Span::current().record("cache_key", key.as_str());
        let dir = self.extraction_dir(&key);

        if is_populated(&dir).await? {
            tracing::debug!("Artifact cache hit");
            return self.discover(key, dir).await;
        }

        {
            let _lock = KeyLock::acquire(&self.locks, &key).await;
            self.populate(&key, model.source().as_ref(), &dir).await?;
        }

        self.discover(key, dir).await
    }

    /// Fetches and extracts the artifact unless a concurrent caller already did.
    async fn populate(
        &self,
        key: &CacheKey,
        locator: Option<&ArtifactLocator>,
        dir: &Path,
    ) -> Result<(), ArtifactCacheError> {
        if is_populated(dir).await? {
            tracing::debug!("Artifact extracted by a concurrent request");
            return Ok(());
        }
        let archive = self.ensure_archive(key, locator).await?;
        self.extract(key, &archive, dir).await
    }

    /// A downloaded archive is reused as is; a locator is only needed when it is absent.
    async fn ensure_archive(
        &self,
        key: &CacheKey,
        locator: Option<&ArtifactLocator>,
    ) -> Result<PathBuf, ArtifactCacheError> {
        let archive = self.archive_path(key);
        if tokio::fs::try_exists(&archive).await? {
            tracing::debug!(archive = %archive.display(), "Model archive already downloaded");
            return Ok(archive);
        }
        let locator = locator.ok_or_else(|| FetchError::NotCached(key.to_string()))?;

        tracing::info!(model_url = %locator, "Downloading model archive");
        let partial = PartialDownload::new(self.models_dir.join(format!(
            "{}.{ARCHIVE_EXTENSION}.part-{}",
            key.as_str(),
            Uuid::new_v4().simple()
        )));

        let bytes = self
            .fetcher
            .fetch_to_file(locator.as_str(), partial.path())
            .await?;
        tokio::fs::rename(partial.path(), &archive).await?;
        partial.persisted();
        tracing::info!(archive = %archive.display(), bytes, "Model archive downloaded");
        Ok(archive)
    }

    async fn extract(
        &self,
        key: &CacheKey,
        archive: &Path,
        dir: &Path,
    ) -> Result<(), ArtifactCacheError> {
        let staging = self
            .models_dir
            .join(format!(".{}.extract-{}", key.as_str(), Uuid::new_v4().simple()));
        let extractor = Arc::clone(&self.extractor);
        let archive = archive.to_path_buf();
        let target = dir.to_path_buf();

        let entries = tokio::task::spawn_blocking(move || {
            extract_then_rename(extractor.as_ref(), &archive, &staging, &target)
        })
        .await
        .map_err(|e| ArtifactCacheError::Io(io::Error::other(e.to_string())))??;

        tracing::info!(dir = %dir.display(), entries, "Model archive extracted");
        Ok(())
    }

    async fn discover(
        &self,
        key: CacheKey,
        dir: PathBuf,
    ) -> Result<CachedArtifact, ArtifactCacheError> {
        let (weights, index) = tokio::task::spawn_blocking(move || find_artifact_files(&dir))
            .await
            .map_err(|e| ArtifactCacheError::Io(io::Error::other(e.to_string())))??;

        let weights_path = weights.ok_or_else(|| ArtifactCacheError::Incomplete {
            key: key.clone(),
            extension: WEIGHTS_EXTENSION,
        })?;
        tracing::debug!(path = %weights_path.display(), "Model weights file found");

        let index_path = index.ok_or_else(|| ArtifactCacheError::Incomplete {
            key: key.clone(),
            extension: INDEX_EXTENSION,
        })?;
        tracing::debug!(path = %index_path.display(), "Model index file found");

        Ok(CachedArtifact {
            cache_key: key,
            weights_path,
            index_path,
        })
    }
}

/// Holds the first-population lock of one key. Dropping it, including on
/// cancellation, forgets the lock once nobody else is waiting on it.
struct KeyLock<'a> {
    locks: &'a DashMap<CacheKey, Arc<Mutex<()>>>,
    key: CacheKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<'a> KeyLock<'a> {
    async fn acquire(locks: &'a DashMap<CacheKey, Arc<Mutex<()>>>, key: &CacheKey) -> Self {
        let lock = Arc::clone(
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let mut held = Self {
            locks,
            key: key.clone(),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }
}

impl Drop for KeyLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Removes an in-progress download unless it was renamed into place.
struct PartialDownload {
    path: PathBuf,
    persisted: bool,
}

impl PartialDownload {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn persisted(mut self) {
        self.persisted = true;
    }
}

impl Drop for PartialDownload {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn extract_then_rename(
    extractor: &dyn ArchiveExtractor,
    archive: &Path,
    staging: &Path,
    target: &Path,
) -> Result<usize, ArtifactCacheError> {
    std::fs::create_dir_all(staging)?;
    let entries = match extractor.extract(archive, staging) {
        Ok(entries) => entries,
        Err(e) => {
            let _ = std::fs::remove_dir_all(staging);
            return Err(e.into());
        }
    };

    // An empty directory left behind by an older deployment counts as absent.
    if target.is_dir() {
        let _ = std::fs::remove_dir(target);
    }

    if let Err(e) = std::fs::rename(staging, target) {
        let _ = std::fs::remove_dir_all(staging);
        if dir_has_entries(target)? {
            return Ok(entries);
        }
        return Err(e.into());
    }
    Ok(entries)
}

/// Walks `dir` in file-name order; the last match of each extension wins.
fn find_artifact_files(
    dir: &Path,
) -> Result<(Option<PathBuf>, Option<PathBuf>), ArtifactCacheError> {
    let mut weights = None;
    let mut index = None;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ArtifactCacheError::Io(io::Error::other(e.to_string())))?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.path().extension().and_then(|e| e.to_str()) {
            Some(WEIGHTS_EXTENSION) => weights = Some(entry.into_path()),
            Some(INDEX_EXTENSION) => index = Some(entry.into_path()),
            _ => {}
        }
    }

    Ok((weights, index))
}

async fn is_populated(dir: &Path) -> Result<bool, ArtifactCacheError> {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => Ok(entries.next_entry().await?.is_some()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn dir_has_entries(dir: &Path) -> io::Result<bool> {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactCacheError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("model {extension} file not found")]
    Incomplete {
        key: CacheKey,
        extension: &'static str,
    },
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    InvalidKey(#[from] InvalidCacheKey),
    #[error("cache io error: {0}")]
    Io(#[from] io::Error),
}
