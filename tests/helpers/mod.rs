#![allow(dead_code)]

mod servers;
mod test_postgres;

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rvc_server::application::ports::{ArchiveExtractor, ExtractError};
use rvc_server::application::services::{ArtifactCache, ConversionInvoker, ConversionPipeline};
use rvc_server::infrastructure::archive::ZipArchiveExtractor;
use rvc_server::infrastructure::conversion::MockConversionEngine;
use rvc_server::infrastructure::http::HttpFetcher;
use rvc_server::infrastructure::storage::LocalScratchStore;
use zip::write::SimpleFileOptions;

pub use servers::{AssetServer, CallbackReceiver, TestServer};
pub use test_postgres::TestPostgres;

pub const WEIGHTS: &[u8] = b"weights";
pub const INDEX: &[u8] = b"index";

pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A complete model archive with weights and index nested one directory deep.
pub fn model_zip() -> Vec<u8> {
    build_zip(&[("voice/model.pth", WEIGHTS), ("voice/added.index", INDEX)])
}

pub fn http_fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(Duration::from_secs(10), "rvc-server-tests").unwrap())
}

/// Delegates to the zip extractor and counts calls. Each call sleeps first so
/// concurrent callers overlap.
pub struct CountingExtractor {
    calls: AtomicUsize,
    delay: Duration,
}

impl CountingExtractor {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArchiveExtractor for CountingExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<usize, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        ZipArchiveExtractor.extract(archive, dest)
    }
}

pub struct TestPipeline {
    pub dir: tempfile::TempDir,
    pub cache: Arc<ArtifactCache>,
    pub pipeline: Arc<ConversionPipeline>,
    pub extractor: Arc<CountingExtractor>,
}

/// Pipeline over a temp directory with the HTTP fetcher and echoing mock engine.
pub fn test_pipeline() -> TestPipeline {
    let dir = tempfile::TempDir::new().unwrap();
    let fetcher = http_fetcher();
    let extractor = Arc::new(CountingExtractor::new(Duration::from_millis(50)));
    let cache = Arc::new(
        ArtifactCache::new(dir.path().join("models"), fetcher.clone(), extractor.clone()).unwrap(),
    );
    let scratch = Arc::new(LocalScratchStore::new(dir.path(), false).unwrap());
    let invoker = Arc::new(ConversionInvoker::new(
        Arc::new(MockConversionEngine),
        scratch,
        true,
    ));
    let pipeline = Arc::new(ConversionPipeline::new(
        Arc::clone(&cache),
        invoker,
        fetcher,
    ));
    TestPipeline {
        dir,
        cache,
        pipeline,
        extractor,
    }
}
