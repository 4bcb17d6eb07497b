use std::fs;
use std::io;
use std::path::Path;

use zip::ZipArchive;

use crate::application::ports::{ArchiveExtractor, ExtractError};

pub struct ZipArchiveExtractor;

impl ArchiveExtractor for ZipArchiveExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<usize, ExtractError> {
        let file = fs::File::open(archive)?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| ExtractError::Corrupt(e.to_string()))?;

        let mut written = 0;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ExtractError::Corrupt(e.to_string()))?;

            let relative = entry
                .enclosed_name()
                .ok_or_else(|| ExtractError::UnsafeEntry(entry.name().to_string()))?;
            let target = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = fs::File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
            written += 1;
        }

        Ok(written)
    }
}
