use std::io::{Cursor, Write};

use rvc_server::application::ports::{ArchiveExtractor, ExtractError};
use rvc_server::infrastructure::archive::ZipArchiveExtractor;
use zip::write::SimpleFileOptions;

use crate::helpers::build_zip;

fn write_archive(dir: &tempfile::TempDir, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join("archive.zip");
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn given_nested_archive_when_extracting_then_tree_is_recreated() {
    let dir = tempfile::TempDir::new().unwrap();
    let archive = write_archive(
        &dir,
        &build_zip(&[("a/b/model.pth", b"w"), ("a/model.index", b"i"), ("top.txt", b"t")]),
    );
    let dest = dir.path().join("out");
    std::fs::create_dir_all(&dest).unwrap();

    let written = ZipArchiveExtractor.extract(&archive, &dest).unwrap();

    assert_eq!(written, 3);
    assert_eq!(std::fs::read(dest.join("a/b/model.pth")).unwrap(), b"w");
    assert_eq!(std::fs::read(dest.join("a/model.index")).unwrap(), b"i");
}

#[test]
fn given_garbage_file_when_extracting_then_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    let archive = write_archive(&dir, b"definitely not a zip");

    let result = ZipArchiveExtractor.extract(&archive, dir.path());

    assert!(matches!(result, Err(ExtractError::Corrupt(_))));
}

#[test]
fn given_entry_escaping_destination_when_extracting_then_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("../escape.pth", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"evil").unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    let archive = write_archive(&dir, &bytes);
    let dest = dir.path().join("out");
    std::fs::create_dir_all(&dest).unwrap();

    let result = ZipArchiveExtractor.extract(&archive, &dest);

    assert!(matches!(result, Err(ExtractError::UnsafeEntry(_))));
    assert!(!dir.path().join("escape.pth").exists());
}
