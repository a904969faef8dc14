//! Input resolution: validate the source path and sniff its format.
//!
//! Format detection is by content, not extension: a `.docx` that is really
//! a renamed text file should fail here with `UnsupportedFormat` rather
//! than crash a parser downstream. PDF is identified by the `%PDF` magic;
//! DOCX by the zip magic plus the presence of `word/document.xml` in the
//! container (which also cleanly rejects PPTX/XLSX zips).

use crate::error::AppraiseError;
use crate::model::SourceFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated input document, fully read into memory.
///
/// Appraisal inputs are manuscripts, not bulk data; reading them whole keeps
/// the file handle's lifetime out of the async pipeline entirely.
#[derive(Debug)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub stem: String,
    pub format: SourceFormat,
    pub bytes: Vec<u8>,
}

/// Resolve and read the input file, validating existence, readability, and
/// format magic.
pub fn resolve_input(path: &Path) -> Result<ResolvedInput, AppraiseError> {
    if !path.exists() {
        return Err(AppraiseError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(AppraiseError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(AppraiseError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let format = sniff_format(&bytes).ok_or_else(|| AppraiseError::UnsupportedFormat {
        path: path.to_path_buf(),
        magic: first_four(&bytes),
    })?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    debug!("Resolved {} input: {}", format.name(), path.display());
    Ok(ResolvedInput {
        path: path.to_path_buf(),
        stem,
        format,
        bytes,
    })
}

/// Identify the document format from its bytes, or `None` if unsupported.
pub fn sniff_format(bytes: &[u8]) -> Option<SourceFormat> {
    if bytes.starts_with(b"%PDF") {
        return Some(SourceFormat::Pdf);
    }
    if bytes.starts_with(b"PK\x03\x04") && zip_has_word_document(bytes) {
        return Some(SourceFormat::Docx);
    }
    None
}

fn zip_has_word_document(bytes: &[u8]) -> bool {
    match zip::ZipArchive::new(Cursor::new(bytes)) {
        Ok(mut archive) => archive.by_name("word/document.xml").is_ok(),
        Err(_) => false,
    }
}

fn first_four(bytes: &[u8]) -> [u8; 4] {
    let mut magic = [0u8; 4];
    for (i, b) in bytes.iter().take(4).enumerate() {
        magic[i] = *b;
    }
    magic
}
