use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

mod office;
mod pdf;
mod spreadsheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    Xls,
    Xlsx,
}

impl DocumentKind {
    /// Kind from the filename suffix, compared case-insensitively.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, suffix) = name.trim().rsplit_once('.')?;
        match suffix.to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "pptx" => Some(DocumentKind::Pptx),
            "xls" => Some(DocumentKind::Xls),
            "xlsx" => Some(DocumentKind::Xlsx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Pptx => "pptx",
            DocumentKind::Xls => "xls",
            DocumentKind::Xlsx => "xlsx",
        }
    }
}

/// Writes `bytes` to a scratch file under `tmp_dir` and extracts its text.
///
/// The scratch file is removed when this returns, whether extraction
/// succeeded or not.
pub fn extract_text(kind: DocumentKind, bytes: &[u8], tmp_dir: &Path) -> Result<String> {
    std::fs::create_dir_all(tmp_dir)
        .with_context(|| format!("failed to create tmp dir: {}", tmp_dir.display()))?;
    let mut file = tempfile::Builder::new()
        .prefix("doc-translator-")
        .suffix(&format!(".{}", kind.extension()))
        .tempfile_in(tmp_dir)
        .with_context(|| "failed to create upload temp file")?;
    file.write_all(bytes)
        .with_context(|| "failed to write upload temp file")?;
    file.flush()
        .with_context(|| "failed to flush upload temp file")?;
    debug!(
        "extracting {} bytes of {:?} from {}",
        bytes.len(),
        kind,
        file.path().display()
    );
    extract_text_from_path(kind, file.path())
}

pub fn extract_text_from_path(kind: DocumentKind, path: &Path) -> Result<String> {
    match kind {
        DocumentKind::Pdf => pdf::extract_pdf(path),
        DocumentKind::Docx => office::extract_docx(path),
        DocumentKind::Pptx => office::extract_pptx(path),
        DocumentKind::Xls | DocumentKind::Xlsx => spreadsheet::extract_workbook(path),
    }
}

pub fn resolve_tmp_dir(configured: Option<&str>) -> PathBuf {
    match configured {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => std::env::temp_dir().join("doc-translator"),
    }
}
