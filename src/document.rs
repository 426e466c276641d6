use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::engine::{InferenceError, TranslationEngine};
use crate::extract::{self, DocumentKind};
use crate::languages::{detect_language, normalize_code};
use crate::translator::{TranslateError, Translator};

pub const SAME_LANGUAGE_NOTE: &str = "Déjà dans la langue choisie.";

/// ISO 639 "undetermined", reported when no language can be identified.
const UNDETERMINED_LANGUAGE: &str = "und";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Format non supporté")]
    UnsupportedFormat(String),

    #[error("Aucun texte détecté")]
    EmptyExtraction,

    #[error("Langue non supportée : {0}")]
    UnsupportedLanguage(String),

    #[error("Aucun modèle de traduction trouvé.")]
    NoTranslationPath {
        source_lang: String,
        target_lang: String,
    },

    #[error("Échec de la traduction : {0}")]
    Inference(#[source] InferenceError),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<TranslateError> for DocumentError {
    fn from(err: TranslateError) -> Self {
        match err {
            TranslateError::NotAvailable {
                source_lang,
                target_lang,
            } => DocumentError::NoTranslationPath {
                source_lang,
                target_lang,
            },
            TranslateError::Inference(err) => DocumentError::Inference(err),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub language: String,
    /// Skips detection when set.
    pub source_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentResponse {
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Upload in, translated text out.
#[derive(Debug, Clone)]
pub struct DocumentService<E: TranslationEngine> {
    translator: Translator<E>,
    tmp_dir: PathBuf,
}

impl<E: TranslationEngine + 'static> DocumentService<E> {
    pub fn new(translator: Translator<E>, tmp_dir: PathBuf) -> Self {
        Self {
            translator,
            tmp_dir,
        }
    }

    pub fn translator(&self) -> &Translator<E> {
        &self.translator
    }

    pub async fn translate_document(
        &self,
        upload: Upload,
    ) -> Result<DocumentResponse, DocumentError> {
        let Upload {
            file_name,
            bytes,
            language,
            source_language,
        } = upload;
        let kind = DocumentKind::from_file_name(&file_name)
            .ok_or_else(|| DocumentError::UnsupportedFormat(file_name.clone()))?;

        let tmp_dir = self.tmp_dir.clone();
        let text =
            tokio::task::spawn_blocking(move || extract::extract_text(kind, &bytes, &tmp_dir))
                .await
                .context("extraction task failed")?
                .with_context(|| format!("failed to extract text from {}", file_name))?;
        if text.trim().is_empty() {
            return Err(DocumentError::EmptyExtraction);
        }

        let source = match source_language {
            Some(code) if !code.trim().is_empty() => normalize_code(&code),
            _ => detect_language(&text).unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string()),
        };
        if !self.translator.languages().contains(&source) {
            return Err(DocumentError::UnsupportedLanguage(source));
        }

        let target = normalize_code(&language);
        info!(
            "{}: {:?}, {} chars, {} -> {}",
            file_name,
            kind,
            text.chars().count(),
            source,
            target
        );
        if source == target {
            return Ok(DocumentResponse {
                translation: text,
                note: Some(SAME_LANGUAGE_NOTE.to_string()),
            });
        }

        let translation = self.translator.translate(&text, &source, &target).await?;
        Ok(DocumentResponse {
            translation,
            note: None,
        })
    }
}
