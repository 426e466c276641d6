pub mod catalog;
pub mod chunker;
pub mod document;
pub mod engine;
pub mod extract;
pub mod languages;
pub mod logging;
pub mod server;
pub mod settings;
#[cfg(test)]
mod test_util;
mod translator;

pub use catalog::{Hop, ModelCatalog};
pub use chunker::chunk_text;
pub use document::{DocumentError, DocumentResponse, DocumentService, Upload};
pub use engine::{EngineFuture, HuggingFaceEngine, InferenceError, RetryPolicy, TranslationEngine};
pub use languages::{LanguagePair, SupportedLanguages};
pub use translator::{TranslateError, Translator};

use anyhow::Result;
use settings::Settings;

/// Wires the production engine, router and upload scratch directory.
pub fn build_service(settings: &Settings) -> Result<DocumentService<HuggingFaceEngine>> {
    let engine = HuggingFaceEngine::from_settings(settings);
    let translator = Translator::from_settings(engine, settings)?;
    let tmp_dir = extract::resolve_tmp_dir(settings.server_tmp_dir.as_deref());
    Ok(DocumentService::new(translator, tmp_dir))
}
