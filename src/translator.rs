use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{Hop, ModelCatalog};
use crate::chunker::chunk_text;
use crate::engine::{InferenceError, TranslationEngine};
use crate::languages::{SupportedLanguages, normalize_code};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("no translation model available for {source_lang}-{target_lang}")]
    NotAvailable {
        source_lang: String,
        target_lang: String,
    },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Routes text through the direct model or a pivot chain of models.
#[derive(Debug, Clone)]
pub struct Translator<E: TranslationEngine> {
    engine: E,
    catalog: ModelCatalog,
    languages: SupportedLanguages,
    max_chunk_length: usize,
    pivots: Vec<String>,
    max_hops: usize,
}

impl<E: TranslationEngine> Translator<E> {
    pub fn new(engine: E, catalog: ModelCatalog, languages: SupportedLanguages) -> Self {
        Self {
            engine,
            catalog,
            languages,
            max_chunk_length: crate::chunker::DEFAULT_MAX_CHUNK_LENGTH,
            pivots: vec!["en".to_string()],
            max_hops: 2,
        }
    }

    pub fn from_settings(engine: E, settings: &Settings) -> Result<Self> {
        let languages = SupportedLanguages::new(&settings.languages)?;
        let catalog = ModelCatalog::from_entries(&settings.models, &languages);
        if catalog.is_empty() {
            warn!("model catalog is empty; every translation request will be rejected");
        } else {
            debug!("model catalog holds {} pairs", catalog.len());
        }
        Ok(Self::new(engine, catalog, languages)
            .with_max_chunk_length(settings.max_chunk_length)
            .with_pivots(settings.pivot_languages.clone(), settings.max_hops))
    }

    pub fn with_max_chunk_length(mut self, max_chunk_length: usize) -> Self {
        if max_chunk_length > 0 {
            self.max_chunk_length = max_chunk_length;
        }
        self
    }

    pub fn with_pivots(mut self, pivots: Vec<String>, max_hops: usize) -> Self {
        self.pivots = pivots.iter().map(|code| normalize_code(code)).collect();
        self.max_hops = max_hops.max(1);
        self
    }

    pub fn languages(&self) -> &SupportedLanguages {
        &self.languages
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Targets reachable from `source` under this translator's routing rules.
    pub fn reachable_targets(&self, source: &str) -> Vec<String> {
        if !self.languages.contains(source) {
            return Vec::new();
        }
        self.catalog
            .reachable_targets(source, &self.languages, &self.pivots, self.max_hops)
    }

    /// Resolves the ordered models to run for `source` into `target`.
    pub fn plan(&self, source: &str, target: &str) -> Result<Vec<Hop>, TranslateError> {
        let not_available = || TranslateError::NotAvailable {
            source_lang: normalize_code(source),
            target_lang: normalize_code(target),
        };
        if !self.languages.contains(source) || !self.languages.contains(target) {
            return Err(not_available());
        }
        self.catalog
            .resolve(source, target, &self.pivots, self.max_hops)
            .ok_or_else(not_available)
    }

    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslateError> {
        let path = self.plan(source, target)?;
        info!(
            "translating {} chars {}-{} via {}",
            text.chars().count(),
            normalize_code(source),
            normalize_code(target),
            describe_path(&path)
        );
        let mut current = text.to_string();
        for hop in &path {
            current = self.run_hop(hop, &current).await?;
        }
        Ok(current)
    }

    async fn run_hop(&self, hop: &Hop, text: &str) -> Result<String, TranslateError> {
        let chunks = chunk_text(text, self.max_chunk_length);
        debug!("{}: {} chunk(s) through {}", hop.pair, chunks.len(), hop.model);
        let mut translated = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            translated.push(self.engine.translate(&hop.model, chunk).await?);
        }
        Ok(translated.join(" "))
    }
}

fn describe_path(path: &[Hop]) -> String {
    if path.is_empty() {
        return "no models".to_string();
    }
    path.iter()
        .map(|hop| hop.model.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{RecordingEngine, test_settings};

    fn build_translator(engine: RecordingEngine) -> Translator<RecordingEngine> {
        Translator::from_settings(engine, &test_settings()).expect("translator")
    }

    #[tokio::test]
    async fn direct_pair_translates_each_chunk_in_order() {
        let engine = RecordingEngine::new();
        let translator = build_translator(engine.clone()).with_max_chunk_length(11);
        let output = translator
            .translate("hello brave new world", "en", "fr")
            .await
            .expect("translation");
        assert_eq!(output, "[en-fr:hello brave] [en-fr:new world]");
        assert_eq!(
            engine.calls(),
            vec![
                ("m/en-fr".to_string(), "hello brave".to_string()),
                ("m/en-fr".to_string(), "new world".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn direct_translation_is_deterministic() {
        let translator = build_translator(RecordingEngine::new());
        let first = translator.translate("un deux trois", "fr", "en").await;
        let second = translator.translate("un deux trois", "fr", "en").await;
        assert_eq!(first.expect("first"), second.expect("second"));
    }

    #[tokio::test]
    async fn pivot_runs_source_model_first_and_rechunks() {
        let engine = RecordingEngine::new();
        let translator = build_translator(engine.clone()).with_max_chunk_length(15);
        let output = translator
            .translate("ni hao shi jie", "zh", "de")
            .await
            .expect("translation");

        let calls = engine.calls();
        assert_eq!(calls[0], ("m/zh-en".to_string(), "ni hao shi jie".to_string()));
        // "[zh-en:ni hao shi jie]" is re-chunked before the second hop.
        assert_eq!(
            calls[1..],
            [
                ("m/en-de".to_string(), "[zh-en:ni hao".to_string()),
                ("m/en-de".to_string(), "shi jie]".to_string()),
            ]
        );
        assert_eq!(output, "[en-de:[zh-en:ni hao] [en-de:shi jie]]");
    }

    #[tokio::test]
    async fn unknown_language_is_not_available_without_engine_calls() {
        let engine = RecordingEngine::new();
        let translator = build_translator(engine.clone());
        let err = translator.translate("text", "en", "xx").await.unwrap_err();
        assert!(matches!(err, TranslateError::NotAvailable { .. }));
        assert_eq!(err.to_string(), "no translation model available for en-xx");
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_path_is_not_available_without_engine_calls() {
        let engine = RecordingEngine::new();
        let mut settings = test_settings();
        settings.models.remove("it-en");
        settings.models.remove("it-ar");
        let translator = Translator::from_settings(engine.clone(), &settings).expect("translator");
        let err = translator.translate("ciao", "it", "ar").await.unwrap_err();
        assert!(matches!(err, TranslateError::NotAvailable { .. }));
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn engine_failure_propagates_as_inference_error() {
        let engine = RecordingEngine::failing_on("m/en-fr");
        let translator = build_translator(engine);
        let err = translator.translate("hello", "en", "fr").await.unwrap_err();
        assert!(matches!(err, TranslateError::Inference(_)));
    }

    #[test]
    fn empty_catalog_still_builds_but_routes_nothing() {
        let mut settings = test_settings();
        settings.models.clear();
        let translator =
            Translator::from_settings(RecordingEngine::new(), &settings).expect("translator");
        assert!(translator.catalog().is_empty());
        assert!(translator.reachable_targets("en").is_empty());
        assert!(matches!(
            translator.plan("en", "fr"),
            Err(TranslateError::NotAvailable { .. })
        ));
    }

    #[test]
    fn reachable_targets_cover_pivot_paths() {
        let translator = build_translator(RecordingEngine::new());
        let targets = translator.reachable_targets("zh");
        assert!(targets.contains(&"de".to_string()));
        assert!(!targets.contains(&"zh".to_string()));
        assert!(translator.reachable_targets("xx").is_empty());
    }
}
