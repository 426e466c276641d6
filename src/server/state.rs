use crate::document::DocumentService;
use crate::engine::TranslationEngine;

pub(crate) struct ServerState<E: TranslationEngine> {
    pub(crate) service: DocumentService<E>,
}
