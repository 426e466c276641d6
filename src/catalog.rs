use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::warn;

use crate::languages::{LanguagePair, SupportedLanguages, normalize_code};

/// One model invocation on a translation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub pair: LanguagePair,
    pub model: String,
}

/// Immutable language-pair to model table, built once at startup.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: BTreeMap<LanguagePair, String>,
}

impl ModelCatalog {
    /// Builds the catalog from `"src-tgt" = "model"` entries, dropping entries
    /// with malformed keys, unsupported languages, or a language translated
    /// into itself.
    pub fn from_entries(
        entries: &BTreeMap<String, String>,
        languages: &SupportedLanguages,
    ) -> Self {
        let mut models = BTreeMap::new();
        for (key, model) in entries {
            let pair = match LanguagePair::parse_key(key) {
                Ok(pair) => pair,
                Err(err) => {
                    warn!("ignoring catalog entry {} ({}): {}", key, model, err);
                    continue;
                }
            };
            if pair.source == pair.target {
                warn!("ignoring catalog entry {} ({}): same language", key, model);
                continue;
            }
            if !pair.is_supported(languages) {
                warn!(
                    "ignoring catalog entry {} ({}): unsupported language",
                    key, model
                );
                continue;
            }
            let model = model.trim();
            if model.is_empty() {
                continue;
            }
            models.insert(pair, model.to_string());
        }
        Self { models }
    }

    pub fn model_for(&self, pair: &LanguagePair) -> Option<&str> {
        self.models.get(pair).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&LanguagePair, &str)> {
        self.models
            .iter()
            .map(|(pair, model)| (pair, model.as_str()))
    }

    /// Shortest chain of models from `source` to `target`.
    ///
    /// Intermediate languages are restricted to `pivots` and the chain holds at
    /// most `max_hops` models. A direct entry is always preferred. Returns an
    /// empty path when `source == target`.
    pub fn resolve(
        &self,
        source: &str,
        target: &str,
        pivots: &[String],
        max_hops: usize,
    ) -> Option<Vec<Hop>> {
        let source = normalize_code(source);
        let target = normalize_code(target);
        if source == target {
            return Some(Vec::new());
        }

        let mut previous: HashMap<String, (String, Hop)> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back((source.clone(), 0usize));

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= max_hops {
                continue;
            }
            // Edges are visited in catalog order so the result is stable.
            for (pair, model) in self.models.range(first_pair_from(&node)..) {
                if pair.source != node {
                    break;
                }
                let next = &pair.target;
                if *next == source || previous.contains_key(next) {
                    continue;
                }
                let is_target = *next == target;
                if !is_target && !pivots.iter().any(|pivot| pivot == next) {
                    continue;
                }
                previous.insert(
                    next.clone(),
                    (
                        node.clone(),
                        Hop {
                            pair: pair.clone(),
                            model: model.clone(),
                        },
                    ),
                );
                if is_target {
                    return Some(rebuild_path(&previous, &source, &target));
                }
                queue.push_back((next.clone(), depth + 1));
            }
        }
        None
    }

    /// Every target reachable from `source` under the given routing limits.
    pub fn reachable_targets(
        &self,
        source: &str,
        languages: &SupportedLanguages,
        pivots: &[String],
        max_hops: usize,
    ) -> Vec<String> {
        languages
            .codes()
            .iter()
            .filter(|target| target.as_str() != normalize_code(source))
            .filter(|target| self.resolve(source, target, pivots, max_hops).is_some())
            .cloned()
            .collect()
    }
}

fn first_pair_from(source: &str) -> LanguagePair {
    LanguagePair {
        source: source.to_string(),
        target: String::new(),
    }
}

fn rebuild_path(
    previous: &HashMap<String, (String, Hop)>,
    source: &str,
    target: &str,
) -> Vec<Hop> {
    let mut path = Vec::new();
    let mut node = target.to_string();
    while node != source {
        let Some((parent, hop)) = previous.get(&node) else {
            break;
        };
        path.push(hop.clone());
        node = parent.clone();
    }
    path.reverse();
    path
}
