use anyhow::{Result, anyhow};
use std::fmt;

mod detect;

pub use detect::detect_language;

/// Fixed set of two-letter codes the service accepts.
#[derive(Debug, Clone)]
pub struct SupportedLanguages {
    codes: Vec<String>,
}

impl SupportedLanguages {
    pub fn new(codes: &[String]) -> Result<Self> {
        let mut normalized: Vec<String> = Vec::new();
        for code in codes {
            let code = normalize_code(code);
            if !is_well_formed(&code) {
                return Err(anyhow!(
                    "invalid language code '{}' (expected two ASCII letters)",
                    code
                ));
            }
            if !normalized.contains(&code) {
                normalized.push(code);
            }
        }
        if normalized.is_empty() {
            return Err(anyhow!("supported language list is empty"));
        }
        Ok(Self { codes: normalized })
    }

    pub fn contains(&self, code: &str) -> bool {
        let code = normalize_code(code);
        self.codes.iter().any(|known| *known == code)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: normalize_code(source),
            target: normalize_code(target),
        }
    }

    pub fn parse_key(key: &str) -> Result<Self> {
        let (source, target) = key
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("invalid language pair key '{}' (expected src-tgt)", key))?;
        let pair = Self::new(source, target);
        if !is_well_formed(&pair.source) || !is_well_formed(&pair.target) {
            return Err(anyhow!(
                "invalid language pair key '{}' (expected two-letter codes)",
                key
            ));
        }
        Ok(pair)
    }

    pub fn key(&self) -> String {
        format!("{}-{}", self.source, self.target)
    }

    pub fn is_supported(&self, languages: &SupportedLanguages) -> bool {
        languages.contains(&self.source) && languages.contains(&self.target)
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

fn is_well_formed(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|ch| ch.is_ascii_lowercase())
}
