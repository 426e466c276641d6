use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_addr: String,
    pub server_tmp_dir: Option<String>,
    pub max_upload_bytes: usize,
    pub languages: Vec<String>,
    pub max_chunk_length: usize,
    pub pivot_languages: Vec<String>,
    pub max_hops: usize,
    pub engine_base_url: String,
    pub engine_timeout_secs: u64,
    pub engine_max_retries: usize,
    pub engine_api_key_env: String,
    pub models: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_addr: "0.0.0.0:8000".to_string(),
            server_tmp_dir: None,
            max_upload_bytes: 50 * 1024 * 1024,
            languages: Vec::new(),
            max_chunk_length: 512,
            pivot_languages: vec!["en".to_string()],
            max_hops: 2,
            engine_base_url: "https://api-inference.huggingface.co/models".to_string(),
            engine_timeout_secs: 120,
            engine_max_retries: 3,
            engine_api_key_env: "HF_TOKEN".to_string(),
            models: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server: Option<ServerSettings>,
    translation: Option<TranslationSettings>,
    engine: Option<EngineSettings>,
    models: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    addr: Option<String>,
    tmp_dir: Option<String>,
    max_upload_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslationSettings {
    languages: Option<Vec<String>>,
    max_chunk_length: Option<usize>,
    pivot_languages: Option<Vec<String>>,
    max_hops: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct EngineSettings {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<usize>,
    api_key_env: Option<String>,
}

/// Built-in settings only, without looking at the filesystem.
pub fn builtin_settings() -> Result<Settings> {
    let mut settings = Settings::default();
    settings.merge_str(DEFAULT_SETTINGS_TOML, "built-in settings.toml")?;
    Ok(settings)
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = builtin_settings()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings.merge_str(&content, &path.display().to_string())?;
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn merge_str(&mut self, content: &str, origin: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)
            .with_context(|| format!("failed to parse settings: {}", origin))?;
        self.merge(parsed);
        Ok(())
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(server) = incoming.server {
            if let Some(addr) = server.addr {
                if !addr.trim().is_empty() {
                    self.server_addr = addr;
                }
            }
            if let Some(dir) = server.tmp_dir {
                if !dir.trim().is_empty() {
                    self.server_tmp_dir = Some(dir);
                }
            }
            if let Some(limit) = server.max_upload_bytes {
                if limit > 0 {
                    self.max_upload_bytes = limit;
                }
            }
        }
        if let Some(translation) = incoming.translation {
            if let Some(languages) = translation.languages {
                self.languages = normalize_codes(languages);
            }
            if let Some(length) = translation.max_chunk_length {
                if length > 0 {
                    self.max_chunk_length = length;
                }
            }
            if let Some(pivots) = translation.pivot_languages {
                self.pivot_languages = normalize_codes(pivots);
            }
            if let Some(hops) = translation.max_hops {
                if hops > 0 {
                    self.max_hops = hops;
                }
            }
        }
        if let Some(engine) = incoming.engine {
            if let Some(url) = engine.base_url {
                if !url.trim().is_empty() {
                    self.engine_base_url = url.trim().trim_end_matches('/').to_string();
                }
            }
            if let Some(secs) = engine.timeout_secs {
                if secs > 0 {
                    self.engine_timeout_secs = secs;
                }
            }
            if let Some(retries) = engine.max_retries {
                self.engine_max_retries = retries;
            }
            if let Some(name) = engine.api_key_env {
                if !name.trim().is_empty() {
                    self.engine_api_key_env = name.trim().to_string();
                }
            }
        }
        if let Some(models) = incoming.models {
            for (key, value) in models {
                let key = key.trim().to_lowercase();
                let value = value.trim().to_string();
                // An empty model id removes an inherited entry.
                if value.is_empty() {
                    self.models.remove(&key);
                } else {
                    self.models.insert(key, value);
                }
            }
        }
    }
}

fn normalize_codes(codes: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for code in codes {
        let code = code.trim().to_lowercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}
