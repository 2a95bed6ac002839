pub mod openai;

use std::collections::HashMap;

use serde::Serialize;
use ts_rs::TS;

pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DMR_DEFAULT_BASE_URL: &str = "http://localhost:12434/engines/llama.cpp/v1";
pub const DMR_PROVIDER_NAME: &str = "Docker Model Runner";

/// Everything a provider call needs, resolved at call time. Nothing here is
/// global: build one per request from a `Credentials` source.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub headers: Vec<(String, String)>,
    pub query_params: Vec<(String, String)>,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: without_trailing_slash(base_url.into()),
            api_key: None,
            headers: Vec::new(),
            query_params: Vec::new(),
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

fn without_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// API-key lookup: explicit overrides first, then the process environment.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    overrides: HashMap<String, String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn resolve(&self, key: &str) -> Option<String> {
        self.overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Groq,
    Xai,
    Dmr,
}

pub fn openai(credentials: &Credentials) -> ProviderSettings {
    ProviderSettings::new("https://api.openai.com/v1")
        .with_api_key(credentials.resolve("OPENAI_API_KEY"))
}

pub fn anthropic(credentials: &Credentials) -> ProviderSettings {
    ProviderSettings::new("https://api.anthropic.com/v1")
        .with_api_key(credentials.resolve("ANTHROPIC_API_KEY"))
}

pub fn groq(credentials: &Credentials) -> ProviderSettings {
    ProviderSettings::new("https://api.groq.com/openai/v1")
        .with_api_key(credentials.resolve("GROQ_API_KEY"))
}

pub fn xai(credentials: &Credentials) -> ProviderSettings {
    ProviderSettings::new("https://api.x.ai/v1").with_api_key(credentials.resolve("XAI_API_KEY"))
}

/// Local Docker Model Runner endpoint. No key; the base URL can be moved
/// with the LLAMA3.2_URL variable the original deployment used.
pub fn dmr(credentials: &Credentials) -> ProviderSettings {
    let base_url = credentials
        .resolve("LLAMA3.2_URL")
        .unwrap_or_else(|| DMR_DEFAULT_BASE_URL.to_string());
    ProviderSettings::new(base_url)
}

pub fn settings_for(kind: ProviderKind, credentials: &Credentials) -> ProviderSettings {
    match kind {
        ProviderKind::OpenAi => openai(credentials),
        ProviderKind::Anthropic => anthropic(credentials),
        ProviderKind::Groq => groq(credentials),
        ProviderKind::Xai => xai(credentials),
        ProviderKind::Dmr => dmr(credentials),
    }
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ModelInfo {
    pub provider: String,
    pub name: String,
    pub description: String,
    pub api_version: String,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CatalogModel {
    pub id: String,
    pub kind: ProviderKind,
    /// Model id as the upstream API knows it.
    pub upstream_id: String,
    /// Whether completions carry a `<think>` block to split out.
    pub extract_reasoning: bool,
    pub info: ModelInfo,
}

fn catalog_model(
    id: &str,
    kind: ProviderKind,
    upstream_id: &str,
    extract_reasoning: bool,
    provider: &str,
    name: &str,
    description: &str,
    capabilities: &[&str],
) -> CatalogModel {
    CatalogModel {
        id: id.to_string(),
        kind,
        upstream_id: upstream_id.to_string(),
        extract_reasoning,
        info: ModelInfo {
            provider: provider.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            api_version: upstream_id.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        },
    }
}

/// The models the UI offers, with their routing and display metadata.
pub fn catalog() -> Vec<CatalogModel> {
    vec![
        catalog_model(
            "gpt-4.1-mini",
            ProviderKind::OpenAi,
            "gpt-4.1-mini",
            false,
            "OpenAI",
            "GPT-4.1 Mini",
            "Compact version of OpenAI's GPT-4.1 with good balance of capabilities, including vision.",
            &["Balance", "Creative", "Vision"],
        ),
        catalog_model(
            "claude-3-7-sonnet",
            ProviderKind::Anthropic,
            "claude-3-7-sonnet-20250219",
            false,
            "Anthropic",
            "Claude 3.7 Sonnet",
            "Latest version of Anthropic's Claude 3.7 Sonnet with strong reasoning and coding capabilities.",
            &["Reasoning", "Efficient", "Agentic"],
        ),
        catalog_model(
            "qwen-qwq",
            ProviderKind::Groq,
            "qwen-qwq-32b",
            true,
            "Groq",
            "Qwen QWQ",
            "Latest version of Alibaba's Qwen QWQ with strong reasoning and coding capabilities.",
            &["Reasoning", "Efficient", "Agentic"],
        ),
        catalog_model(
            "grok-3-mini",
            ProviderKind::Xai,
            "grok-3-mini-latest",
            false,
            "XAI",
            "Grok 3 Mini",
            "Latest version of XAI's Grok 3 Mini with strong reasoning and coding capabilities.",
            &["Reasoning", "Efficient", "Agentic"],
        ),
        catalog_model(
            "llama3.2",
            ProviderKind::Dmr,
            "ai/llama3.2",
            true,
            DMR_PROVIDER_NAME,
            "Llama 3.2",
            "Meta's Llama 3.2 model running locally via Docker Model Runner.",
            &["Local", "Efficient", "Open Source"],
        ),
        catalog_model(
            "qwen3:4b-F16",
            ProviderKind::Dmr,
            "jimclark106/qwen3:4b-F16",
            true,
            DMR_PROVIDER_NAME,
            "Qwen3 4B F16",
            "Qwen3 4B model without quantization running via Docker Model Runner.",
            &["Local", "Open Source"],
        ),
    ]
}

pub fn find_model(id: &str) -> Option<CatalogModel> {
    catalog().into_iter().find(|model| model.id == id)
}

/// The locally runnable subset of the catalog.
pub fn local_models() -> Vec<CatalogModel> {
    catalog()
        .into_iter()
        .filter(|model| model.info.provider == DMR_PROVIDER_NAME)
        .collect()
}

/// Splits a leading `<think>…</think>` block out of a completion, for
/// models that emit their reasoning inline.
pub fn split_reasoning(content: &str) -> (Option<String>, String) {
    let trimmed = content.trim_start();
    let Some(rest) = trimmed.strip_prefix("<think>") else {
        return (None, content.to_string());
    };
    match rest.split_once("</think>") {
        Some((reasoning, answer)) => (
            Some(reasoning.trim().to_string()),
            answer.trim_start().to_string(),
        ),
        None => (None, content.to_string()),
    }
}
