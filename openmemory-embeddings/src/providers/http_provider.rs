//! HTTP-backed embedding providers (spec.md §4.C). A single struct
//! parameterized by `ProviderKind` rather than one type per vendor —
//! the wire shapes differ but the retry/fallback/deadline plumbing
//! around them doesn't, so that plumbing lives once in
//! `crate::router::RouterEmbedder` instead of being duplicated three
//! times. Grounded on the sibling system's per-backend provider module
//! layout (one file per backend), adapted to a single generic struct
//! since these backends only ever need request/response shape, not
//! behavior, to differ.

use std::time::Duration;

use serde_json::Value;

use openmemory_core::errors::{OpenMemoryError, OpenMemoryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
    Ollama,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(Self::OpenAi),
            "gemini" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    fn env_api_key(self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Ollama => "ollama",
        }
    }
}

/// A single HTTP-backed provider. Produces one vector per call; the
/// router assigns that same vector to every requested sector, since none
/// of these vendors expose sector-conditioned embeddings (SPEC_FULL.md
/// §4.C resolution, documented in DESIGN.md).
pub struct HttpEmbedProvider {
    kind: ProviderKind,
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
    dims: usize,
    deadline_secs: u64,
}

impl HttpEmbedProvider {
    pub fn new(kind: ProviderKind, base_url: Option<&str>, dims: usize, deadline_secs: u64) -> OpenMemoryResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(deadline_secs))
            .build()
            .map_err(|e| OpenMemoryError::EmbedderUnavailable {
                reason: format!("failed to build HTTP client: {e}"),
                fallback_used: false,
            })?;

        Ok(Self {
            kind,
            client,
            base_url: base_url.unwrap_or_else(|| kind.default_base_url()).to_string(),
            api_key: kind.env_api_key().and_then(|var| std::env::var(var).ok()),
            dims,
            deadline_secs,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// True when the credentials this provider needs are actually present.
    /// Ollama needs none (local daemon); the hosted providers need an API key.
    pub fn is_configured(&self) -> bool {
        match self.kind {
            ProviderKind::Ollama => true,
            ProviderKind::OpenAi | ProviderKind::Gemini => self.api_key.is_some(),
        }
    }

    /// Perform one embedding call. No retry here — `RouterEmbedder` owns
    /// the retry/backoff loop so every provider, HTTP or synthetic, shares
    /// one policy.
    pub fn embed_one(&self, text: &str) -> OpenMemoryResult<Vec<f32>> {
        if !self.is_configured() {
            return Err(OpenMemoryError::EmbedderUnavailable {
                reason: format!("{} missing required API key", self.kind.name()),
                fallback_used: false,
            });
        }

        let response = match self.kind {
            ProviderKind::OpenAi => self.call_openai(text),
            ProviderKind::Gemini => self.call_gemini(text),
            ProviderKind::Ollama => self.call_ollama(text),
        }?;

        if response.len() != self.dims {
            return Err(OpenMemoryError::EmbedderUnavailable {
                reason: format!(
                    "{} returned {} dims, configured for {}",
                    self.kind.name(),
                    response.len(),
                    self.dims
                ),
                fallback_used: false,
            });
        }
        Ok(response)
    }

    fn map_transport_err(&self, e: reqwest::Error) -> OpenMemoryError {
        if e.is_timeout() {
            OpenMemoryError::Timeout {
                operation: format!("{}::embed", self.kind.name()),
                deadline_ms: self.deadline_secs * 1000,
            }
        } else {
            OpenMemoryError::EmbedderUnavailable {
                reason: format!("{} request failed: {e}", self.kind.name()),
                fallback_used: false,
            }
        }
    }

    fn check_retry_after(&self, response: &reqwest::blocking::Response) {
        if response.status().as_u16() == 429 {
            if let Some(value) = response.headers().get(reqwest::header::RETRY_AFTER) {
                if let Ok(secs) = value.to_str().unwrap_or("").parse::<u64>() {
                    std::thread::sleep(Duration::from_secs(secs.min(30)));
                }
            }
        }
    }

    fn call_openai(&self, text: &str) -> OpenMemoryResult<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": "text-embedding-3-small",
            "input": text,
        });
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_err(e))?;
        self.check_retry_after(&response);
        if !response.status().is_success() {
            return Err(OpenMemoryError::EmbedderUnavailable {
                reason: format!("openai responded {}", response.status()),
                fallback_used: false,
            });
        }
        let json: Value = response.json().map_err(|e| self.map_transport_err(e))?;
        extract_f32_array(json.pointer("/data/0/embedding"), "openai")
    }

    fn call_gemini(&self, text: &str) -> OpenMemoryResult<Vec<f32>> {
        let url = format!(
            "{}/models/embedding-001:embedContent?key={}",
            self.base_url,
            self.api_key.as_deref().unwrap_or_default()
        );
        let body = serde_json::json!({
            "content": { "parts": [{ "text": text }] },
        });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_err(e))?;
        self.check_retry_after(&response);
        if !response.status().is_success() {
            return Err(OpenMemoryError::EmbedderUnavailable {
                reason: format!("gemini responded {}", response.status()),
                fallback_used: false,
            });
        }
        let json: Value = response.json().map_err(|e| self.map_transport_err(e))?;
        extract_f32_array(json.pointer("/embedding/values"), "gemini")
    }

    fn call_ollama(&self, text: &str) -> OpenMemoryResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": "nomic-embed-text",
            "prompt": text,
        });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_err(e))?;
        self.check_retry_after(&response);
        if !response.status().is_success() {
            return Err(OpenMemoryError::EmbedderUnavailable {
                reason: format!("ollama responded {}", response.status()),
                fallback_used: false,
            });
        }
        let json: Value = response.json().map_err(|e| self.map_transport_err(e))?;
        extract_f32_array(json.pointer("/embedding"), "ollama")
    }
}

fn extract_f32_array(value: Option<&Value>, provider: &str) -> OpenMemoryResult<Vec<f32>> {
    value
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(Value::as_f64).map(|x| x as f32).collect())
        .ok_or_else(|| OpenMemoryError::EmbedderUnavailable {
            reason: format!("{provider} response missing embedding array"),
            fallback_used: false,
        })
}
