//! Scorer backed by a local Ollama model.

use crate::domain::entities::item::Item;
use crate::domain::error::DomainError;
use crate::domain::ports::scorer::Scorer;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Ancestors included in the prompt, nearest first.
const MAX_CONTEXT: usize = 5;

pub struct OllamaScorer {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaScorer {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn prompt(item: &Item, context: &[&Item]) -> String {
        let mut prompt = String::from(
            "Rate the sentiment of the post below from 0 (very negative) to 100 (very positive). \
             Reply with a single number.\n\n",
        );
        // Oldest ancestor first reads like the thread.
        for (depth, parent) in context.iter().take(MAX_CONTEXT).rev().enumerate() {
            prompt.push_str(&format!("Context {}: {}\n", depth + 1, parent.text));
        }
        prompt.push_str(&format!("Post: {}\n", item.text));
        prompt
    }
}

/// Last number in `reply`, clamped to `0..=100`. Reasoning models think out
/// loud before answering, so earlier numbers are ignored.
pub fn parse_score(reply: &str) -> Option<f64> {
    // Drop a <think>...</think> preamble if present.
    let answer = reply.rsplit("</think>").next().unwrap_or(reply);
    answer
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter_map(|token| token.trim_matches('.').parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .last()
        .map(|v| v.clamp(0.0, 100.0))
}

#[async_trait::async_trait]
impl Scorer for OllamaScorer {
    async fn score(&self, item: &Item, context: &[&Item]) -> Result<f64, DomainError> {
        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: &self.model,
                prompt: Self::prompt(item, context),
                stream: false,
            })
            .send()
            .await
            .map_err(|e| DomainError::Scoring(format!("Ollama API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Scoring(format!("Ollama API {status}: {body}")));
        }

        let result: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Scoring(format!("Parse error: {e}")))?;
        parse_score(&result.response)
            .ok_or_else(|| DomainError::Scoring(format!("no score in model reply: {}", result.response.trim())))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
