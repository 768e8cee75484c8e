//! Raw text to structured suggestion, via one completion call.
//!
//! The model's reply is untrusted: it is stripped of markdown fences, parsed
//! as a JSON object, then coerced field by field into an [`AiResult`] that
//! always satisfies the record invariants.

use errors::NormalizeError;
use serde_json::{Map, Value};
use sparks_core::traits::CompletionService;
use sparks_core::types::{AiResult, MAX_TAGS, Priority};
use std::sync::Arc;
use std::time::Instant;

use crate::prompt::{system_prompt, user_message};

pub struct Normalizer {
    completion: Arc<dyn CompletionService>,
}

impl Normalizer {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// Asks the completion service to structure `raw_input`. Never retries.
    pub async fn normalize(
        &self,
        raw_input: &str,
        known_categories: &[String],
    ) -> Result<AiResult, NormalizeError> {
        let system = system_prompt(known_categories);
        let user = user_message(raw_input);

        let start = Instant::now();
        let reply = self.completion.complete(&system, &user).await;
        metrics::histogram!("sparks_completion_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);

        let text = match reply {
            Ok(text) => text,
            Err(e) => {
                let outcome = if e.is_rate_limited() {
                    "rate_limited"
                } else {
                    "upstream_error"
                };
                metrics::counter!("sparks_captures_total", "outcome" => outcome).increment(1);
                tracing::warn!(error = %e, outcome, "Completion failed");
                return Err(e.into());
            }
        };

        match parse_completion(&text, known_categories) {
            Ok(result) => {
                metrics::counter!("sparks_captures_total", "outcome" => "ok").increment(1);
                tracing::info!(
                    category = %result.category,
                    is_new_category = result.is_new_category,
                    priority = %result.priority,
                    "Idea normalized"
                );
                Ok(result)
            }
            Err(e) => {
                metrics::counter!("sparks_captures_total", "outcome" => "malformed").increment(1);
                tracing::warn!(error = %e, "Completion output rejected");
                Err(e)
            }
        }
    }
}

/// Removes a leading fence (with optional language tag) and a trailing fence.
pub fn strip_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned =
            rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    }
    if let Some(rest) = cleaned.trim_end().strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Parses a completion reply into a sanitized suggestion.
pub fn parse_completion(
    text: &str,
    known_categories: &[String],
) -> Result<AiResult, NormalizeError> {
    let cleaned = strip_fences(text);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Object(fields)) => {
            Ok(RawCompletion::from_fields(&fields).sanitize(known_categories))
        }
        _ => Err(NormalizeError::malformed(cleaned)),
    }
}

/// Completion fields as the model produced them, before coercion.
#[derive(Debug, Default)]
struct RawCompletion {
    title: Option<String>,
    summary: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
    priority: Option<String>,
}

impl RawCompletion {
    fn from_fields(fields: &Map<String, Value>) -> Self {
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        let tags = match fields.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            title: text("title"),
            summary: text("summary"),
            category: text("category"),
            tags,
            priority: text("priority"),
        }
    }

    fn sanitize(self, known_categories: &[String]) -> AiResult {
        let priority = self
            .priority
            .and_then(|p| p.parse::<Priority>().ok())
            .unwrap_or_default();

        let (category, is_new_category) = match self.category.map(|c| c.trim().to_string()) {
            Some(category) if !category.is_empty() => {
                let lowered = category.to_lowercase();
                let known = known_categories
                    .iter()
                    .any(|k| k.to_lowercase() == lowered);
                (category, !known)
            }
            _ => (known_categories.first().cloned().unwrap_or_default(), false),
        };

        AiResult {
            title: self.title.unwrap_or_default(),
            summary: self.summary.unwrap_or_default(),
            category,
            tags: self.tags.into_iter().take(MAX_TAGS).collect(),
            priority,
            is_new_category,
        }
    }
}
