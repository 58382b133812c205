use crate::domain::audit::AuditOutcome;
use crate::domain::explanation::{Explanation, ExplanationSource};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::response::{clean_llm_response, extract_json_object};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

const BASE_PROMPT: &str = "You are an expert ML auditor. Given the following fairness metrics for an ML model/dataset, produce:
1) A concise summary (2-3 sentences)
2) An explanation which groups are disadvantaged and why (3-4 sentences)
3) Two recommended mitigation steps (bulleted)
4) A confidence score (0-100)

Return JSON with keys: summary, analysis, recommendations, confidence.
Metrics: ";

const SUMMARY_PREVIEW_CHARS: usize = 250;

/// Turns audit metrics into a narrative. Never fails: any model problem
/// degrades to the deterministic fallback.
pub struct ExplainUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    config: LLMConfig,
}

impl ExplainUseCase {
    pub fn new(llm_client: Arc<dyn LLMClient + Send + Sync>, config: LLMConfig) -> Self {
        Self { llm_client, config }
    }

    pub async fn execute(&self, metrics: &AuditOutcome) -> Explanation {
        // without protected columns only the score carries dp
        let dp = metrics.result().and_then(|r| {
            r.primary_dp_difference()
                .or_else(|| r.fairness_score.map(|score| (100.0 - score) / 100.0))
        });

        if !self.config.is_enabled() {
            info!("Explanation model not configured; using fallback");
            return Explanation::fallback(dp);
        }

        let metrics_json = match serde_json::to_string(metrics) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialize metrics for the prompt");
                return Explanation::fallback(dp).with_error(e.to_string());
            }
        };
        let prompt = format!("{}{}\n", BASE_PROMPT, metrics_json);

        match self.llm_client.generate(&self.config, "", &prompt).await {
            Ok(raw) => parse_explanation(&raw),
            Err(e) => {
                warn!(error = %e, "Explanation generation failed; using fallback");
                Explanation::fallback(dp).with_error(e.to_string())
            }
        }
    }
}

/// Structured reply when it contains a JSON object, otherwise the raw text
/// wrapped into the same four fields.
pub fn parse_explanation(raw: &str) -> Explanation {
    let cleaned = clean_llm_response(raw);

    match extract_json_object(&cleaned) {
        Some(map) => Explanation {
            summary: text_field(&map, "summary"),
            analysis: text_field(&map, "analysis"),
            recommendations: text_field(&map, "recommendations"),
            confidence: text_field(&map, "confidence"),
            source: ExplanationSource::Llm,
            error: None,
        },
        None => Explanation {
            summary: cleaned.chars().take(SUMMARY_PREVIEW_CHARS).collect(),
            analysis: cleaned,
            recommendations: "See text".to_string(),
            confidence: "N/A".to_string(),
            source: ExplanationSource::Llm,
            error: None,
        },
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => format!("- {}", s.trim_start_matches("- ")),
                other => format!("- {}", other),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => other.to_string(),
    }
}
