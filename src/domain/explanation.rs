use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Llm,
    Fallback,
}

/// Narrative explanation of an audit result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub summary: String,
    pub analysis: String,
    pub recommendations: String,
    pub confidence: String,
    pub source: ExplanationSource,
    /// Set when the fallback replaced a failed generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Explanation {
    pub fn fallback(dp_difference: Option<f64>) -> Self {
        match dp_difference {
            None => Self {
                summary: "No fairness metric available".to_string(),
                analysis: "Metric computation failed".to_string(),
                recommendations: "Retry with valid dataset".to_string(),
                confidence: "0".to_string(),
                source: ExplanationSource::Fallback,
                error: None,
            },
            Some(dp) => {
                let summary = format!(
                    "Demographic parity difference = {:.4}. Groups with lower selection rates are disadvantaged.",
                    dp
                );
                Self {
                    analysis: summary.clone(),
                    summary,
                    recommendations: "- Reweight training examples\n- Remove / mask proxy features"
                        .to_string(),
                    confidence: "50".to_string(),
                    source: ExplanationSource::Fallback,
                    error: None,
                }
            }
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_without_metric() {
        let explanation = Explanation::fallback(None);
        assert_eq!(explanation.summary, "No fairness metric available");
        assert_eq!(explanation.confidence, "0");
    }

    #[test]
    fn test_fallback_formats_dp_difference() {
        let explanation = Explanation::fallback(Some(0.123456));
        assert!(explanation.summary.starts_with("Demographic parity difference = 0.1235."));
        assert_eq!(explanation.confidence, "50");
        assert_eq!(explanation.source, ExplanationSource::Fallback);
    }
}
