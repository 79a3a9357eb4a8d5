use serde::{Deserialize, Serialize};

/// Report returned when the completion API produced no usable text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "(No response)";

/// Successful diagnosis payload, relayed verbatim from the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub report: String,
}

impl DiagnosisReport {
    pub fn from_completion(content: Option<String>) -> Self {
        let report = content
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string());
        Self { report }
    }
}
