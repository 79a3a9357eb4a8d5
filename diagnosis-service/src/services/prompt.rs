//! Prompt construction for the diagnostics assistant.

use super::completion::ChatMessage;
use crate::models::{render_field, DiagnosisRequest};

/// Fixed instruction describing the assistant and the report layout.
pub const SYSTEM_PROMPT: &str = "\
You are the RVS Garage Staff Diagnostics Assistant. Provide a structured DIAGNOSIS REPORT in this format:
DIAGNOSIS REPORT
Vehicle: [Year Make Model, fuel type, transmission, mileage]
Symptom / Fault Code: [description]
Likely Causes (in order):
1. [cause]
2. [cause]
3. [cause]
Test Plan:
1. [step]
2. [step]
3. [step]
Labour Est.: [hours]
Parts Est.: [£ range]
Notes: [any special considerations]";

/// Render the per-request user message as a single sentence.
pub fn user_message(req: &DiagnosisRequest) -> String {
    format!(
        "Vehicle info: {}, {} {}, {}, {}, {}, {} miles. Symptom/Fault Code: {}. Recent Work: {}",
        render_field(req.registration.as_ref()),
        render_field(req.make.as_ref()),
        render_field(req.model.as_ref()),
        render_field(req.year.as_ref()),
        render_field(req.fuel_type.as_ref()),
        render_field(req.transmission.as_ref()),
        render_field(req.mileage.as_ref()),
        render_field(req.symptom_or_fault_code.as_ref()),
        render_field(req.recent_work.as_ref()),
    )
}

/// The two-message conversation sent upstream: system, then user.
pub fn conversation(req: &DiagnosisRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_message(req)),
    ]
}
