pub mod diagnosis;
pub mod report;

pub use diagnosis::{render_field, DiagnosisRequest, MISSING_FIELD, NULL_FIELD};
pub use report::{DiagnosisReport, NO_RESPONSE_PLACEHOLDER};
