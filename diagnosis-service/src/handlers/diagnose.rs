use crate::error::DiagnosisError;
use crate::models::{DiagnosisReport, DiagnosisRequest};
use crate::services::prompt;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    Json,
};
use metrics::{counter, histogram};
use service_core::error::AppError;
use std::time::Instant;

/// `POST /api/diagnose`: render the prompt, call the completion API and
/// relay its text.
pub async fn diagnose(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DiagnosisReport>, DiagnosisError> {
    let _permit = match &state.in_flight {
        Some(limit) => Some(limit.clone().try_acquire_owned().map_err(|_| {
            counter!("diagnosis_requests_total", "outcome" => "rejected").increment(1);
            tracing::warn!("Diagnosis rejected: in-flight limit reached");
            AppError::ServiceUnavailable("too many diagnoses in progress".to_string())
        })?),
        None => None,
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let request = DiagnosisRequest::from_body(content_type, &body).map_err(|e| {
        counter!("diagnosis_requests_total", "outcome" => "local_error").increment(1);
        tracing::error!(error = %e, "Failed to parse diagnosis request body");
        DiagnosisError::Local(e.to_string())
    })?;

    let messages = prompt::conversation(&request);

    let started = Instant::now();
    let result = state.completion.complete(&messages).await;
    histogram!("diagnosis_upstream_duration_seconds").record(started.elapsed().as_secs_f64());

    match result {
        Ok(content) => {
            let report = DiagnosisReport::from_completion(content);
            counter!("diagnosis_requests_total", "outcome" => "report").increment(1);
            tracing::info!(report_len = report.report.len(), "Diagnosis completed");
            Ok(Json(report))
        }
        Err(e) => {
            let err = DiagnosisError::from(e);
            match &err {
                DiagnosisError::Upstream { status, .. } => {
                    counter!("diagnosis_requests_total", "outcome" => "upstream_error")
                        .increment(1);
                    tracing::error!(status, "Completion API rejected diagnosis request");
                }
                other => {
                    counter!("diagnosis_requests_total", "outcome" => "local_error").increment(1);
                    tracing::error!(error = %other, "Completion call failed");
                }
            }
            Err(err)
        }
    }
}
