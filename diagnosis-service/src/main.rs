use diagnosis_service::config::DiagnosisConfig;
use diagnosis_service::services::metrics::init_metrics;
use diagnosis_service::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = DiagnosisConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "diagnosis-service",
        &config.observability.log_level,
        config.observability.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let app = Application::build(config).await?;

    tracing::info!("RVS Diagnostics listening on http://localhost:{}", app.port());
    app.run_until_stopped().await?;

    Ok(())
}
