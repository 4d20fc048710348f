use metrics_exporter_prometheus::PrometheusHandle;
use premium_estimator::config::ArtifactConfig;
use premium_estimator::pipeline::{ArtifactBundle, ArtifactError, PredictionService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load and cross-check the artifacts once; the returned service is shared read-only.
pub(crate) fn load_service(
    config: &ArtifactConfig,
) -> Result<Arc<PredictionService>, ArtifactError> {
    let bundle = ArtifactBundle::load(config)?;
    Ok(Arc::new(PredictionService::new(bundle)))
}
