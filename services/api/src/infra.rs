use metrics_exporter_prometheus::PrometheusHandle;
use school_select::config::SelectionConfig;
use school_select::error::AppError;
use school_select::workflows::registry::{ImportSummary, RegistryImport, RegistryImporter};
use school_select::workflows::selection::{
    DocumentRenderer, PdfRenderer, SchoolSelectionService,
};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) registry: ImportSummary,
}

/// Import the register from explicit sheets, or the configured path when none are given.
pub(crate) fn load_registry(
    paths: Vec<PathBuf>,
    config: &SelectionConfig,
) -> Result<RegistryImport, AppError> {
    let paths = if paths.is_empty() {
        vec![config.registry_path_or(None)?]
    } else {
        paths
    };

    info!(sheets = paths.len(), "loading school register");
    Ok(RegistryImporter::from_paths(&paths)?)
}

/// Service rendering selection forms as PDF.
pub(crate) fn selection_service(
    import: RegistryImport,
    config: &SelectionConfig,
) -> SchoolSelectionService<PdfRenderer> {
    selection_service_with(import, PdfRenderer::default(), config)
}

pub(crate) fn selection_service_with<D>(
    import: RegistryImport,
    renderer: D,
    config: &SelectionConfig,
) -> SchoolSelectionService<D>
where
    D: DocumentRenderer + 'static,
{
    SchoolSelectionService::new(import.registry.into_shared(), Arc::new(renderer), config)
}

#[cfg(test)]
pub(crate) fn sample_register() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../crates/school-select/School_Register_Sample.csv")
}
