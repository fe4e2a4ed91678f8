use std::path::PathBuf;
use std::sync::Arc;

use crate::db::Store;
use crate::pipeline::ExtractionPipeline;

/// Shared state handed to every handler.
///
/// The pipeline is wired once at startup (constructed engines are passed
/// in, never ambient) and shared read-only across requests.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<Store>,
    pub pipeline: Arc<ExtractionPipeline>,
    pub staging_dir: PathBuf,
}

impl ApiContext {
    pub fn new(store: Store, pipeline: ExtractionPipeline, staging_dir: PathBuf) -> Self {
        Self {
            store: Arc::new(store),
            pipeline: Arc::new(pipeline),
            staging_dir,
        }
    }
}
