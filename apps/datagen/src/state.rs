use std::sync::Arc;

use crate::config::Config;
use crate::raster::{ExternalRasterizer, Rasterizer};

/// Shared pipeline state handed to every stage.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Config,
    /// Pluggable rasterizer. Default: ExternalRasterizer over wkhtmltopdf + pdftoppm.
    pub rasterizer: Arc<dyn Rasterizer>,
}

impl PipelineContext {
    pub fn new(config: Config) -> Self {
        let rasterizer = Arc::new(ExternalRasterizer::new(
            config.wkhtmltopdf_bin.clone(),
            config.pdftoppm_bin.clone(),
            config.dpi,
        ));
        Self::with_rasterizer(config, rasterizer)
    }

    pub fn with_rasterizer(config: Config, rasterizer: Arc<dyn Rasterizer>) -> Self {
        PipelineContext { config, rasterizer }
    }
}
