use std::sync::Arc;

use nh_core::{Config, Error, InferenceModel, Result};

pub mod dummy;
pub mod openrouter;

use dummy::DummyModel;
use openrouter::OpenRouterModel;

pub const AVAILABLE_MODELS: [&str; 2] = ["openrouter", "dummy"];

/// Builds the enrichment model named on the command line.
pub fn create_model(config: &Config, name: &str) -> Result<Arc<dyn InferenceModel>> {
    match name.to_lowercase().as_str() {
        "openrouter" => Ok(Arc::new(OpenRouterModel::new(config)?)),
        "dummy" => Ok(Arc::new(DummyModel::new())),
        other => Err(Error::Config(format!(
            "Unknown model {}. Available models: {}",
            other,
            AVAILABLE_MODELS.join(", ")
        ))),
    }
}
