use shared_types::PlanError;
use thiserror::Error;

use crate::layer_names::LayerNameError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Layer name configuration error: {0}")]
    LayerName(#[from] LayerNameError),

    #[error("Unknown extractor '{0}'")]
    UnknownExtractor(String),

    #[error("Plan structure violated: {0}")]
    Structure(#[from] PlanError),
}

impl ExtractError {
    /// Structural errors abort the whole extraction run
    pub fn is_structural(&self) -> bool {
        matches!(self, ExtractError::Structure(_))
    }
}
