use thiserror::Error;

/// Structural input problems. These abort the whole run; per-row anomalies
/// never surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Column '{column}' not found in {dataset} data")]
    MissingColumn { dataset: String, column: String },

    #[error("Region name attribute '{column}' not found in boundary feature {feature}")]
    MissingBoundaryAttribute { column: String, feature: usize },

    #[error("Unsupported boundary format: {0}")]
    UnsupportedBoundaryFormat(String),

    #[error("Invalid boundary data: {0}")]
    InvalidBoundaries(String),

    #[error("Boundary data contains no polygon regions")]
    EmptyBoundaries,
}
