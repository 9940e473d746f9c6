use matrixpert_core::error::CoreError;
use matrixpert_inference::error::InferenceError;

/// Errors from running a query through the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The request was invalid for the session (no images, bad index, blank query)
    /// or the selected raster could not be encoded.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The multimodal call failed. History was left untouched.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}
