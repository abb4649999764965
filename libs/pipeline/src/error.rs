#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("sink [{sink}]: {detail}")]
    Config { sink: String, detail: String },

    #[error("{0}")]
    Publish(#[from] cluster_api::PublishError),
}
