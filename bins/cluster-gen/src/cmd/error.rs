#[derive(Debug, thiserror::Error)]
pub enum ClusterGenError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Pipeline(#[from] pipeline::PipelineError),

    #[error("publish: {0}")]
    Publish(#[from] cluster_api::PublishError),
}
