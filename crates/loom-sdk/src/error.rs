use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("store error: {0}")]
    Store(#[from] loom_store::StoreError),

    #[error("graph error: {0}")]
    Graph(#[from] loom_graph::GraphError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("hook failed: {0}")]
    Hook(String),
}

pub type SdkResult<T> = Result<T, SdkError>;
