use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize audit payload")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to write audit export")]
    Export(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
