use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Operation(#[from] boxoffice_operations::OperationError),

    #[error("failed to export audit log")]
    Export(#[from] boxoffice_store::StoreError),

    #[error("failed to create export file '{path}'")]
    ExportCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;
