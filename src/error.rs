use crate::engine::EngineError;
use crate::mcp::errors;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingField(Vec<&'static str>),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Template directory does not exist: {}", .0.display())]
    TemplateDirNotFound(PathBuf),
    #[error("failed to create output directory {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl GenerateError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerateError::MissingField(_) => errors::MISSING_FIELD,
            GenerateError::InvalidInput(_) => errors::INVALID_INPUT,
            GenerateError::TemplateDirNotFound(_) => errors::TEMPLATE_DIR_NOT_FOUND,
            GenerateError::Filesystem { .. } => errors::FILESYSTEM_ERROR,
            GenerateError::Engine(_) => errors::ENGINE_ERROR,
        }
    }

    /// Validation failures are reported before any engine call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GenerateError::MissingField(_)
                | GenerateError::InvalidInput(_)
                | GenerateError::TemplateDirNotFound(_)
        )
    }
}
