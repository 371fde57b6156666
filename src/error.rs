#[derive(Debug, thiserror::Error)]
pub enum GraderError {
    #[error("unsupported file type: {0}. Only PDF and DOCX files are accepted.")]
    UnsupportedFormat(String),

    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraderResult<T> = Result<T, GraderError>;
