/// Errors from gamelist and systems-file generation.
#[derive(Debug, thiserror::Error)]
pub enum GamelistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed XML: {0}")]
    Parse(String),
}
