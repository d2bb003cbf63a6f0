use bookfinder_core::error::SearchError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("No book at position {0} on this page")]
    NoSuchPosition(usize),

    #[error("Book not found: {0}")]
    BookNotFound(String),
}
