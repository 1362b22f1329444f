use crate::DocId;

/// Errors returned by document construction and corpus queries.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The text input could not be read to completion.
    #[error("failed to read document input: {0}")]
    Io(#[from] std::io::Error),
    /// A query referenced a document that was never added to the corpus.
    #[error("document {0} not found in corpus")]
    DocumentNotFound(DocId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
