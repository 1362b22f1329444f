use uuid::Uuid;

pub mod corpus;
pub mod document;
pub mod error;
pub mod tokenizer;

/// Identifier assigned to every [`Document`] when it is built.
pub type DocId = Uuid;

pub use corpus::{Corpus, Scores, TermTfIdf};
pub use document::{Document, Meta, TermFrequency};
pub use error::{Error, Result};
