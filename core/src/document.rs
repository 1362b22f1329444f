use crate::error::Result;
use crate::tokenizer;
use crate::DocId;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use uuid::Uuid;

/// Caller-supplied metadata. Carried along with the document, never inspected.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// term -> occurrences of term / total tokens in the document
pub type TermFrequency = HashMap<String, f64>;

/// A piece of text reduced to its normalized term-frequency profile.
///
/// Documents are immutable once built. Frequencies of a non-empty document sum
/// to 1.0; a document without any tokens has an empty profile.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    id: DocId,
    meta: Meta,
    #[serde(skip)]
    content: String,
    term_frequency: TermFrequency,
}

impl Document {
    /// Read `input` to completion and build a document from its text.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected; only a
    /// failing read is an error.
    pub fn build<R: Read>(mut input: R, meta: Meta) -> Result<Self> {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf)?;
        let text = String::from_utf8_lossy(&buf);
        Ok(Self::from_text(&text, meta))
    }

    /// Build a document from text already in memory.
    pub fn from_text(text: &str, meta: Meta) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut total: usize = 0;
        for term in tokenizer::terms(text) {
            total += 1;
            *counts.entry(term).or_insert(0) += 1;
        }
        let term_frequency = frequencies(counts, total);
        let content = text.lines().collect::<Vec<_>>().join("\n");
        let doc = Self { id: Uuid::new_v4(), meta, content, term_frequency };
        tracing::trace!(doc_id = %doc.id, tokens = total, terms = doc.len(), "built document");
        doc
    }

    /// Wrap a precomputed profile. Terms are taken as given, without normalization.
    pub fn from_term_frequencies(term_frequency: TermFrequency, meta: Meta) -> Self {
        Self { id: Uuid::new_v4(), meta, content: String::new(), term_frequency }
    }

    pub fn id(&self) -> DocId {
        self.id
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Original text, lines joined with `\n` and no trailing newline.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn term_frequencies(&self) -> &TermFrequency {
        &self.term_frequency
    }

    /// Frequency of `term` in this document, 0.0 when absent.
    pub fn term_frequency(&self, term: &str) -> f64 {
        self.term_frequency.get(term).copied().unwrap_or(0.0)
    }

    /// Distinct terms of the profile, in no particular order.
    pub fn terms(&self) -> impl Iterator<Item = &str> + '_ {
        self.term_frequency.keys().map(String::as_str)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.term_frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.term_frequency.is_empty()
    }
}

fn frequencies(counts: HashMap<String, usize>, total: usize) -> TermFrequency {
    if total == 0 {
        return TermFrequency::new();
    }
    let total = total as f64;
    counts.into_iter().map(|(term, count)| (term, count as f64 / total)).collect()
}
