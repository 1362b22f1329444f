use crate::document::Document;
use crate::error::{Error, Result};
use crate::DocId;
use std::collections::{HashMap, HashSet};

/// term -> TF-IDF score
pub type TermTfIdf = HashMap<String, f64>;

/// document id -> scores of that document's terms
pub type Scores = HashMap<DocId, TermTfIdf>;

/// A set of documents plus the inverted index used to derive document frequency.
///
/// The corpus does no locking of its own. Share it behind a mutex or
/// reader-writer lock when documents are added from more than one thread.
#[derive(Debug, Default)]
pub struct Corpus {
    documents: HashMap<DocId, Document>,
    /// term -> ids of the distinct documents containing it
    inverted_index: HashMap<String, HashSet<DocId>>,
    scores: Scores,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any document with the same id.
    ///
    /// Index membership is a set, so adding the same document again leaves
    /// every document frequency unchanged.
    pub fn add_document(&mut self, doc: Document) {
        let id = doc.id();
        for term in doc.terms() {
            self.inverted_index.entry(term.to_string()).or_default().insert(id);
        }
        tracing::debug!(doc_id = %id, terms = doc.len(), "added document");
        self.documents.insert(id, doc);
    }

    /// Add documents in order.
    pub fn add_documents<I>(&mut self, docs: I)
    where
        I: IntoIterator<Item = Document>,
    {
        for doc in docs {
            self.add_document(doc);
        }
    }

    /// Number of distinct documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.inverted_index.get(term).map_or(0, HashSet::len)
    }

    /// TF-IDF of `term` in the document `doc_id`, as a single-entry mapping.
    pub fn tfidf(&self, term: &str, doc_id: DocId) -> Result<TermTfIdf> {
        let doc = self.document(doc_id)?;
        let mut out = TermTfIdf::with_capacity(1);
        out.insert(term.to_string(), self.score(term, doc));
        Ok(out)
    }

    /// TF-IDF of each of `terms` in the document `doc_id`, merged into one mapping.
    pub fn tfidfs<I, S>(&self, terms: I, doc_id: DocId) -> Result<TermTfIdf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doc = self.document(doc_id)?;
        Ok(terms
            .into_iter()
            .map(|term| {
                let term = term.as_ref();
                (term.to_string(), self.score(term, doc))
            })
            .collect())
    }

    /// Score every term of every document, replacing the score cache.
    pub fn calculate(&mut self) -> Result<&Scores> {
        let mut scores = Scores::with_capacity(self.documents.len());
        for (&id, doc) in &self.documents {
            scores.insert(id, self.tfidfs(doc.terms(), id)?);
        }
        tracing::debug!(num_docs = scores.len(), num_terms = self.inverted_index.len(), "calculated corpus tf-idf");
        self.scores = scores;
        Ok(&self.scores)
    }

    // df == 0 means the term is absent everywhere; skip the log of N/0.
    fn score(&self, term: &str, doc: &Document) -> f64 {
        let df = self.document_frequency(term);
        if df == 0 {
            return 0.0;
        }
        let idf = (self.documents.len() as f64 / df as f64).ln();
        doc.term_frequency(term) * idf
    }

    fn document(&self, doc_id: DocId) -> Result<&Document> {
        self.documents.get(&doc_id).ok_or(Error::DocumentNotFound(doc_id))
    }

    /// Scores from the most recent [`Corpus::calculate`]; empty before the first run.
    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn get(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(&doc_id)
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.documents.contains_key(&doc_id)
    }

    pub fn document_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.documents.keys().copied()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> + '_ {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
