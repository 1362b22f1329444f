use serde_json::json;
use tfidf::{Corpus, Document, Error, Meta, TermFrequency};

fn text_doc(text: &str) -> Document {
    Document::build(text.as_bytes(), Meta::new()).unwrap()
}

fn profile_doc(pairs: &[(&str, f64)]) -> Document {
    let tf: TermFrequency = pairs.iter().map(|(t, f)| (t.to_string(), *f)).collect();
    Document::from_term_frequencies(tf, Meta::new())
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}

#[test]
fn it_scores_three_document_corpus() {
    let docs = vec![
        profile_doc(&[("termA", 0.3), ("termB", 0.7)]),
        profile_doc(&[("termB", 0.2), ("termC", 0.8)]),
        profile_doc(&[("termD", 1.0)]),
    ];
    let ids: Vec<_> = docs.iter().map(Document::id).collect();
    let mut corpus = Corpus::new();
    corpus.add_documents(docs);

    let scores = corpus.calculate().unwrap();
    assert_eq!(scores.len(), 3);
    let ln3 = 3.0f64.ln();
    let ln15 = 1.5f64.ln();
    assert_close(scores[&ids[0]]["termA"], 0.3 * ln3);
    assert_close(scores[&ids[0]]["termB"], 0.7 * ln15);
    assert_close(scores[&ids[1]]["termB"], 0.2 * ln15);
    assert_close(scores[&ids[1]]["termC"], 0.8 * ln3);
    assert_close(scores[&ids[2]]["termD"], 1.0 * ln3);
    assert_eq!(scores[&ids[2]].len(), 1);
}

#[test]
fn it_scores_built_documents() {
    let a = text_doc("termA termA. TERMA!");
    let b = text_doc("termB");
    let (a_id, b_id) = (a.id(), b.id());
    let mut corpus = Corpus::new();
    corpus.add_documents([a, b]);

    let scores = corpus.calculate().unwrap();
    assert_close(scores[&a_id]["terma"], 2.0f64.ln());
    assert_close(scores[&b_id]["termb"], 2.0f64.ln());
}

#[test]
fn it_zeroes_universal_terms() {
    let mut corpus = Corpus::new();
    corpus.add_documents(["shared one", "shared two two", "Shared, three!"].map(text_doc));
    let ids: Vec<_> = corpus.document_ids().collect();
    for id in ids {
        assert_eq!(corpus.tfidf("shared", id).unwrap()["shared"], 0.0);
        assert_eq!(corpus.tfidf("unseen", id).unwrap()["unseen"], 0.0);
    }
}

#[test]
fn it_reports_unknown_documents() {
    let stray = text_doc("shared");
    let mut corpus = Corpus::new();
    corpus.add_document(text_doc("shared words"));
    match corpus.tfidf("shared", stray.id()) {
        Err(Error::DocumentNotFound(id)) => assert_eq!(id, stray.id()),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn it_keeps_metadata_and_content() {
    let meta = json!({"path": "notes/a.txt", "tags": ["x", "y"]});
    let doc = Document::build("Line one\nline two\n".as_bytes(), meta.as_object().unwrap().clone()).unwrap();
    let id = doc.id();
    let mut corpus = Corpus::new();
    corpus.add_document(doc);

    let stored = corpus.get(id).unwrap();
    assert_eq!(stored.meta()["tags"], json!(["x", "y"]));
    assert_eq!(stored.content(), "Line one\nline two");
    assert_eq!(stored.term_frequency("line"), 0.5);
}
