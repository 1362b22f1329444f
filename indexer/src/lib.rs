use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfidf::tokenizer::tokenize;
use tfidf::{Corpus, DocId, Document, Meta, TermTfIdf};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A record in a `.json` or `.jsonl` input file.
#[derive(Debug, Deserialize)]
struct InputDoc {
    id: Option<String>,
    body: String,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Parser)]
#[command(name = "tfidf")]
#[command(about = "Compute TF-IDF scores for a collection of text documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every term of every input document
    Score {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Worker threads used to read and tokenize input files
        #[arg(long, default_value_t = 4)]
        threads: usize,
    },
    /// Score the given terms against every input document
    Term {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Terms to score; normalized the same way document text is
        #[arg(long, num_args = 1.., required = true)]
        terms: Vec<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long, default_value_t = 4)]
        threads: usize,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Text,
}

#[derive(Debug, Serialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

/// Scores of one document, highest first.
#[derive(Debug, Serialize)]
pub struct DocReport<'a> {
    pub id: DocId,
    pub meta: &'a Meta,
    pub scores: Vec<TermScore>,
}

impl DocReport<'_> {
    fn source(&self) -> Option<&str> {
        self.meta.get("source").and_then(Value::as_str)
    }

    fn external_id(&self) -> Option<&str> {
        self.meta.get("external_id").and_then(Value::as_str)
    }
}

pub fn run<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    match cli.command {
        Commands::Score { input, format, threads } => {
            let mut corpus = build_corpus(Path::new(&input), threads)?;
            let reports = score_all(&mut corpus)?;
            write_reports(out, &reports, format)
        }
        Commands::Term { input, terms, format, threads } => {
            let corpus = build_corpus(Path::new(&input), threads)?;
            let reports = score_terms(&corpus, &terms)?;
            write_reports(out, &reports, format)
        }
    }
}

/// Read every input file under `input` into one corpus.
///
/// Files are tokenized on up to `threads` workers; the corpus itself is only
/// touched under its lock.
pub fn build_corpus(input: &Path, threads: usize) -> Result<Corpus> {
    let files = collect_files(input)?;
    let corpus = Mutex::new(Corpus::new());
    if !files.is_empty() {
        let workers = threads.clamp(1, files.len());
        let batch_len = files.len().div_ceil(workers);
        let shared = &corpus;
        std::thread::scope(|s| -> Result<()> {
            let handles: Vec<_> = files
                .chunks(batch_len)
                .map(|batch| {
                    s.spawn(move || -> Result<()> {
                        for file in batch {
                            let docs = load_file(file)?;
                            shared.lock().add_documents(docs);
                        }
                        Ok(())
                    })
                })
                .collect();
            for handle in handles {
                handle.join().map_err(|_| anyhow!("worker thread panicked"))??;
            }
            Ok(())
        })?;
    }
    let corpus = corpus.into_inner();
    tracing::info!(num_docs = corpus.len(), files = files.len(), "built corpus");
    Ok(corpus)
}

/// Input files under `input`, sorted. A single file is taken whatever its extension.
pub fn collect_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "txt" | "md" | "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input path {} does not exist", input.display());
    }
    files.sort();
    Ok(files)
}

fn load_file(file: &Path) -> Result<Vec<Document>> {
    match file.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => load_jsonl(file),
        Some("json") => load_json(file),
        _ => {
            let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
            let doc = Document::build(BufReader::new(f), record_meta(file, None, None))
                .with_context(|| format!("reading {}", file.display()))?;
            Ok(vec![doc])
        }
    }
}

fn load_jsonl(file: &Path) -> Result<Vec<Document>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);
    let mut docs = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", file.display()))?;
        if line.trim().is_empty() { continue; }
        let rec: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid record", file.display(), lineno + 1))?;
        docs.push(record_document(file, rec));
    }
    Ok(docs)
}

fn load_json(file: &Path) -> Result<Vec<Document>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let json: Value = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        Value::Array(arr) => arr
            .into_iter()
            .map(|v| -> Result<Document> { Ok(record_document(file, serde_json::from_value(v)?)) })
            .collect(),
        Value::Object(_) => Ok(vec![record_document(file, serde_json::from_value(json)?)]),
        _ => {
            tracing::warn!(file = %file.display(), "skipping json file without records");
            Ok(Vec::new())
        }
    }
}

fn record_document(file: &Path, rec: InputDoc) -> Document {
    Document::from_text(&rec.body, record_meta(file, rec.id, rec.meta))
}

fn record_meta(file: &Path, external_id: Option<String>, meta: Option<Meta>) -> Meta {
    let mut meta = meta.unwrap_or_default();
    meta.insert("source".into(), Value::String(file.display().to_string()));
    if let Some(id) = external_id {
        meta.insert("external_id".into(), Value::String(id));
    }
    meta
}

/// Run the full corpus calculation and report every document.
pub fn score_all(corpus: &mut Corpus) -> Result<Vec<DocReport<'_>>> {
    corpus.calculate()?;
    let corpus = &*corpus;
    let scores = corpus.scores().iter().map(|(id, s)| (*id, s.clone()));
    Ok(reports(corpus, scores))
}

/// Score `terms` in every document of the corpus.
pub fn score_terms<'a>(corpus: &'a Corpus, terms: &[String]) -> Result<Vec<DocReport<'a>>> {
    let mut normalized: Vec<String> = terms.iter().flat_map(|t| tokenize(t)).collect();
    normalized.sort();
    normalized.dedup();
    let mut scores = Vec::with_capacity(corpus.len());
    for doc in corpus.documents() {
        scores.push((doc.id(), corpus.tfidfs(&normalized, doc.id())?));
    }
    Ok(reports(corpus, scores))
}

fn reports<I>(corpus: &Corpus, scores: I) -> Vec<DocReport<'_>>
where
    I: IntoIterator<Item = (DocId, TermTfIdf)>,
{
    let mut out: Vec<DocReport<'_>> = scores
        .into_iter()
        .filter_map(|(id, s)| {
            let doc = corpus.get(id)?;
            let mut scores: Vec<TermScore> = s.into_iter().map(|(term, score)| TermScore { term, score }).collect();
            scores.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
            Some(DocReport { id, meta: doc.meta(), scores })
        })
        .collect();
    out.sort_by(|a, b| {
        a.source()
            .cmp(&b.source())
            .then_with(|| a.external_id().cmp(&b.external_id()))
            .then_with(|| a.id.cmp(&b.id))
    });
    out
}

pub fn write_reports<W: Write>(out: &mut W, reports: &[DocReport<'_>], format: Format) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)?;
            writeln!(out)?;
        }
        Format::Text => {
            for r in reports {
                let label = match (r.source(), r.external_id()) {
                    (Some(src), Some(ext)) => format!("{src}#{ext}"),
                    (Some(src), None) => src.to_string(),
                    _ => r.id.to_string(),
                };
                writeln!(out, "{label}")?;
                for ts in &r.scores {
                    writeln!(out, "  {:<24} {:.6}", ts.term, ts.score)?;
                }
            }
        }
    }
    Ok(())
}
