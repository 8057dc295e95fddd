use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use corpusvec_core::{
    normalize_line_endings, Corpus, CorpusConfig, Dictionary, DictionaryEntry, DocumentVector, DocumentVectorEntry,
    MAX_TOKEN_LEN,
};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "corpusvec-indexer")]
#[command(about = "Build a term dictionary and document vectors from a corpus directory", long_about = None)]
struct Cli {
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus directory; every regular file directly inside it is a document
    #[arg(long, short = 'c')]
    corpus: PathBuf,
    /// File of stop words to leave out of the dictionary
    #[arg(long, short = 's')]
    stopwords: Option<PathBuf>,
    /// Longest token kept; longer runs are dropped
    #[arg(long, default_value_t = MAX_TOKEN_LEN)]
    max_token_len: usize,
}

impl CorpusArgs {
    fn build(&self) -> Result<Corpus> {
        let mut config = CorpusConfig::new(&self.corpus).with_max_token_len(self.max_token_len);
        if let Some(stopwords) = &self.stopwords {
            config = config.with_stopwords(stopwords);
        }
        Corpus::build(&config).with_context(|| format!("failed to build corpus from {}", self.corpus.display()))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build everything and print the dictionary with document frequencies
    Build(CorpusArgs),
    /// Print the vector of every document
    Vectors(CorpusArgs),
    /// Vectorize ad hoc text against the corpus dictionary
    Vectorize {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Text to vectorize; raw bytes are read from stdin when omitted
        #[arg(long)]
        text: Option<String>,
    },
}

#[derive(Serialize)]
struct DictionaryReport<'a> {
    generated_at: String,
    source: &'a str,
    documents: u32,
    terms: usize,
    entries: Vec<&'a DictionaryEntry>,
}

#[derive(Serialize)]
struct VectorReport<'a> {
    path: &'a str,
    items: Vec<&'a DocumentVectorEntry>,
}

#[derive(Serialize)]
struct VectorsReport<'a> {
    generated_at: String,
    documents: Vec<VectorReport<'a>>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Build(args) => print_dictionary(&mut out, args.build()?.dictionary(), cli.format)?,
        Commands::Vectors(args) => print_vectors(&mut out, args.build()?.documents(), cli.format)?,
        Commands::Vectorize { corpus, text } => {
            let corpus = corpus.build()?;
            let text = match text {
                Some(text) => text.into_bytes(),
                None => {
                    let mut buf = Vec::new();
                    io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            // A bare '\r' ends the buffer; CRLF line endings should not.
            let text = normalize_line_endings(&text);
            let vector = corpus.vectorize(&text)?;
            tracing::info!(items = vector.item_count(), "vectorized input");
            print_vectors(&mut out, std::slice::from_ref(&vector), cli.format)?;
        }
    }
    Ok(())
}

fn print_dictionary(out: &mut impl Write, dictionary: &Dictionary, format: Format) -> Result<()> {
    match format {
        Format::Text => write!(out, "{dictionary}")?,
        Format::Json => {
            let report = DictionaryReport {
                generated_at: now_rfc3339(),
                source: dictionary.source(),
                documents: dictionary.document_count(),
                terms: dictionary.term_count(),
                entries: dictionary.iter().collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn print_vectors(out: &mut impl Write, documents: &[DocumentVector], format: Format) -> Result<()> {
    match format {
        Format::Text => {
            for doc in documents {
                writeln!(out, "{} ({} items)", doc.path(), doc.item_count())?;
                writeln!(out, "{doc}")?;
            }
        }
        Format::Json => {
            let report = VectorsReport {
                generated_at: now_rfc3339(),
                documents: documents
                    .iter()
                    .map(|doc| VectorReport { path: doc.path(), items: doc.iter().collect() })
                    .collect(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into())
}
