//! Term dictionary and sparse document vectors for a plain-text corpus.
//!
//! A corpus is built in strict phases: an optional stop-word dictionary, the
//! term dictionary over every document, one [`DocumentVector`] per document
//! against the finished dictionary, and finally the per-term document
//! frequencies. [`Corpus::build`] runs all of them.

pub mod avl;
pub mod config;
pub mod corpus;
pub mod dictionary;
pub mod error;
pub mod idf;
pub mod index;
pub mod scanner;
pub mod tokenizer;
pub mod vector;

pub use config::CorpusConfig;
pub use corpus::CorpusBuilder;
pub use dictionary::{Dictionary, DictionaryEntry};
pub use error::{CorpusError, Result};
pub use idf::compute_document_frequencies;
pub use index::{Corpus, TermId};
pub use scanner::CorpusScanner;
pub use tokenizer::{normalize_line_endings, tokenize, Tokenizer, BUFFER_SENTINEL, MAX_TOKEN_LEN};
pub use vector::{DocumentVector, DocumentVectorEntry};
