use std::path::PathBuf;

use crate::tokenizer::{Tokenizer, MAX_TOKEN_LEN};

/// Where a corpus comes from and how it is tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusConfig {
    /// Directory whose regular files are the documents.
    pub corpus_dir: PathBuf,
    /// Optional file of stop words.
    pub stopwords: Option<PathBuf>,
    pub max_token_len: usize,
}

impl CorpusConfig {
    pub fn new(corpus_dir: impl Into<PathBuf>) -> Self {
        Self { corpus_dir: corpus_dir.into(), stopwords: None, max_token_len: MAX_TOKEN_LEN }
    }

    pub fn with_stopwords(mut self, stopwords: impl Into<PathBuf>) -> Self {
        self.stopwords = Some(stopwords.into());
        self
    }

    pub fn with_max_token_len(mut self, max_token_len: usize) -> Self {
        self.max_token_len = max_token_len;
        self
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::with_max_len(self.max_token_len)
    }
}
