use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{CorpusError, Result};
use crate::tokenizer::Tokenizer;

/// Enumerates the documents of a corpus directory.
///
/// Only regular files directly inside the directory count; subdirectories,
/// symlinks and special files are ignored. Files come back sorted by name so
/// that repeated scans see the same order.
#[derive(Debug, Clone)]
pub struct CorpusScanner {
    root: PathBuf,
    tokenizer: Tokenizer,
}

impl CorpusScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), tokenizer: Tokenizer::default() }
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let meta = fs::metadata(&self.root)
            .map_err(|source| CorpusError::Open { path: self.root.clone(), source })?;
        if !meta.is_dir() {
            return Err(CorpusError::NotADirectory(self.root.clone()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|source| CorpusError::Directory { path: self.root.clone(), source })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Read every document in turn, lazily.
    ///
    /// A file that cannot be opened, or fails part way through reading, is
    /// logged and skipped; it never reaches the caller. Each file is closed
    /// before the next one is opened.
    pub fn documents(&self) -> Result<impl Iterator<Item = ScannedDocument>> {
        let files = self.files()?;
        let tokenizer = self.tokenizer;
        Ok(files.into_iter().filter_map(move |path| match File::open(&path) {
            Ok(file) => read_document(&tokenizer, path, file),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable file");
                None
            }
        }))
    }
}

fn read_document(tokenizer: &Tokenizer, path: PathBuf, reader: impl Read) -> Option<ScannedDocument> {
    match tokenizer.tokens(reader).collect::<std::io::Result<Vec<String>>>() {
        Ok(tokens) => Some(ScannedDocument { path, tokens }),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping file that failed mid-read");
            None
        }
    }
}

/// A corpus file that was read to the end, with its tokens.
#[derive(Debug, Clone)]
pub struct ScannedDocument {
    path: PathBuf,
    tokens: Vec<String>,
}

impl ScannedDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The tokens in the shape the dictionary and vector builders consume.
    pub fn into_tokens(self) -> impl Iterator<Item = Result<String>> {
        self.tokens.into_iter().map(Ok)
    }
}
