use std::fs::File;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::dictionary::Dictionary;
use crate::error::{CorpusError, Result};
use crate::idf::compute_document_frequencies;
use crate::index::Corpus;
use crate::scanner::CorpusScanner;
use crate::tokenizer::Tokenizer;
use crate::vector::DocumentVector;

/// Builds the pieces of a [`Corpus`].
///
/// The phases must run in order: the exclusion dictionary, then the term
/// dictionary, then the document vectors against the finished dictionary, and
/// finally the document frequencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusBuilder {
    tokenizer: Tokenizer,
}

impl CorpusBuilder {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    fn scanner(&self, corpus_dir: &Path) -> CorpusScanner {
        CorpusScanner::new(corpus_dir).with_tokenizer(self.tokenizer)
    }

    /// Read a stop-word file into a dictionary. The file counts as one document.
    pub fn build_exclusion_dictionary(&self, path: &Path) -> Result<Dictionary> {
        let file = File::open(path).map_err(|source| CorpusError::Open { path: path.to_path_buf(), source })?;
        let tokens = self
            .tokenizer
            .tokens(file)
            .map(|token| token.map_err(|source| CorpusError::Read { path: path.to_path_buf(), source }));

        let mut exclusion = Dictionary::new(path.display().to_string());
        exclusion.populate(tokens, None)?;
        exclusion.set_document_count(1);
        info!(source = %path.display(), terms = exclusion.term_count(), "exclusion dictionary built");
        Ok(exclusion)
    }

    /// Index every term of every document in `corpus_dir`, skipping terms in `exclusion`.
    pub fn build_term_dictionary(&self, corpus_dir: &Path, exclusion: Option<&Dictionary>) -> Result<Dictionary> {
        let mut dictionary = Dictionary::new(corpus_dir.display().to_string());
        for doc in self.scanner(corpus_dir).documents()? {
            debug!(path = %doc.path().display(), "indexing document");
            dictionary.add_document(doc.into_tokens(), exclusion)?;
        }
        info!(
            source = %corpus_dir.display(),
            documents = dictionary.document_count(),
            terms = dictionary.term_count(),
            "term dictionary built"
        );
        Ok(dictionary)
    }

    /// Build one vector per document in `corpus_dir` against a finished dictionary.
    ///
    /// Room is reserved for exactly the number of documents the dictionary
    /// counted. Finding more readable documents than that is an error.
    pub fn build_document_vectors(&self, corpus_dir: &Path, dictionary: &Dictionary) -> Result<Vec<DocumentVector>> {
        let capacity = dictionary.document_count() as usize;
        let mut vectors = Vec::new();
        vectors
            .try_reserve_exact(capacity)
            .map_err(|source| CorpusError::Allocation { what: "document vectors", source: source.into() })?;

        for doc in self.scanner(corpus_dir).documents()? {
            if vectors.len() == capacity {
                return Err(CorpusError::CapacityExceeded { capacity });
            }
            let path = doc.path().display().to_string();
            let vector = DocumentVector::build(path, doc.into_tokens(), dictionary)?;
            debug!(path = vector.path(), items = vector.item_count(), "document vectorized");
            vectors.push(vector);
        }

        if vectors.len() < capacity {
            warn!(expected = capacity, found = vectors.len(), "fewer documents than when the dictionary was built");
        }
        info!(documents = vectors.len(), "document vectors built");
        Ok(vectors)
    }

    pub fn build_document_vector_from_buffer(&self, buf: &[u8], dictionary: &Dictionary) -> Result<DocumentVector> {
        DocumentVector::from_buffer(buf, dictionary, &self.tokenizer)
    }

    /// Run all phases.
    pub fn build(&self, corpus_dir: &Path, stopwords: Option<&Path>) -> Result<Corpus> {
        let exclusion = stopwords.map(|path| self.build_exclusion_dictionary(path)).transpose()?;
        let mut dictionary = self.build_term_dictionary(corpus_dir, exclusion.as_ref())?;
        let documents = self.build_document_vectors(corpus_dir, &dictionary)?;
        compute_document_frequencies(&mut dictionary, &documents);
        Ok(Corpus::new(dictionary, exclusion, documents, self.tokenizer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn extra_document_after_dictionary_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        let builder = CorpusBuilder::default();
        let dictionary = builder.build_term_dictionary(dir.path(), None).unwrap();

        fs::write(dir.path().join("b.txt"), "beta").unwrap();
        let err = builder.build_document_vectors(dir.path(), &dictionary).unwrap_err();
        assert!(matches!(err, CorpusError::CapacityExceeded { capacity: 1 }));
    }

    #[test]
    fn missing_stopword_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = CorpusBuilder::default()
            .build_exclusion_dictionary(&dir.path().join("stopwords.txt"))
            .unwrap_err();
        assert!(matches!(err, CorpusError::Open { .. }));
    }

    #[test]
    fn exclusion_dictionary_counts_one_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stopwords.txt");
        fs::write(&path, "yang\ndan\ndi\nyang\n").unwrap();
        let exclusion = CorpusBuilder::default().build_exclusion_dictionary(&path).unwrap();
        assert_eq!(exclusion.document_count(), 1);
        assert_eq!(exclusion.term_count(), 3);
        assert!(exclusion.contains("dan"));
    }
}
