use crate::config::CorpusConfig;
use crate::corpus::CorpusBuilder;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::vector::DocumentVector;

/// Dictionary index of a term, starting at 1.
pub type TermId = u32;

/// A fully built corpus: the frozen term dictionary with document frequencies,
/// one vector per scanned document, and the stop words used to build them.
#[derive(Debug, Clone)]
pub struct Corpus {
    dictionary: Dictionary,
    exclusion: Option<Dictionary>,
    documents: Vec<DocumentVector>,
    tokenizer: Tokenizer,
}

impl Corpus {
    pub(crate) fn new(
        dictionary: Dictionary,
        exclusion: Option<Dictionary>,
        documents: Vec<DocumentVector>,
        tokenizer: Tokenizer,
    ) -> Self {
        Self { dictionary, exclusion, documents, tokenizer }
    }

    /// Run every phase for `config`: stop words, dictionary, vectors, document frequencies.
    pub fn build(config: &CorpusConfig) -> Result<Self> {
        CorpusBuilder::new(config.tokenizer()).build(&config.corpus_dir, config.stopwords.as_deref())
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn exclusion(&self) -> Option<&Dictionary> {
        self.exclusion.as_ref()
    }

    pub fn documents(&self) -> &[DocumentVector] {
        &self.documents
    }

    pub fn document(&self, path: &str) -> Option<&DocumentVector> {
        self.documents.iter().find(|doc| doc.path() == path)
    }

    /// Documents counted while the dictionary was built.
    pub fn document_count(&self) -> u32 {
        self.dictionary.document_count()
    }

    /// Vectorize an ad hoc, sentinel-terminated buffer against the dictionary.
    pub fn vectorize(&self, buf: &[u8]) -> Result<DocumentVector> {
        DocumentVector::from_buffer(buf, &self.dictionary, &self.tokenizer)
    }
}
