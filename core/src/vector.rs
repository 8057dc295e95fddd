use std::fmt;

use serde::Serialize;

use crate::avl::{AvlTree, Insertion, Keyed};
use crate::dictionary::{Dictionary, DictionaryEntry};
use crate::error::{CorpusError, Result};
use crate::index::TermId;
use crate::tokenizer::Tokenizer;

/// Label of vectors built from an in-memory buffer.
pub const BUFFER_LABEL: &str = "buffer";

/// A term of one document and how often it occurs there.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentVectorEntry {
    term_index: TermId,
    term: String,
    frequency: u32,
}

impl DocumentVectorEntry {
    /// Index of the term in the dictionary the vector was built against.
    pub fn term_index(&self) -> TermId {
        self.term_index
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }
}

impl Keyed for DocumentVectorEntry {
    type Key = TermId;

    fn key(&self) -> &TermId {
        &self.term_index
    }

    fn merge(&mut self, duplicate: Self) {
        self.frequency += duplicate.frequency;
    }
}

/// Sparse term-frequency representation of a single document, keyed by
/// dictionary index.
#[derive(Debug, Clone)]
pub struct DocumentVector {
    path: String,
    items: AvlTree<DocumentVectorEntry>,
}

impl DocumentVector {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), items: AvlTree::new() }
    }

    /// Build a vector from `tokens`, keeping only terms known to `dictionary`.
    pub fn build<I, E>(path: impl Into<String>, tokens: I, dictionary: &Dictionary) -> Result<Self>
    where
        I: IntoIterator<Item = std::result::Result<String, E>>,
        CorpusError: From<E>,
    {
        let mut vector = Self::new(path);
        for token in tokens {
            let token = token?;
            if let Some(entry) = dictionary.get(&token) {
                vector.add(entry)?;
            }
        }
        Ok(vector)
    }

    /// Build a vector from a [`BUFFER_SENTINEL`](crate::tokenizer::BUFFER_SENTINEL)
    /// terminated buffer.
    pub fn from_buffer(buf: &[u8], dictionary: &Dictionary, tokenizer: &Tokenizer) -> Result<Self> {
        let mut vector = Self::new(BUFFER_LABEL);
        for token in tokenizer.buffer_tokens(buf) {
            if let Some(entry) = dictionary.get(&token) {
                vector.add(entry)?;
            }
        }
        Ok(vector)
    }

    /// Count one occurrence of `entry`. Returns `true` when the term is new to
    /// this document.
    pub fn add(&mut self, entry: &DictionaryEntry) -> Result<bool> {
        let item = DocumentVectorEntry {
            term_index: entry.index(),
            term: entry.term().to_owned(),
            frequency: 1,
        };
        match self.items.insert(item) {
            Ok(inserted) => Ok(inserted == Insertion::Inserted),
            Err(source) => Err(CorpusError::Allocation { what: "document vector", source }),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of distinct terms.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of counted tokens, i.e. the sum of all frequencies.
    pub fn total_frequency(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.frequency)).sum()
    }

    pub fn contains(&self, term_index: TermId) -> bool {
        self.items.contains(&term_index)
    }

    pub fn get(&self, term_index: TermId) -> Option<&DocumentVectorEntry> {
        self.items.get(&term_index)
    }

    pub fn frequency(&self, term_index: TermId) -> Option<u32> {
        self.get(term_index).map(DocumentVectorEntry::frequency)
    }

    /// Items in ascending term index order.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentVectorEntry> {
        self.items.iter()
    }

    pub fn is_balanced(&self) -> bool {
        self.items.is_balanced()
    }
}

impl fmt::Display for DocumentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}:{}", item.term_index, item.frequency, item.term)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary(text: &str) -> Dictionary {
        let mut dict = Dictionary::new("test");
        dict.add_document(Tokenizer::default().tokens(text.as_bytes()), None).unwrap();
        dict
    }

    #[test]
    fn repeated_terms_accumulate_frequency() {
        let dict = dictionary("fraud bribe");
        let fraud = dict.get("fraud").unwrap();
        let mut vector = DocumentVector::new("doc");
        assert!(vector.add(fraud).unwrap());
        for _ in 0..4 {
            assert!(!vector.add(fraud).unwrap());
        }
        assert_eq!(vector.item_count(), 1);
        assert_eq!(vector.frequency(fraud.index()), Some(5));
    }

    #[test]
    fn unknown_tokens_are_skipped() {
        let dict = dictionary("dana desa");
        let text = "dana bansos dana desa hibah";
        let vector = DocumentVector::build("doc", Tokenizer::default().tokens(text.as_bytes()), &dict).unwrap();
        assert_eq!(vector.item_count(), 2);
        assert_eq!(vector.total_frequency(), 3);
        assert_eq!(vector.frequency(1), Some(2));
        assert_eq!(vector.frequency(2), Some(1));
    }

    #[test]
    fn iterates_by_ascending_index() {
        let dict = dictionary("a b c d e f g");
        let vector =
            DocumentVector::build("doc", Tokenizer::default().tokens("g e c a f d b".as_bytes()), &dict).unwrap();
        let order: Vec<TermId> = vector.iter().map(|item| item.term_index()).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(vector.is_balanced());
    }

    #[test]
    fn buffer_vectors_stop_at_sentinel() {
        let dict = dictionary("suap pejabat daerah");
        let vector = DocumentVector::from_buffer(b"Suap PEJABAT suap\rdaerah", &dict, &Tokenizer::default()).unwrap();
        assert_eq!(vector.path(), BUFFER_LABEL);
        assert_eq!(vector.to_string(), "1:2:suap 2:1:pejabat");
        assert!(!vector.contains(3));
    }
}
