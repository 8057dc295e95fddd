use std::fmt;

use serde::Serialize;

use crate::avl::{AvlTree, GrowError, Insertion, Keyed};
use crate::error::{CorpusError, Result};
use crate::index::TermId;

/// One vocabulary term.
#[derive(Debug, Clone, Serialize)]
pub struct DictionaryEntry {
    index: TermId,
    term: String,
    document_frequency: u32,
}

impl DictionaryEntry {
    /// 1-based, dense, fixed at first insertion.
    pub fn index(&self) -> TermId {
        self.index
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Number of document vectors holding this term. Zero until
    /// [`compute_document_frequencies`](crate::idf::compute_document_frequencies) runs.
    pub fn document_frequency(&self) -> u32 {
        self.document_frequency
    }

    pub(crate) fn set_document_frequency(&mut self, df: u32) {
        self.document_frequency = df;
    }
}

impl Keyed for DictionaryEntry {
    type Key = str;

    fn key(&self) -> &str {
        &self.term
    }

    // A known term keeps its original index.
    fn merge(&mut self, _duplicate: Self) {}
}

/// A vocabulary: every distinct term seen, ordered by term and numbered in
/// order of first appearance.
///
/// The same type serves as the stop-word list that gates insertion into
/// another dictionary.
#[derive(Debug, Clone)]
pub struct Dictionary {
    source: String,
    document_count: u32,
    entries: AvlTree<DictionaryEntry>,
}

impl Dictionary {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), document_count: 0, entries: AvlTree::new() }
    }

    /// Where the dictionary was built from (a directory or a stop-word file).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn document_count(&self) -> u32 {
        self.document_count
    }

    pub(crate) fn set_document_count(&mut self, count: u32) {
        self.document_count = count;
    }

    pub fn term_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Height of the underlying tree.
    pub fn height(&self) -> u32 {
        self.entries.height()
    }

    /// Add `term` if it is new. Returns the index assigned to a new term and
    /// `None` when the term was already present.
    pub fn insert_term(&mut self, term: &str) -> Result<Option<TermId>> {
        let index = TermId::try_from(self.term_count() + 1).map_err(|_| CorpusError::Allocation {
            what: "dictionary",
            source: GrowError::Exhausted(self.term_count()),
        })?;
        let entry = DictionaryEntry { index, term: term.to_owned(), document_frequency: 0 };
        match self.entries.insert(entry) {
            Ok(Insertion::Inserted) => Ok(Some(index)),
            Ok(Insertion::Merged) => Ok(None),
            Err(source) => Err(CorpusError::Allocation { what: "dictionary", source }),
        }
    }

    /// Insert every token not found in `exclusion`.
    pub fn populate<I, E>(&mut self, tokens: I, exclusion: Option<&Dictionary>) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<String, E>>,
        CorpusError: From<E>,
    {
        for token in tokens {
            let token = token?;
            if exclusion.is_some_and(|exc| exc.contains(&token)) {
                continue;
            }
            self.insert_term(&token)?;
        }
        Ok(())
    }

    /// Count one more source document and populate from its tokens.
    pub fn add_document<I, E>(&mut self, tokens: I, exclusion: Option<&Dictionary>) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<String, E>>,
        CorpusError: From<E>,
    {
        self.document_count += 1;
        self.populate(tokens, exclusion)
    }

    pub fn get(&self, term: &str) -> Option<&DictionaryEntry> {
        self.entries.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains(term)
    }

    pub fn get_by_index(&self, index: TermId) -> Option<&DictionaryEntry> {
        let slot = usize::try_from(index).ok()?.checked_sub(1)?;
        self.entries.get_by_slot(slot)
    }

    /// Entries in ascending term order.
    pub fn iter(&self) -> impl Iterator<Item = &DictionaryEntry> {
        self.entries.iter()
    }

    pub(crate) fn for_each_entry_mut(&mut self, f: impl FnMut(&mut DictionaryEntry)) {
        self.entries.for_each_in_order_mut(f);
    }

    pub fn is_balanced(&self) -> bool {
        self.entries.is_balanced()
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "dictionary {}: {} documents, {} terms, height {}",
            self.source,
            self.document_count,
            self.term_count(),
            self.height()
        )?;
        for entry in self.iter() {
            writeln!(f, "{}:{}:{}", entry.index, entry.document_frequency, entry.term)?;
        }
        Ok(())
    }
}
