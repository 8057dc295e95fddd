use crate::dictionary::Dictionary;
use crate::vector::DocumentVector;

/// Record, for every dictionary term, how many of `documents` contain it.
///
/// Walks the dictionary in term order and probes each document vector by
/// index, so it costs O(terms x documents x log(items)). Only
/// `document_frequency` is written; running it again recomputes from scratch.
pub fn compute_document_frequencies(dictionary: &mut Dictionary, documents: &[DocumentVector]) {
    let mut unused = 0usize;
    dictionary.for_each_entry_mut(|entry| {
        let df = documents.iter().filter(|doc| doc.contains(entry.index())).count();
        if df == 0 {
            unused += 1;
        }
        entry.set_document_frequency(u32::try_from(df).unwrap_or(u32::MAX));
    });
    tracing::debug!(documents = documents.len(), terms = dictionary.term_count(), unused, "document frequencies computed");
}
