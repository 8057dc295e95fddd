use corpusvec_core::{Dictionary, DocumentVector};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn term() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

proptest! {
    #[test]
    fn dictionary_stays_balanced_and_dense(terms in proptest::collection::vec(term(), 0..200)) {
        let mut dict = Dictionary::new("prop");
        let mut first_seen: Vec<String> = Vec::new();
        for t in &terms {
            let before = dict.term_count();
            let existing = dict.get(t).map(|e| e.index());
            let assigned = dict.insert_term(t).unwrap();
            prop_assert!(dict.is_balanced());
            match existing {
                Some(index) => {
                    prop_assert_eq!(assigned, None);
                    prop_assert_eq!(dict.term_count(), before);
                    prop_assert_eq!(dict.get(t).map(|e| e.index()), Some(index));
                }
                None => {
                    first_seen.push(t.clone());
                    prop_assert_eq!(assigned, Some(dict.term_count() as u32));
                }
            }
        }

        let indices: BTreeSet<u32> = dict.iter().map(|e| e.index()).collect();
        prop_assert_eq!(indices, (1..=first_seen.len() as u32).collect::<BTreeSet<_>>());
        for (i, t) in first_seen.iter().enumerate() {
            prop_assert_eq!(dict.get_by_index(i as u32 + 1).map(|e| e.term()), Some(t.as_str()));
        }

        let ordered: Vec<&str> = dict.iter().map(|e| e.term()).collect();
        prop_assert!(ordered.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn vector_frequencies_match_occurrences(picks in proptest::collection::vec(0usize..40, 0..300)) {
        let mut dict = Dictionary::new("prop");
        for i in 0..40 {
            dict.insert_term(&format!("t{i}")).unwrap();
        }
        let mut vector = DocumentVector::new("doc");
        let mut expected: BTreeMap<u32, u32> = BTreeMap::new();
        for &p in &picks {
            let entry = dict.get(&format!("t{p}")).unwrap();
            vector.add(entry).unwrap();
            *expected.entry(entry.index()).or_insert(0) += 1;
            prop_assert!(vector.is_balanced());
        }

        prop_assert_eq!(vector.item_count(), expected.len());
        let actual: BTreeMap<u32, u32> = vector.iter().map(|i| (i.term_index(), i.frequency())).collect();
        prop_assert_eq!(actual, expected);
        let order: Vec<u32> = vector.iter().map(|i| i.term_index()).collect();
        prop_assert!(order.windows(2).all(|w| w[0] < w[1]));
    }
}
