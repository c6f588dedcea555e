// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{comparator::Comparator, mode::Mode, postings::TokenTreeBuilder, Slice};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// Sorted `(term, postings)` stream feeding the on-disk writer.
///
/// In suffix mode over a literal comparator, every term is expanded into its
/// non-empty suffixes and the postings of terms sharing a suffix are merged
/// into one container. In every other configuration the accumulated terms
/// are emitted as they are, ascending under the term comparator.
pub struct TermStream {
    entries: std::vec::IntoIter<(Slice, TokenTreeBuilder)>,

    min_term: Option<Slice>,
    max_term: Option<Slice>,
}

impl TermStream {
    /// Sorts (and possibly expands) the accumulated terms.
    #[must_use]
    pub fn new(
        terms: FxHashMap<Slice, TokenTreeBuilder>,
        comparator: Comparator,
        mode: Mode,
    ) -> Self {
        let entries: Vec<(Slice, TokenTreeBuilder)> =
            if mode == Mode::Suffix && comparator.is_literal() {
                // NOTE: Literal comparators order bytewise, so the map order
                // is already the comparator order
                let mut expanded: BTreeMap<Slice, TokenTreeBuilder> = BTreeMap::new();

                for (term, postings) in terms {
                    for suffix in suffixes(&term) {
                        expanded
                            .entry(suffix)
                            .and_modify(|tree| tree.merge(&postings))
                            .or_insert_with(|| postings.clone());
                    }
                }

                expanded.into_iter().collect()
            } else {
                let mut entries: Vec<_> = terms.into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| comparator.compare(a, b));
                entries
            };

        let min_term = entries.first().map(|(term, _)| term.clone());
        let max_term = entries.last().map(|(term, _)| term.clone());

        Self {
            entries: entries.into_iter(),
            min_term,
            max_term,
        }
    }

    /// Smallest emitted term.
    #[must_use]
    pub fn min_term(&self) -> Option<&Slice> {
        self.min_term.as_ref()
    }

    /// Largest emitted term.
    #[must_use]
    pub fn max_term(&self) -> Option<&Slice> {
        self.max_term.as_ref()
    }
}

impl Iterator for TermStream {
    type Item = (Slice, TokenTreeBuilder);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

/// All distinct non-empty suffixes of a term.
///
/// Valid UTF-8 is cut at character boundaries, anything else at every byte.
fn suffixes(term: &Slice) -> Vec<Slice> {
    let mut items = Vec::with_capacity(term.len());

    if let Ok(text) = std::str::from_utf8(term) {
        for (offset, _) in text.char_indices() {
            if let Some(suffix) = term.get(offset..) {
                items.push(Slice::from(suffix));
            }
        }
    } else {
        for offset in 0..term.len() {
            if let Some(suffix) = term.get(offset..) {
                items.push(Slice::from(suffix));
            }
        }
    }

    items
}
