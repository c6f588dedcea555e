// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    comparator::Comparator, hash::token_of, index::MAX_TERM_SIZE, postings::TokenTreeBuilder,
    Slice,
};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Approximate heap cost of a fresh term entry: the map slot, the shared
/// byte buffer header and the root of its postings tree.
const TERM_ENTRY_OVERHEAD: usize = 80;

/// Approximate heap cost of one `(token, position)` insertion.
const POSTING_ENTRY_OVERHEAD: usize = 48;

/// In-memory term accumulator.
///
/// Deduplicates terms, aggregates their postings, and tracks the covered
/// partition key range. The memory estimate is advisory input for an
/// upstream flush policy, not an exact figure.
pub struct TermAccumulator {
    key_comparator: Comparator,

    pub(crate) terms: FxHashMap<Slice, TokenTreeBuilder>,

    pub(crate) min_key: Option<Slice>,
    pub(crate) max_key: Option<Slice>,

    estimated_bytes: usize,
}

impl TermAccumulator {
    /// Creates an empty accumulator over the given partition key ordering.
    #[must_use]
    pub fn new(key_comparator: Comparator) -> Self {
        Self {
            key_comparator,
            terms: FxHashMap::default(),
            min_key: None,
            max_key: None,
            estimated_bytes: 0,
        }
    }

    /// Buffers one `(term, key, key position)` triple.
    ///
    /// Over-long terms are logged and dropped; `add` itself never fails.
    pub fn add(&mut self, term: Slice, key: &[u8], key_position: u64) {
        if term.len() >= MAX_TERM_SIZE {
            log::error!(
                "rejecting oversized term ({} bytes, bound is {MAX_TERM_SIZE})",
                term.len(),
            );
            return;
        }

        let token = token_of(key);

        if let Some(postings) = self.terms.get_mut(&term) {
            postings.add(token, key_position);
        } else {
            self.estimated_bytes += term.len() + TERM_ENTRY_OVERHEAD;

            let mut postings = TokenTreeBuilder::new();
            postings.add(token, key_position);
            self.terms.insert(term, postings);
        }

        self.estimated_bytes += POSTING_ENTRY_OVERHEAD;

        self.update_key_bounds(key);
    }

    fn update_key_bounds(&mut self, key: &[u8]) {
        let replaces_min = match &self.min_key {
            Some(min) => self.key_comparator.compare(key, min) == Ordering::Less,
            None => true,
        };
        if replaces_min {
            self.min_key = Some(Slice::from(key));
        }

        let replaces_max = match &self.max_key {
            Some(max) => self.key_comparator.compare(key, max) == Ordering::Greater,
            None => true,
        };
        if replaces_max {
            self.max_key = Some(Slice::from(key));
        }
    }

    /// Advisory estimate of the current in-memory footprint in bytes.
    #[must_use]
    pub fn estimated_memory_use(&self) -> usize {
        self.estimated_bytes
    }

    /// Returns `true` if no term was accepted so far.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of distinct accepted terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }
}
