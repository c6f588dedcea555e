// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Builder for block-structured on-disk secondary index files.
//!
//! ##### About
//!
//! This crate turns a stream of `(term, partition key, key position)`
//! triples, accumulated while a storage table is flushed or compacted, into
//! a single immutable index file. The file holds a term dictionary packed
//! into 4 KiB blocks, a B+-tree-like hierarchy of pointer blocks grown by
//! promoting the last term of every cut block, and per-term posting lists
//! keyed by the 64-bit token of the partition key.
//!
//! Three layouts are supported: terms as given, text terms expanded into
//! all of their suffixes (for suffix matching), and a sparse layout that
//! inlines small posting lists next to their term and aggregates combined
//! token trees per data block and per super block for accelerated scans.
//!
//! A builder is single-threaded and write-once: feed it with `add`, consume
//! it with one `finish` call. The query-time reader is a separate concern;
//! [`IndexDescriptor`] only decodes the header and level index that such a
//! reader bootstraps from.
//!
//! # Example usage
//!
//! ```
//! use term_index::{Comparator, Mode, OnDiskIndexBuilder};
//! #
//! # let dir = tempfile::tempdir()?;
//!
//! let mut builder = OnDiskIndexBuilder::new(
//!     Comparator::Utf8,  // orders the indexed terms
//!     Comparator::Bytes, // orders the partition keys
//!     Mode::Original,
//! );
//!
//! // Index column values against the position of their row's key
//! builder.add("apple", b"fruit-1", 0);
//! builder.add("banana", b"fruit-2", 16);
//! builder.add("apple", b"fruit-3", 32);
//!
//! let created = builder.finish(dir.path().join("SI_demo.db"))?;
//! assert!(created);
//! #
//! # Ok::<(), term_index::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs, clippy::cargo)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![allow(clippy::option_if_let_else)]

mod accumulator;

#[doc(hidden)]
pub mod coding;

mod comparator;
mod error;
mod hash;
mod index;
mod mode;
mod postings;
mod slice;
mod suffix;

pub use {
    accumulator::TermAccumulator,
    coding::{Decode, DecodeError, Encode, EncodeError},
    comparator::{Comparator, TermSize},
    error::{Error, Result},
    hash::{token_of, Token},
    index::{
        descriptor::{IndexDescriptor, LevelMeta},
        writer::OnDiskIndexBuilder,
        BLOCK_SIZE, FORMAT_VERSION, MAX_INLINE_TOKENS, MAX_TERM_SIZE, SUPER_BLOCK_SIZE,
    },
    mode::Mode,
    postings::TokenTreeBuilder,
    slice::Slice,
    suffix::TermStream,
};
