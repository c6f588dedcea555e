// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

pub mod block;
pub mod descriptor;
pub mod level;
pub mod writer;

use crate::{
    coding::{DecodeError, EncodeError},
    postings::TokenTreeBuilder,
    Slice,
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, Write};

/// On-disk unit of the index file layout.
pub const BLOCK_SIZE: usize = 4_096;

/// Terms of this size or larger are rejected by the accumulator.
pub const MAX_TERM_SIZE: usize = 1_024;

/// Number of consecutive data blocks covered by one super block tree.
pub const SUPER_BLOCK_SIZE: usize = 64;

/// Largest posting list written inline next to its term (sparse mode).
pub const MAX_INLINE_TOKENS: usize = 5;

/// Version string persisted in the file header.
pub const FORMAT_VERSION: &str = "1";

/// Separator promoted into a pointer level: the last term of a child block
/// plus that block's ordinal within its level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PointerTerm {
    /// Last term of the child block
    pub term: Slice,

    /// Ordinal of the child block within its level
    pub block_index: u32,
}

impl PointerTerm {
    pub(crate) fn new(term: Slice, block_index: u32) -> Self {
        Self { term, block_index }
    }
}

/// A term and its postings on their way into a data block.
#[derive(Clone, Debug)]
pub struct DataTerm {
    /// Term bytes
    pub term: Slice,

    /// Postings of the term
    pub postings: TokenTreeBuilder,
}

impl DataTerm {
    /// Bundles a term with its postings.
    #[must_use]
    pub fn new(term: Slice, postings: TokenTreeBuilder) -> Self {
        Self { term, postings }
    }
}

/// Anything that can be keyed by its term bytes inside a block.
pub(crate) trait IndexTerm {
    fn term(&self) -> &Slice;
}

impl IndexTerm for PointerTerm {
    fn term(&self) -> &Slice {
        &self.term
    }
}

impl IndexTerm for DataTerm {
    fn term(&self) -> &Slice {
        &self.term
    }
}

static ZEROES: [u8; BLOCK_SIZE] = [0; BLOCK_SIZE];

/// Zero-pads the stream up to the next block boundary.
pub(crate) fn align_to_block<W: Write + Seek>(out: &mut W) -> crate::Result<()> {
    let position = out.stream_position()?;

    // NOTE: The remainder is smaller than BLOCK_SIZE, which fits usize
    #[allow(clippy::cast_possible_truncation)]
    let overhang = (position % BLOCK_SIZE as u64) as usize;

    if overhang > 0 {
        if let Some(padding) = ZEROES.get(..BLOCK_SIZE - overhang) {
            out.write_all(padding)?;
        }
    }

    Ok(())
}

pub(crate) fn write_utf<W: Write>(writer: &mut W, text: &str) -> Result<(), EncodeError> {
    // NOTE: Header strings are a couple of bytes
    #[allow(clippy::cast_possible_truncation)]
    writer.write_u16::<BigEndian>(text.len() as u16)?;
    writer.write_all(text.as_bytes())?;

    Ok(())
}

pub(crate) fn read_utf<R: Read>(reader: &mut R) -> Result<String, DecodeError> {
    let len = reader.read_u16::<BigEndian>()?;

    let mut buf = vec![0; len.into()];
    reader.read_exact(&mut buf)?;

    std::str::from_utf8(&buf)
        .map(String::from)
        .map_err(DecodeError::Utf8)
}

pub(crate) fn write_len_prefixed<W: Write>(
    writer: &mut W,
    bytes: &[u8],
) -> Result<(), EncodeError> {
    // NOTE: Terms are bound by MAX_TERM_SIZE and keys stay far below u16::MAX
    #[allow(clippy::cast_possible_truncation)]
    writer.write_u16::<BigEndian>(bytes.len() as u16)?;
    writer.write_all(bytes)?;

    Ok(())
}

pub(crate) fn read_len_prefixed<R: Read>(reader: &mut R) -> Result<Slice, DecodeError> {
    let len = reader.read_u16::<BigEndian>()?;
    Ok(Slice::from_reader(reader, len.into())?)
}
