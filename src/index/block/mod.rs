// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{align_to_block, DataTerm, IndexTerm, PointerTerm, BLOCK_SIZE, MAX_INLINE_TOKENS};
use crate::{
    coding::Encode, comparator::TermSize, mode::Mode, postings::TokenTreeBuilder, Slice,
};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{Seek, Write};

/// Behaviour shared by the block kinds a level writer can drive.
pub(crate) trait TermBlock {
    type Term: IndexTerm;

    /// Number of buffered entries.
    fn count(&self) -> usize;

    /// Whether the entry still fits next to the block header, the grown
    /// offset table and the buffered payload.
    fn has_space_for(&self, term: &Self::Term) -> bool;

    /// Buffers one entry. The caller is responsible for flushing first if
    /// there is no space left.
    fn add(&mut self, term: Self::Term);

    /// Writes the block, pads it to the next block boundary and resets all
    /// in-memory state.
    fn flush_and_clear<W: Write + Seek>(&mut self, out: &mut W) -> crate::Result<()>;
}

/// Offset table plus payload buffer shared by both block kinds.
#[derive(Debug)]
struct BlockBuffer {
    term_size: TermSize,

    buffer: Vec<u8>,
    offsets: Vec<u16>,
}

impl BlockBuffer {
    fn new(term_size: TermSize) -> Self {
        Self {
            term_size,
            buffer: Vec::with_capacity(BLOCK_SIZE),
            offsets: Vec::new(),
        }
    }

    /// Serialized footprint of a term: a length prefix is only paid in
    /// variable size mode.
    fn term_span(&self, term: &Slice) -> usize {
        term.len() + if self.term_size.is_constant() { 0 } else { 2 }
    }

    fn has_space_for(&self, payload: usize) -> bool {
        4 + 2 * (self.offsets.len() + 1) + self.buffer.len() + payload < BLOCK_SIZE
    }

    fn begin_entry(&mut self, term: &Slice) {
        // NOTE: Entry starts are bound by BLOCK_SIZE, which fits u16
        #[allow(clippy::cast_possible_truncation)]
        self.offsets.push(self.buffer.len() as u16);

        if !self.term_size.is_constant() {
            // NOTE: Terms are bound by MAX_TERM_SIZE
            #[allow(clippy::cast_possible_truncation)]
            let len = term.len() as u16;
            self.buffer.extend_from_slice(&len.to_be_bytes());
        }

        self.buffer.extend_from_slice(term);
    }

    fn put_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    fn put_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    fn put_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    fn count(&self) -> usize {
        self.offsets.len()
    }

    fn write_header_and_payload<W: Write>(&self, out: &mut W) -> crate::Result<()> {
        // NOTE: Entry counts are bound by BLOCK_SIZE
        #[allow(clippy::cast_possible_truncation)]
        out.write_u32::<BigEndian>(self.offsets.len() as u32)?;

        for offset in &self.offsets {
            out.write_u16::<BigEndian>(*offset)?;
        }

        out.write_all(&self.buffer)?;

        Ok(())
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.offsets.clear();
    }
}

/// Fixed-size block of pointer terms.
#[derive(Debug)]
pub(crate) struct PointerBlockEncoder {
    buf: BlockBuffer,
}

impl PointerBlockEncoder {
    pub(crate) fn new(term_size: TermSize) -> Self {
        Self {
            buf: BlockBuffer::new(term_size),
        }
    }
}

impl TermBlock for PointerBlockEncoder {
    type Term = PointerTerm;

    fn count(&self) -> usize {
        self.buf.count()
    }

    fn has_space_for(&self, term: &PointerTerm) -> bool {
        self.buf.has_space_for(self.buf.term_span(&term.term) + 4)
    }

    fn add(&mut self, term: PointerTerm) {
        self.buf.begin_entry(&term.term);
        self.buf.put_u32(term.block_index);
    }

    fn flush_and_clear<W: Write + Seek>(&mut self, out: &mut W) -> crate::Result<()> {
        self.buf.write_header_and_payload(out)?;
        align_to_block(out)?;

        self.buf.clear();

        Ok(())
    }
}

/// Data-level block: terms plus inline or overflow posting bodies and, in
/// sparse mode, a combined token tree over the whole block.
pub(crate) struct DataBlockEncoder {
    buf: BlockBuffer,
    mode: Mode,

    /// Running byte offset into the overflow region
    overflow_offset: u32,

    /// Number of terms whose postings were inlined
    sparse_term_count: usize,

    /// Overflow containers, drained on flush
    containers: Vec<TokenTreeBuilder>,

    /// Combined token tree over all terms of the block (sparse mode)
    combined: TokenTreeBuilder,
}

impl DataBlockEncoder {
    pub(crate) fn new(term_size: TermSize, mode: Mode) -> Self {
        Self {
            buf: BlockBuffer::new(term_size),
            mode,
            overflow_offset: 0,
            sparse_term_count: 0,
            containers: Vec::new(),
            combined: TokenTreeBuilder::new(),
        }
    }

    fn is_inlined(&self, postings: &TokenTreeBuilder) -> bool {
        self.mode == Mode::Sparse && postings.token_count() <= MAX_INLINE_TOKENS
    }

    /// Footprint of the postings part of an entry: an inline posting list,
    /// or a type tag plus an overflow offset.
    fn postings_span(&self, postings: &TokenTreeBuilder) -> usize {
        if self.is_inlined(postings) {
            1 + 8 * postings.token_count()
        } else {
            1 + 4
        }
    }
}

impl TermBlock for DataBlockEncoder {
    type Term = DataTerm;

    fn count(&self) -> usize {
        self.buf.count()
    }

    fn has_space_for(&self, term: &DataTerm) -> bool {
        self.buf
            .has_space_for(self.buf.term_span(&term.term) + self.postings_span(&term.postings))
    }

    fn add(&mut self, term: DataTerm) {
        let DataTerm { term, postings } = term;

        if self.mode == Mode::Sparse {
            self.combined.merge(&postings);
        }

        self.buf.begin_entry(&term);

        if self.is_inlined(&postings) {
            // NOTE: Inlined posting lists hold at most MAX_INLINE_TOKENS tokens
            #[allow(clippy::cast_possible_truncation)]
            self.buf.put_u8(postings.token_count() as u8);

            for token in postings.tokens() {
                self.buf.put_i64(token);
            }

            self.sparse_term_count += 1;
        } else {
            self.buf.put_u8(0);
            self.buf.put_u32(self.overflow_offset);

            // NOTE: Overflow regions stay far below u32::MAX per block
            #[allow(clippy::cast_possible_truncation)]
            {
                self.overflow_offset += postings.serialized_size() as u32;
            }

            self.containers.push(postings);
        }
    }

    fn flush_and_clear<W: Write + Seek>(&mut self, out: &mut W) -> crate::Result<()> {
        self.buf.write_header_and_payload(out)?;

        if self.sparse_term_count == 0 {
            out.write_i32::<BigEndian>(-1)?;
        } else {
            // NOTE: Overflow regions stay far below i32::MAX per block
            #[allow(clippy::cast_possible_wrap)]
            out.write_i32::<BigEndian>(self.overflow_offset as i32)?;
        }

        for container in &self.containers {
            container.encode_into(out)?;
        }

        if self.sparse_term_count > 0 {
            self.combined.encode_into(out)?;
        }

        align_to_block(out)?;

        self.buf.clear();
        self.containers.clear();
        self.combined = TokenTreeBuilder::new();
        self.overflow_offset = 0;
        self.sparse_term_count = 0;

        Ok(())
    }
}
