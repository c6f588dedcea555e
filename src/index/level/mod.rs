// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{
    align_to_block,
    block::{DataBlockEncoder, TermBlock},
    DataTerm, IndexTerm, PointerTerm, SUPER_BLOCK_SIZE,
};
use crate::{coding::Encode, comparator::TermSize, mode::Mode, postings::TokenTreeBuilder};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{Seek, Write};

/// One level of the block hierarchy.
///
/// Accepts an ascending stream of terms, cuts blocks when they run out of
/// space, and hands the separator of every cut block up to the caller so it
/// can be promoted into the parent level.
pub(crate) struct LevelWriter<B: TermBlock> {
    block: B,

    /// File position of every cut block, ascending
    block_offsets: Vec<u64>,

    /// Pointer term built from the most recently accepted term
    last_term: Option<PointerTerm>,
}

impl<B: TermBlock> LevelWriter<B> {
    pub(crate) fn new(block: B) -> Self {
        Self {
            block,
            block_offsets: Vec::new(),
            last_term: None,
        }
    }

    /// Appends a term, returning the separator to promote if a block was cut.
    pub(crate) fn add<W: Write + Seek>(
        &mut self,
        out: &mut W,
        term: B::Term,
    ) -> crate::Result<Option<PointerTerm>> {
        let mut to_promote = None;

        if !self.block.has_space_for(&term) {
            self.flush(out)?;
            to_promote = self.take_promotion();
        }

        self.append(term);

        Ok(to_promote)
    }

    pub(crate) fn has_space_for(&self, term: &B::Term) -> bool {
        self.block.has_space_for(term)
    }

    /// Buffers a term and rebuilds the promotion candidate from it.
    pub(crate) fn append(&mut self, term: B::Term) {
        let bytes = term.term().clone();

        self.block.add(term);

        // NOTE: Block counts stay far below u32::MAX
        #[allow(clippy::cast_possible_truncation)]
        let block_index = self.block_offsets.len() as u32;

        self.last_term = Some(PointerTerm::new(bytes, block_index));
    }

    /// Cuts the in-memory block, recording its file position first.
    pub(crate) fn flush<W: Write + Seek>(&mut self, out: &mut W) -> crate::Result<()> {
        self.block_offsets.push(out.stream_position()?);
        self.block.flush_and_clear(out)
    }

    pub(crate) fn take_promotion(&mut self) -> Option<PointerTerm> {
        self.last_term.take()
    }

    /// Cuts a trailing partial block. The separator is promoted only when a
    /// parent level exists to receive it.
    pub(crate) fn final_flush<W: Write + Seek>(
        &mut self,
        out: &mut W,
        promote: bool,
    ) -> crate::Result<Option<PointerTerm>> {
        if self.block.count() == 0 {
            return Ok(None);
        }

        self.flush(out)?;

        Ok(if promote { self.take_promotion() } else { None })
    }

    pub(crate) fn block_count(&self) -> usize {
        self.block_offsets.len()
    }

    /// Writes the block offset array of this level.
    pub(crate) fn flush_metadata<W: Write>(&self, out: &mut W) -> crate::Result<()> {
        write_offsets(out, &self.block_offsets)
    }
}

fn write_offsets<W: Write>(out: &mut W, offsets: &[u64]) -> crate::Result<()> {
    // NOTE: Block counts stay far below u32::MAX
    #[allow(clippy::cast_possible_truncation)]
    out.write_u32::<BigEndian>(offsets.len() as u32)?;

    for offset in offsets {
        out.write_u64::<BigEndian>(*offset)?;
    }

    Ok(())
}

/// Rolling combined token tree over consecutive data blocks.
#[derive(Default)]
struct SuperBlockState {
    offsets: Vec<u64>,
    data_block_count: usize,
    tree: TokenTreeBuilder,
}

impl SuperBlockState {
    fn flush<W: Write + Seek>(&mut self, out: &mut W, force: bool) -> crate::Result<()> {
        if self.data_block_count == SUPER_BLOCK_SIZE || (force && !self.tree.is_empty()) {
            self.offsets.push(out.stream_position()?);

            self.tree.encode_into(out)?;
            align_to_block(out)?;

            log::trace!(
                "cut super block #{} covering {} data blocks",
                self.offsets.len(),
                self.data_block_count,
            );

            self.data_block_count = 0;
            self.tree = TokenTreeBuilder::new();
        }

        Ok(())
    }
}

/// The data level.
///
/// In sparse mode it additionally aggregates the tokens of every accepted
/// term and cuts a block-aligned combined token tree after every
/// `SUPER_BLOCK_SIZE` data blocks, plus a final forced one.
pub(crate) struct DataLevelWriter {
    level: LevelWriter<DataBlockEncoder>,
    super_blocks: Option<SuperBlockState>,
}

impl DataLevelWriter {
    pub(crate) fn new(term_size: TermSize, mode: Mode) -> Self {
        Self {
            level: LevelWriter::new(DataBlockEncoder::new(term_size, mode)),
            super_blocks: (mode == Mode::Sparse).then(SuperBlockState::default),
        }
    }

    pub(crate) fn add<W: Write + Seek>(
        &mut self,
        out: &mut W,
        term: DataTerm,
    ) -> crate::Result<Option<PointerTerm>> {
        match &mut self.super_blocks {
            None => self.level.add(out, term),
            Some(state) => {
                let mut to_promote = None;

                if !self.level.has_space_for(&term) {
                    self.level.flush(out)?;
                    to_promote = self.level.take_promotion();

                    state.data_block_count += 1;
                    state.flush(out, false)?;
                }

                // The super block tree is grown after the cut, so this term
                // counts towards the super block its data block belongs to
                state.tree.merge(&term.postings);

                self.level.append(term);

                Ok(to_promote)
            }
        }
    }

    pub(crate) fn final_flush<W: Write + Seek>(
        &mut self,
        out: &mut W,
        promote: bool,
    ) -> crate::Result<Option<PointerTerm>> {
        let to_promote = self.level.final_flush(out, promote)?;

        if let Some(state) = &mut self.super_blocks {
            state.flush(out, true)?;
        }

        Ok(to_promote)
    }

    pub(crate) fn data_block_count(&self) -> usize {
        self.level.block_count()
    }

    /// Writes the block offset array, followed by the super block offset
    /// array in sparse mode.
    pub(crate) fn flush_metadata<W: Write>(&self, out: &mut W) -> crate::Result<()> {
        self.level.flush_metadata(out)?;

        if let Some(state) = &self.super_blocks {
            write_offsets(out, &state.offsets)?;
        }

        Ok(())
    }
}
