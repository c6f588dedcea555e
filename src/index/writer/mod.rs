// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{
    align_to_block,
    block::PointerBlockEncoder,
    level::{DataLevelWriter, LevelWriter},
    write_len_prefixed, write_utf, DataTerm, PointerTerm, FORMAT_VERSION,
};
use crate::{
    accumulator::TermAccumulator,
    comparator::{Comparator, TermSize},
    mode::Mode,
    suffix::TermStream,
    Slice,
};
use byteorder::{BigEndian, WriteBytesExt};
use std::{
    fs::File,
    io::{BufWriter, Seek, Write},
    path::Path,
};

/// Builds one immutable on-disk index file out of `(term, key, position)`
/// triples.
///
/// A builder is owned by exactly one caller: it is fed with [`OnDiskIndexBuilder::add`]
/// during a flush or compaction and consumed by a single [`OnDiskIndexBuilder::finish`]
/// call. Abandoning a build simply drops the builder; a build failing inside
/// `finish` leaves a partial file behind that the caller reconciles.
pub struct OnDiskIndexBuilder {
    term_comparator: Comparator,
    mode: Mode,
    term_size: TermSize,

    accumulator: TermAccumulator,
}

impl OnDiskIndexBuilder {
    /// Creates a builder over the given term and key orderings.
    #[must_use]
    pub fn new(term_comparator: Comparator, key_comparator: Comparator, mode: Mode) -> Self {
        Self {
            term_comparator,
            mode,
            term_size: TermSize::of(term_comparator),
            accumulator: TermAccumulator::new(key_comparator),
        }
    }

    /// Buffers one triple.
    ///
    /// Never fails; oversized terms are logged and dropped.
    pub fn add(&mut self, term: impl Into<Slice>, key: &[u8], key_position: u64) -> &mut Self {
        self.accumulator.add(term.into(), key, key_position);
        self
    }

    /// Advisory in-memory footprint, for upstream flush policies.
    #[must_use]
    pub fn estimated_memory_use(&self) -> usize {
        self.accumulator.estimated_memory_use()
    }

    /// Returns `true` if no term was accepted so far.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    /// Writes the index file.
    ///
    /// Returns `false`, creating no file, when nothing was accepted. Every
    /// failure surfaces as a single [`crate::Error::Write`] naming the
    /// target file and wrapping the originating error.
    pub fn finish<P: AsRef<Path>>(self, path: P) -> crate::Result<bool> {
        let path = path.as_ref();

        if self.accumulator.is_empty() {
            log::debug!("no accepted terms, skipping index file {path:?}");
            return Ok(false);
        }

        self.write_file(path).map_err(|e| crate::Error::Write {
            file: path.into(),
            source: Box::new(e),
        })
    }

    fn write_file(self, path: &Path) -> crate::Result<bool> {
        let Self {
            term_comparator,
            mode,
            term_size,
            accumulator,
        } = self;

        // NOTE: The caller checked that the accumulator is not empty
        #[allow(clippy::expect_used)]
        let min_key = accumulator
            .min_key
            .clone()
            .expect("accumulator should not be empty");

        #[allow(clippy::expect_used)]
        let max_key = accumulator
            .max_key
            .clone()
            .expect("accumulator should not be empty");

        let stream = TermStream::new(accumulator.terms, term_comparator, mode);

        let (Some(min_term), Some(max_term)) =
            (stream.min_term().cloned(), stream.max_term().cloned())
        else {
            // Zero-length terms expand into nothing
            log::debug!("term stream is empty, skipping index file {path:?}");
            return Ok(false);
        };

        let file = File::create(path)?;
        let mut out = BufWriter::with_capacity(u16::MAX.into(), file);

        // ---- header ----

        write_utf(&mut out, FORMAT_VERSION)?;
        out.write_i16::<BigEndian>(term_size.size_code())?;

        write_len_prefixed(&mut out, &min_term)?;
        write_len_prefixed(&mut out, &max_term)?;
        write_len_prefixed(&mut out, &min_key)?;
        write_len_prefixed(&mut out, &max_key)?;

        write_utf(&mut out, mode.as_str())?;

        align_to_block(&mut out)?;

        // ---- data level plus promotion cascade ----

        let mut data_level = DataLevelWriter::new(term_size, mode);
        let mut levels: Vec<LevelWriter<PointerBlockEncoder>> = Vec::new();

        let mut term_count = 0usize;

        for (term, postings) in stream {
            term_count += 1;

            if let Some(ptr) = data_level.add(&mut out, DataTerm::new(term, postings))? {
                promote(&mut levels, &mut out, ptr, 0, term_size)?;
            }
        }

        if let Some(ptr) = data_level.final_flush(&mut out, !levels.is_empty())? {
            promote(&mut levels, &mut out, ptr, 0, term_size)?;
        }

        let mut idx = 0;
        while idx < levels.len() {
            let has_parent = idx + 1 < levels.len();

            let promoted = {
                // NOTE: idx is bound by the length check above
                #[allow(clippy::expect_used)]
                let level = levels.get_mut(idx).expect("level should exist");
                level.final_flush(&mut out, has_parent)?
            };

            if let Some(ptr) = promoted {
                promote(&mut levels, &mut out, ptr, idx + 1, term_size)?;
            }

            idx += 1;
        }

        // ---- footer ----

        let level_index_position = out.stream_position()?;
        log::trace!("level_index_position={level_index_position}");

        // NOTE: The cascade height is bound by the term count
        #[allow(clippy::cast_possible_truncation)]
        out.write_u32::<BigEndian>(levels.len() as u32)?;

        for level in levels.iter().rev() {
            level.flush_metadata(&mut out)?;
        }

        data_level.flush_metadata(&mut out)?;

        out.write_u64::<BigEndian>(level_index_position)?;

        out.flush()?;
        out.get_mut().sync_all()?;

        log::debug!(
            "written {term_count} terms into {} data blocks and {} pointer levels in {path:?}",
            data_level.data_block_count(),
            levels.len(),
        );

        Ok(true)
    }
}

/// Feeds a separator up the levels, growing the list by one fresh level
/// whenever the cascade outgrows its height, until some level accepts the
/// pointer without cutting a block.
fn promote<W: Write + Seek>(
    levels: &mut Vec<LevelWriter<PointerBlockEncoder>>,
    out: &mut W,
    ptr: PointerTerm,
    start: usize,
    term_size: TermSize,
) -> crate::Result<()> {
    let mut current = ptr;
    let mut idx = start;

    loop {
        if levels.len() == idx {
            levels.push(LevelWriter::new(PointerBlockEncoder::new(term_size)));
        }

        // NOTE: The level was just created if it was missing
        #[allow(clippy::expect_used)]
        let level = levels.get_mut(idx).expect("level should exist");

        match level.add(out, current)? {
            Some(promoted) => {
                current = promoted;
                idx += 1;
            }
            None => return Ok(()),
        }
    }
}
