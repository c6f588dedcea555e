// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use super::{read_len_prefixed, read_utf, FORMAT_VERSION};
use crate::{coding::DecodeError, comparator::TermSize, mode::Mode, Slice};
use byteorder::{BigEndian, ReadBytesExt};
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};

/// Block offsets of one level, ascending.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LevelMeta {
    /// File position of every block of the level
    pub block_offsets: Vec<u64>,
}

/// Decoded header and level index of an index file.
///
/// This is the surface a reader bootstraps from: the header block at the
/// front, and the level index found through the trailing 8 bytes of the
/// file. Block contents themselves are left on disk.
#[derive(Clone, Debug)]
pub struct IndexDescriptor {
    /// Format version string
    pub version: String,

    /// Term size discipline
    pub term_size: TermSize,

    /// Smallest term of the data level
    pub min_term: Slice,

    /// Largest term of the data level
    pub max_term: Slice,

    /// Smallest indexed partition key
    pub min_key: Slice,

    /// Largest indexed partition key
    pub max_key: Slice,

    /// Index mode
    pub mode: Mode,

    /// Pointer levels, topmost first
    pub levels: Vec<LevelMeta>,

    /// The data level
    pub data_level: LevelMeta,

    /// Super block offsets (sparse mode only)
    pub super_block_offsets: Vec<u64>,

    /// File position of the level index
    pub level_index_position: u64,
}

impl IndexDescriptor {
    /// Reads the header and the trailing level index of an index file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        Ok(Self::decode_from(&mut reader)?)
    }

    fn decode_from<R: Read + Seek>(reader: &mut R) -> Result<Self, DecodeError> {
        let version = read_utf(reader)?;

        if version != FORMAT_VERSION {
            return Err(DecodeError::InvalidHeader("FormatVersion"));
        }

        let term_size = TermSize::try_from_code(reader.read_i16::<BigEndian>()?)?;

        let min_term = read_len_prefixed(reader)?;
        let max_term = read_len_prefixed(reader)?;
        let min_key = read_len_prefixed(reader)?;
        let max_key = read_len_prefixed(reader)?;

        let mode = Mode::from_name(&read_utf(reader)?)?;

        reader.seek(SeekFrom::End(-8))?;
        let level_index_position = reader.read_u64::<BigEndian>()?;

        reader.seek(SeekFrom::Start(level_index_position))?;

        let level_count = reader.read_u32::<BigEndian>()?;

        let mut levels = Vec::with_capacity(level_count as usize);

        for _ in 0..level_count {
            levels.push(LevelMeta {
                block_offsets: read_offsets(reader)?,
            });
        }

        let data_level = LevelMeta {
            block_offsets: read_offsets(reader)?,
        };

        let super_block_offsets = if mode == Mode::Sparse {
            read_offsets(reader)?
        } else {
            Vec::new()
        };

        Ok(Self {
            version,
            term_size,
            min_term,
            max_term,
            min_key,
            max_key,
            mode,
            levels,
            data_level,
            super_block_offsets,
            level_index_position,
        })
    }
}

fn read_offsets<R: Read>(reader: &mut R) -> Result<Vec<u64>, DecodeError> {
    let count = reader.read_u32::<BigEndian>()?;

    let mut offsets = Vec::with_capacity(count as usize);

    for _ in 0..count {
        offsets.push(reader.read_u64::<BigEndian>()?);
    }

    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{index::BLOCK_SIZE, Comparator, Mode, OnDiskIndexBuilder};
    use test_log::test;

    #[test]
    fn descriptor_roundtrips_header_fields() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("SI_header.db");

        let mut builder =
            OnDiskIndexBuilder::new(Comparator::Int64, Comparator::Int64, Mode::Original);

        builder.add(2i64.to_be_bytes(), &20i64.to_be_bytes(), 16);
        builder.add(1i64.to_be_bytes(), &10i64.to_be_bytes(), 0);

        assert!(builder.finish(&path)?);

        let descriptor = IndexDescriptor::from_file(&path)?;

        assert_eq!(FORMAT_VERSION, descriptor.version);
        assert_eq!(TermSize::Long, descriptor.term_size);
        assert_eq!(Mode::Original, descriptor.mode);

        assert_eq!(1i64.to_be_bytes().as_slice(), &*descriptor.min_term);
        assert_eq!(2i64.to_be_bytes().as_slice(), &*descriptor.max_term);
        assert_eq!(10i64.to_be_bytes().as_slice(), &*descriptor.min_key);
        assert_eq!(20i64.to_be_bytes().as_slice(), &*descriptor.max_key);

        assert_eq!(0, descriptor.levels.len());
        assert_eq!(
            vec![BLOCK_SIZE as u64],
            descriptor.data_level.block_offsets,
        );
        assert!(descriptor.super_block_offsets.is_empty());

        Ok(())
    }

    #[test]
    fn descriptor_block_offsets_are_aligned() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("SI_aligned.db");

        let mut builder =
            OnDiskIndexBuilder::new(Comparator::Bytes, Comparator::Bytes, Mode::Original);

        for idx in 0..2_000u64 {
            builder.add(
                idx.to_be_bytes(),
                nanoid::nanoid!().as_bytes(),
                idx * 16,
            );
        }

        assert!(builder.finish(&path)?);

        let descriptor = IndexDescriptor::from_file(&path)?;

        assert!(!descriptor.levels.is_empty());

        for level in &descriptor.levels {
            for offset in &level.block_offsets {
                assert_eq!(0, offset % BLOCK_SIZE as u64);
            }
        }

        for offset in &descriptor.data_level.block_offsets {
            assert_eq!(0, offset % BLOCK_SIZE as u64);
        }

        assert_eq!(0, descriptor.level_index_position % BLOCK_SIZE as u64);

        Ok(())
    }
}
