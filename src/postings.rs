// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::{
    coding::{Decode, DecodeError, Encode, EncodeError},
    hash::Token,
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::{
    collections::{BTreeMap, BTreeSet},
    io::{Read, Write},
};

/// Collects the `(token, key position)` postings of one term.
///
/// Tokens are kept in ascending order. The finalized body produced by
/// [`Encode`] is what data blocks embed by reference, and what combined and
/// super block trees are written as:
///
/// ```text
/// [token count; u32]
/// for each token, ascending:
///   [token; i64] [position count; u32] [positions; u64...]
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenTreeBuilder {
    entries: BTreeMap<Token, BTreeSet<u64>>,
}

impl TokenTreeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one key position for a token.
    pub fn add(&mut self, token: Token, position: u64) {
        self.entries.entry(token).or_default().insert(position);
    }

    /// Merges all entries of another builder into this one.
    pub fn merge(&mut self, other: &Self) {
        for (token, positions) in &other.entries {
            self.entries
                .entry(*token)
                .or_default()
                .extend(positions.iter().copied());
        }
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no postings were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates tokens in ascending order.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.entries.keys().copied()
    }

    /// Iterates `(token, positions)` entries in ascending token order.
    pub fn iter(&self) -> impl Iterator<Item = (Token, &BTreeSet<u64>)> {
        self.entries.iter().map(|(token, positions)| (*token, positions))
    }

    /// Size of the finalized body in bytes.
    #[must_use]
    pub fn serialized_size(&self) -> usize {
        let positions: usize = self.entries.values().map(BTreeSet::len).sum();
        4 + self.entries.len() * (8 + 4) + positions * 8
    }
}

impl Encode for TokenTreeBuilder {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        // NOTE: Token counts are bound by the number of accepted postings,
        // which stays far below u32::MAX
        #[allow(clippy::cast_possible_truncation)]
        writer.write_u32::<BigEndian>(self.entries.len() as u32)?;

        for (token, positions) in &self.entries {
            writer.write_i64::<BigEndian>(*token)?;

            #[allow(clippy::cast_possible_truncation)]
            writer.write_u32::<BigEndian>(positions.len() as u32)?;

            for position in positions {
                writer.write_u64::<BigEndian>(*position)?;
            }
        }

        Ok(())
    }
}

impl Decode for TokenTreeBuilder {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self, DecodeError> {
        let token_count = reader.read_u32::<BigEndian>()?;

        let mut entries = BTreeMap::new();

        for _ in 0..token_count {
            let token = reader.read_i64::<BigEndian>()?;
            let position_count = reader.read_u32::<BigEndian>()?;

            let mut positions = BTreeSet::new();

            for _ in 0..position_count {
                positions.insert(reader.read_u64::<BigEndian>()?);
            }

            entries.insert(token, positions);
        }

        Ok(Self { entries })
    }
}
