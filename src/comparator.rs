// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::DecodeError;
use std::cmp::Ordering;

/// Total ordering over the serialized byte form of an indexed value type.
///
/// One comparator orders the terms of an index, another one orders the
/// partition keys; both are fixed at builder construction time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Comparator {
    /// 32-bit signed integers (big-endian)
    Int32,

    /// 32-bit IEEE-754 floats (big-endian)
    Float32,

    /// 64-bit signed integers (big-endian)
    Int64,

    /// 64-bit IEEE-754 floats (big-endian)
    Float64,

    /// Millisecond timestamps, stored as 64-bit signed integers
    Timestamp,

    /// Calendar days, stored as 64-bit signed integers
    Date,

    /// Random (version 4) UUIDs
    Uuid,

    /// Time-ordered (version 1) UUIDs
    TimeUuid,

    /// ASCII text
    Ascii,

    /// UTF-8 text
    Utf8,

    /// Raw bytes
    Bytes,
}

impl Comparator {
    /// Compares two serialized values.
    #[must_use]
    pub fn compare(self, a: &[u8], b: &[u8]) -> Ordering {
        match self {
            Self::Int32 => be_i32(a).cmp(&be_i32(b)),
            Self::Float32 => be_f32(a).total_cmp(&be_f32(b)),
            Self::Int64 | Self::Timestamp | Self::Date => be_i64(a).cmp(&be_i64(b)),
            Self::Float64 => be_f64(a).total_cmp(&be_f64(b)),
            Self::Uuid | Self::TimeUuid | Self::Ascii | Self::Utf8 | Self::Bytes => a.cmp(b),
        }
    }

    /// Returns `true` if this comparator orders text.
    ///
    /// Only text terms can be expanded into their suffixes.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self, Self::Ascii | Self::Utf8)
    }
}

fn be_i32(bytes: &[u8]) -> i32 {
    let mut buf = [0u8; 4];
    for (dst, src) in buf.iter_mut().zip(bytes) {
        *dst = *src;
    }
    i32::from_be_bytes(buf)
}

fn be_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    for (dst, src) in buf.iter_mut().zip(bytes) {
        *dst = *src;
    }
    i64::from_be_bytes(buf)
}

fn be_f32(bytes: &[u8]) -> f32 {
    let mut buf = [0u8; 4];
    for (dst, src) in buf.iter_mut().zip(bytes) {
        *dst = *src;
    }
    f32::from_be_bytes(buf)
}

fn be_f64(bytes: &[u8]) -> f64 {
    let mut buf = [0u8; 8];
    for (dst, src) in buf.iter_mut().zip(bytes) {
        *dst = *src;
    }
    f64::from_be_bytes(buf)
}

/// Size discipline of serialized terms.
///
/// Fixed-size terms are written without a length prefix; everything else
/// carries a 2-byte length in front of the term bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TermSize {
    /// 4-byte terms
    Int,

    /// 8-byte terms
    Long,

    /// 16-byte terms
    Uuid,

    /// Length-prefixed terms
    Variable,
}

impl TermSize {
    /// Classifies a term comparator into its size discipline.
    #[must_use]
    pub fn of(comparator: Comparator) -> Self {
        match comparator {
            Comparator::Int32 | Comparator::Float32 => Self::Int,

            Comparator::Int64 | Comparator::Float64 | Comparator::Timestamp | Comparator::Date => {
                Self::Long
            }

            Comparator::Uuid | Comparator::TimeUuid => Self::Uuid,

            Comparator::Ascii | Comparator::Utf8 | Comparator::Bytes => Self::Variable,
        }
    }

    /// Signed size code persisted in the file header.
    #[must_use]
    pub fn size_code(self) -> i16 {
        match self {
            Self::Int => 4,
            Self::Long => 8,
            Self::Uuid => 16,
            Self::Variable => -1,
        }
    }

    /// Returns `true` if terms are serialized without a length prefix.
    #[must_use]
    pub fn is_constant(self) -> bool {
        !matches!(self, Self::Variable)
    }

    /// Parses a size code read back from a file header.
    pub fn try_from_code(code: i16) -> Result<Self, DecodeError> {
        match code {
            4 => Ok(Self::Int),
            8 => Ok(Self::Long),
            16 => Ok(Self::Uuid),
            -1 => Ok(Self::Variable),
            _ => Err(DecodeError::InvalidHeader("TermSize")),
        }
    }
}
