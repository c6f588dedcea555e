// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::DecodeError;

/// Decides how terms and their postings are laid out in the data level.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Terms are indexed as given
    Original,

    /// Text terms are expanded into all of their suffixes
    Suffix,

    /// Small posting lists are inlined next to their term, and combined
    /// token trees are kept per data block and per super block
    Sparse,
}

impl Mode {
    /// Stable name persisted in the file header.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::Suffix => "SUFFIX",
            Self::Sparse => "SPARSE",
        }
    }

    pub(crate) fn from_name(name: &str) -> Result<Self, DecodeError> {
        match name {
            "ORIGINAL" => Ok(Self::Original),
            "SUFFIX" => Ok(Self::Suffix),
            "SPARSE" => Ok(Self::Sparse),
            _ => Err(DecodeError::InvalidHeader("Mode")),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
