// Copyright (c) 2025-present, term-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

/// 64-bit partition key token, the ordering axis of all postings.
pub type Token = i64;

/// Hashes a partition key into its token.
#[must_use]
pub fn token_of(key: &[u8]) -> Token {
    // NOTE: Tokens are signed by definition, reinterpreting the hash is intended
    #[allow(clippy::cast_possible_wrap)]
    {
        xxhash_rust::xxh3::xxh3_64(key) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn token_is_deterministic() {
        assert_eq!(token_of(b"pk1"), token_of(b"pk1"));
        assert_ne!(token_of(b"pk1"), token_of(b"pk2"));
    }
}
