//! Raw block parsing helpers shared by the scenario tests.
//!
//! These walk the written file bytes directly so the tests do not depend on
//! any reader machinery beyond the descriptor.

#![allow(dead_code)]

/// Inline tokens, or an offset into the block's overflow region.
#[derive(Debug, PartialEq, Eq)]
pub enum PostingsRef {
    Inline(Vec<i64>),
    Overflow(u32),
}

#[derive(Debug)]
pub struct DataEntry {
    pub term: Vec<u8>,
    pub postings: PostingsRef,
    pub end: usize,
}

#[derive(Debug)]
pub struct PointerEntry {
    pub term: Vec<u8>,
    pub block_index: u32,
}

#[derive(Debug)]
pub struct DataBlock {
    pub entries: Vec<DataEntry>,
    /// The sparse overflow field: -1, or the overflow region length
    pub overflow_field: i32,
    /// Absolute file position right after the overflow field
    pub overflow_region: usize,
}

pub fn be_u16(file: &[u8], at: usize) -> u16 {
    u16::from_be_bytes(file[at..at + 2].try_into().unwrap())
}

pub fn be_u32(file: &[u8], at: usize) -> u32 {
    u32::from_be_bytes(file[at..at + 4].try_into().unwrap())
}

pub fn be_i32(file: &[u8], at: usize) -> i32 {
    i32::from_be_bytes(file[at..at + 4].try_into().unwrap())
}

pub fn be_i64(file: &[u8], at: usize) -> i64 {
    i64::from_be_bytes(file[at..at + 8].try_into().unwrap())
}

pub fn be_u64(file: &[u8], at: usize) -> u64 {
    u64::from_be_bytes(file[at..at + 8].try_into().unwrap())
}

/// Entry start positions of a block: `(absolute positions, payload start)`.
pub fn entry_positions(file: &[u8], block_offset: u64) -> (Vec<usize>, usize) {
    let base = block_offset as usize;
    let count = be_u32(file, base) as usize;
    let payload = base + 4 + 2 * count;

    let positions = (0..count)
        .map(|idx| payload + be_u16(file, base + 4 + 2 * idx) as usize)
        .collect();

    (positions, payload)
}

/// Reads a term at `at`; `term_len` is `None` for variable size terms.
fn read_term(file: &[u8], at: usize, term_len: Option<usize>) -> (Vec<u8>, usize) {
    match term_len {
        Some(len) => (file[at..at + len].to_vec(), at + len),
        None => {
            let len = be_u16(file, at) as usize;
            (file[at + 2..at + 2 + len].to_vec(), at + 2 + len)
        }
    }
}

pub fn parse_pointer_block(
    file: &[u8],
    block_offset: u64,
    term_len: Option<usize>,
) -> Vec<PointerEntry> {
    let (positions, _) = entry_positions(file, block_offset);

    positions
        .into_iter()
        .map(|at| {
            let (term, next) = read_term(file, at, term_len);
            PointerEntry {
                term,
                block_index: be_u32(file, next),
            }
        })
        .collect()
}

pub fn parse_data_block(file: &[u8], block_offset: u64, term_len: Option<usize>) -> DataBlock {
    let (positions, payload) = entry_positions(file, block_offset);

    let mut entries = Vec::new();
    let mut last_end = payload;

    for at in positions {
        let (term, mut next) = read_term(file, at, term_len);

        let tag = file[next];
        next += 1;

        let postings = if tag == 0 {
            let offset = be_u32(file, next);
            next += 4;
            PostingsRef::Overflow(offset)
        } else {
            let tokens = (0..tag as usize)
                .map(|idx| be_i64(file, next + idx * 8))
                .collect();
            next += tag as usize * 8;
            PostingsRef::Inline(tokens)
        };

        last_end = next;

        entries.push(DataEntry {
            term,
            postings,
            end: next,
        });
    }

    DataBlock {
        entries,
        overflow_field: be_i32(file, last_end),
        overflow_region: last_end + 4,
    }
}

/// Terms of all entries of a data block, in block order.
pub fn data_block_terms(file: &[u8], block_offset: u64, term_len: Option<usize>) -> Vec<Vec<u8>> {
    parse_data_block(file, block_offset, term_len)
        .entries
        .into_iter()
        .map(|entry| entry.term)
        .collect()
}
