mod common;

use common::{parse_data_block, PostingsRef};
use term_index::{
    token_of, Comparator, Decode, IndexDescriptor, Mode, OnDiskIndexBuilder, TokenTreeBuilder,
    MAX_INLINE_TOKENS,
};
use test_log::test;

#[test]
fn sparse_mode_inline_threshold() -> term_index::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("SI_sparse.db");

    let mut builder = OnDiskIndexBuilder::new(Comparator::Int64, Comparator::Bytes, Mode::Sparse);

    // Exactly at the threshold: five keys stay inline
    let inline_keys: Vec<String> = (0..MAX_INLINE_TOKENS)
        .map(|idx| format!("inline-{idx}"))
        .collect();

    for (idx, key) in inline_keys.iter().enumerate() {
        builder.add(1i64.to_be_bytes(), key.as_bytes(), (idx * 16) as u64);
    }

    // One over the threshold: six keys overflow
    let overflow_keys: Vec<String> = (0..=MAX_INLINE_TOKENS)
        .map(|idx| format!("overflow-{idx}"))
        .collect();

    for (idx, key) in overflow_keys.iter().enumerate() {
        builder.add(2i64.to_be_bytes(), key.as_bytes(), (idx * 16) as u64);
    }

    assert!(builder.finish(&path)?);

    let descriptor = IndexDescriptor::from_file(&path)?;
    assert_eq!(Mode::Sparse, descriptor.mode);

    let file = std::fs::read(&path)?;
    let block = parse_data_block(&file, descriptor.data_level.block_offsets[0], Some(8));

    assert_eq!(2, block.entries.len());

    // The five tokens are written inline, ascending
    let PostingsRef::Inline(tokens) = &block.entries[0].postings else {
        panic!("expected an inline entry");
    };

    let mut expected_tokens: Vec<i64> = inline_keys
        .iter()
        .map(|key| token_of(key.as_bytes()))
        .collect();
    expected_tokens.sort_unstable();

    assert_eq!(&expected_tokens, tokens);

    // The six-token list is referenced by offset instead
    let PostingsRef::Overflow(offset) = block.entries[1].postings else {
        panic!("expected an overflow entry");
    };
    assert_eq!(0, offset);

    let mut expected = TokenTreeBuilder::new();
    for (idx, key) in overflow_keys.iter().enumerate() {
        expected.add(token_of(key.as_bytes()), (idx * 16) as u64);
    }

    // With an inlined term present, the field holds the overflow region size
    assert_eq!(expected.serialized_size() as i32, block.overflow_field);

    let mut reader = &file[block.overflow_region + offset as usize..];
    assert_eq!(expected, TokenTreeBuilder::decode_from(&mut reader)?);

    // The combined tree trails the overflow region and covers both terms
    let mut reader = &file[block.overflow_region + expected.serialized_size()..];
    let combined = TokenTreeBuilder::decode_from(&mut reader)?;

    assert_eq!(
        MAX_INLINE_TOKENS + MAX_INLINE_TOKENS + 1,
        combined.token_count(),
    );

    // One super block tree covers the single data block
    assert_eq!(1, descriptor.super_block_offsets.len());

    Ok(())
}
