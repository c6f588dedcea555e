mod common;

use common::{be_i64, parse_data_block, PostingsRef};
use term_index::{
    token_of, Comparator, Decode, IndexDescriptor, Mode, OnDiskIndexBuilder, TermSize,
    TokenTreeBuilder,
};
use test_log::test;

#[test]
fn original_mode_long_terms() -> term_index::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("SI_numbers.db");

    let mut builder =
        OnDiskIndexBuilder::new(Comparator::Int64, Comparator::Bytes, Mode::Original);

    builder.add(1i64.to_be_bytes(), b"k1", 0);
    builder.add(2i64.to_be_bytes(), b"k2", 16);
    builder.add(1i64.to_be_bytes(), b"k3", 32);

    assert!(builder.finish(&path)?);

    let descriptor = IndexDescriptor::from_file(&path)?;

    assert_eq!(TermSize::Long, descriptor.term_size);
    assert_eq!(Mode::Original, descriptor.mode);
    assert_eq!(1i64.to_be_bytes().as_slice(), &*descriptor.min_term);
    assert_eq!(2i64.to_be_bytes().as_slice(), &*descriptor.max_term);

    // Three triples over two distinct terms fit into a single data block,
    // so no pointer level is grown
    assert_eq!(1, descriptor.data_level.block_offsets.len());
    assert!(descriptor.levels.is_empty());

    let file = std::fs::read(&path)?;
    let block = parse_data_block(&file, descriptor.data_level.block_offsets[0], Some(8));

    assert_eq!(2, block.entries.len());
    assert_eq!(1, be_i64(&block.entries[0].term, 0));
    assert_eq!(2, be_i64(&block.entries[1].term, 0));

    // Outside sparse mode every posting list overflows, and the sparse
    // overflow field stays at its sentinel
    assert_eq!(-1, block.overflow_field);

    let PostingsRef::Overflow(first) = block.entries[0].postings else {
        panic!("expected an overflow entry");
    };
    let PostingsRef::Overflow(second) = block.entries[1].postings else {
        panic!("expected an overflow entry");
    };

    assert_eq!(0, first);

    let mut reader = &file[block.overflow_region + first as usize..];
    let postings = TokenTreeBuilder::decode_from(&mut reader)?;

    let mut expected = TokenTreeBuilder::new();
    expected.add(token_of(b"k1"), 0);
    expected.add(token_of(b"k3"), 32);
    assert_eq!(expected, postings);

    assert_eq!(expected.serialized_size() as u32, second);

    let mut reader = &file[block.overflow_region + second as usize..];
    let postings = TokenTreeBuilder::decode_from(&mut reader)?;

    let mut expected = TokenTreeBuilder::new();
    expected.add(token_of(b"k2"), 16);
    assert_eq!(expected, postings);

    Ok(())
}
