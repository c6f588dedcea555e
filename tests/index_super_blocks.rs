use term_index::{
    Comparator, Decode, IndexDescriptor, Mode, OnDiskIndexBuilder, TokenTreeBuilder, BLOCK_SIZE,
    SUPER_BLOCK_SIZE,
};
use test_log::test;

// An 8-byte term with one inlined posting spans 17 bytes, so 215 entries
// fill one data block
const TERMS_PER_BLOCK: usize = 215;

#[test]
fn sparse_mode_cuts_super_blocks() -> term_index::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("SI_super.db");

    let mut builder = OnDiskIndexBuilder::new(Comparator::Int64, Comparator::Bytes, Mode::Sparse);

    // One term more than SUPER_BLOCK_SIZE full data blocks
    let total = SUPER_BLOCK_SIZE * TERMS_PER_BLOCK + 1;

    for idx in 0..total {
        let key = format!("key-{idx}");
        builder.add((idx as i64).to_be_bytes(), key.as_bytes(), (idx * 16) as u64);
    }

    assert!(builder.finish(&path)?);

    let descriptor = IndexDescriptor::from_file(&path)?;

    assert_eq!(
        SUPER_BLOCK_SIZE + 1,
        descriptor.data_level.block_offsets.len(),
    );

    // One tree after the 64th block, one forced at the end
    assert_eq!(2, descriptor.super_block_offsets.len());

    for offset in &descriptor.super_block_offsets {
        assert_eq!(0, offset % BLOCK_SIZE as u64);
    }

    let file = std::fs::read(&path)?;

    // The first tree aggregates the tokens of the first 64 data blocks,
    // the forced one covers the trailing partial block
    let mut reader = &file[descriptor.super_block_offsets[0] as usize..];
    let first = TokenTreeBuilder::decode_from(&mut reader)?;
    assert_eq!(SUPER_BLOCK_SIZE * TERMS_PER_BLOCK, first.token_count());

    let mut reader = &file[descriptor.super_block_offsets[1] as usize..];
    let second = TokenTreeBuilder::decode_from(&mut reader)?;
    assert_eq!(1, second.token_count());

    Ok(())
}
