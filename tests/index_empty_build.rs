use term_index::{Comparator, Mode, OnDiskIndexBuilder};
use test_log::test;

#[test]
fn empty_build_creates_no_file() -> term_index::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("SI_nothing.db");

    let builder = OnDiskIndexBuilder::new(Comparator::Utf8, Comparator::Bytes, Mode::Original);

    assert!(builder.is_empty());
    assert!(!builder.finish(&path)?);
    assert!(!path.exists());

    Ok(())
}
