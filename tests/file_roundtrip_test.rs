//! Scenario 4: a finalized page byte string persisted through
//! `file::PosixFile` and read back is byte-identical and still
//! interpretable by a fresh cursor.

use litelsm::comparator::{BytewiseComparator, Comparator};
use litelsm::config::PageOptions;
use litelsm::file::{PosixFile, RandomAccessFile};
use litelsm::page::data::{DataPageBuilder, DataPageCursor};
use litelsm::page::PageReader;
use tempfile::NamedTempFile;

#[test]
fn a_data_page_survives_a_round_trip_through_a_real_file() {
    let mut builder = DataPageBuilder::new(PageOptions::default());
    let entries: Vec<(Vec<u8>, Vec<u8>)> = (0..200u32)
        .map(|i| (i.to_be_bytes().to_vec(), format!("value-{i}").into_bytes()))
        .collect();
    for (key, value) in &entries {
        builder.add(key, value);
    }
    let page = builder.finish();

    let tmp = NamedTempFile::new().unwrap();
    let mut file = PosixFile::create(tmp.path()).unwrap();
    file.append(&page).unwrap();
    file.sync().unwrap();

    let reopened = PosixFile::open(tmp.path()).unwrap();
    let read_back = reopened.read_at(0, page.len()).unwrap();
    assert_eq!(read_back, page);
    assert!(PageReader::new(&read_back).check_crc32c());

    let comparator = BytewiseComparator;
    let mut cursor = DataPageCursor::new(&read_back, &comparator).unwrap();
    cursor.seek_to_first();
    for (key, value) in &entries {
        assert!(cursor.valid());
        assert_eq!(cursor.key(), key.as_slice());
        assert_eq!(cursor.value(), value.as_slice());
        cursor.next();
    }
}

#[test]
fn multiple_pages_appended_in_sequence_are_individually_addressable() {
    let mut offsets_and_sizes = Vec::new();
    let tmp = NamedTempFile::new().unwrap();
    let mut file = PosixFile::create(tmp.path()).unwrap();
    let mut offset = 0u64;

    for page_index in 0..5u32 {
        let mut builder = DataPageBuilder::new(PageOptions::default());
        builder.add(
            format!("page-{page_index}-key").as_bytes(),
            format!("page-{page_index}-value").as_bytes(),
        );
        let page = builder.finish();
        offsets_and_sizes.push((offset, page.len()));
        file.append(&page).unwrap();
        offset += page.len() as u64;
    }
    file.sync().unwrap();

    let reopened = PosixFile::open(tmp.path()).unwrap();
    let comparator = BytewiseComparator;
    for (page_index, (offset, size)) in offsets_and_sizes.iter().enumerate() {
        let bytes = reopened.read_at(*offset, *size).unwrap();
        assert!(PageReader::new(&bytes).check_crc32c());
        let mut cursor = DataPageCursor::new(&bytes, &comparator).unwrap();
        cursor.seek_to_first();
        assert_eq!(
            cursor.key(),
            format!("page-{page_index}-key").as_bytes()
        );
        assert_eq!(
            comparator.compare(cursor.key(), format!("page-{page_index}-key").as_bytes()),
            std::cmp::Ordering::Equal
        );
    }
}
