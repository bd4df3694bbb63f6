//! End-to-end coverage of the filter page builder/reader against the public
//! API, simulating a table writer driving the builder across several data
//! pages.

use litelsm::config::FilterOptions;
use litelsm::filter::BloomFilterPolicy;
use litelsm::page::filter_page::{FilterPageBuilder, FilterPageReader};
use litelsm::page::PageReader;

/// Scenario 5: keys inserted into a multi-page table are found by the
/// filter built for the block they belong to, and the observed
/// false-positive rate for keys never inserted stays within the bound
/// implied by the configured `bits_per_key`.
#[test]
fn filter_page_matches_real_keys_across_many_blocks() {
    let policy = BloomFilterPolicy::default();
    let options = FilterOptions::default();
    let page_size = 4096u64;

    let mut builder = FilterPageBuilder::new(&policy, options);
    let mut inserted: Vec<(u64, Vec<u8>)> = Vec::new();

    for page_index in 0..40u64 {
        let block_offset = page_index * page_size;
        builder.start_block(block_offset);
        for k in 0..30u32 {
            let key = format!("block-{page_index}-key-{k}").into_bytes();
            builder.add_key(&key);
            inserted.push((block_offset, key));
        }
    }

    let page = builder.finish();
    assert!(PageReader::new(&page).check_crc32c());

    let reader = FilterPageReader::new(&page, &policy).unwrap();
    for (block_offset, key) in &inserted {
        assert!(
            reader.key_may_match(*block_offset, key),
            "false negative for {key:?} at block {block_offset}"
        );
    }

    let mut false_positives = 0;
    let probes = 4000;
    for i in 0..probes {
        let candidate = format!("never-inserted-{i}").into_bytes();
        if reader.key_may_match(0, &candidate) {
            false_positives += 1;
        }
    }
    let rate = false_positives as f64 / probes as f64;
    assert!(rate < 0.05, "unexpectedly high false-positive rate: {rate}");
}

/// P7: a query against a block with no keys at all returns no match, and a
/// query past the last known block conservatively returns a match rather
/// than a false negative.
#[test]
fn block_bounds_are_respected() {
    let policy = BloomFilterPolicy::default();
    let options = FilterOptions {
        bits_per_key: 10,
        base_lg: 11,
    };
    let block_size = 1u64 << options.base_lg;

    let mut builder = FilterPageBuilder::new(&policy, options);
    builder.start_block(0);
    builder.add_key(b"first-block-key");
    builder.start_block(block_size * 5);
    builder.add_key(b"sixth-block-key");
    let page = builder.finish();

    let reader = FilterPageReader::new(&page, &policy).unwrap();
    assert!(reader.key_may_match(0, b"first-block-key"));
    assert!(reader.key_may_match(block_size * 5, b"sixth-block-key"));

    // Blocks 1..5 were skipped entirely: empty filters, must reject.
    for skipped in 1..5u64 {
        assert!(!reader.key_may_match(block_size * skipped, b"anything-at-all"));
    }

    // Far beyond anything the builder ever saw: conservative "maybe".
    assert!(reader.key_may_match(block_size * 1000, b"anything-at-all"));
}
