use cooled_kll::hotfilter::HotFilter;

#[test]
fn test_new_rejects_invalid_parameters() {
    assert!(HotFilter::new(0, 2, 4).is_err());
    assert!(HotFilter::new(4, 0, 4).is_err());
    assert!(HotFilter::new(4, 2, 0).is_err());
}

#[test]
fn test_hash_determinism_gives_identical_filters_for_identical_input() {
    // two independently constructed filters fed the same sequence must
    // bucket every value identically, since splitmix64(v) % NB is fixed.
    let mut a = HotFilter::new(16, 4, 8).unwrap();
    let mut b = HotFilter::new(16, 4, 8).unwrap();
    for v in [1u64, 2, 3, 1000, 999_999, 42] {
        a.insert(v, 1);
        b.insert(v, 1);
    }
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn test_duplicate_insert_accumulates_count_without_growing_bucket() {
    let mut filter = HotFilter::new(8, 4, 8).unwrap();
    assert!(filter.insert(55, 3).is_none());
    assert!(filter.insert(55, 4).is_none());
    assert_eq!(filter.rank(55), 7);
    assert_eq!(filter.snapshot().len(), 1);
}

#[test]
fn test_snapshot_is_sorted_by_value() {
    let mut filter = HotFilter::new(4, 8, 16).unwrap();
    for v in [50u64, 10, 30, 20, 40] {
        filter.insert(v, 1);
    }
    let snap = filter.snapshot();
    let values: Vec<u64> = snap.iter().map(|&(v, _)| v).collect();
    assert_eq!(values, vec![10, 20, 30, 40, 50]);
}

#[test]
fn test_full_bucket_eviction_routes_min_count_entry() {
    let mut filter = HotFilter::new(1, 2, 1).unwrap();
    assert!(filter.insert(1, 5).is_none());
    assert!(filter.insert(2, 1).is_none());
    // bucket now full with (1,5) and (2,1); a third distinct value forces
    // a decision. vote=1, min_count=1 (entry 2), round(1/1)=1 >= E=1: evict.
    let displaced = filter.insert(3, 1).expect("bucket full, must displace");
    assert_eq!(displaced.value, 2);
    assert_eq!(displaced.frequency, 1);
    assert_eq!(filter.rank(1), 5);
    assert_eq!(filter.rank(3), 6);
}

#[test]
fn test_rank_sums_only_entries_less_equal_value() {
    let mut filter = HotFilter::new(4, 8, 16).unwrap();
    for v in [10u64, 20, 30] {
        filter.insert(v, 1);
    }
    assert_eq!(filter.rank(5), 0);
    assert_eq!(filter.rank(20), 2);
    assert_eq!(filter.rank(100), 3);
}

#[test]
fn test_memory_accounts_for_bucket_contents() {
    let mut filter = HotFilter::new(4, 8, 16).unwrap();
    let baseline = filter.memory();
    for v in 0..20u64 {
        filter.insert(v, 1);
    }
    assert!(filter.memory() >= baseline);
}
