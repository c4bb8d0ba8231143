use longpage_core::error::LongPageError;
use longpage_core::prelude::*;
use rand::Rng;

fn cfg() -> BuildConfig {
    BuildConfig::builder()
        .spacing(180, 250, 300)
        .max_per_group(10)
        .max_groups(2)
        .build()
}

#[test]
fn at_or_under_capacity_is_one_partition() {
    for n in 1..=10 {
        let heights = vec![100; n];
        let parts = partition(&heights, &cfg()).expect("partition");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].number, 1);
        assert_eq!(parts[0].range, 0..n);
        assert_eq!(
            parts[0].plan,
            plan_layout(900, &heights, cfg().spacing).expect("plan")
        );
    }
}

#[test]
fn over_capacity_splits_in_two_preserving_order() {
    for n in 11..=20 {
        let ranges = split_ranges(n, 10, 2).expect("split");
        assert_eq!(ranges, vec![0..10, 10..n]);
        let flat: Vec<usize> = ranges.into_iter().flatten().collect();
        assert_eq!(flat, (0..n).collect::<Vec<_>>());
    }
}

#[test]
fn twelve_images_restart_offsets_per_partition() {
    let heights: Vec<u32> = (1..=12).map(|i| 100 + i * 10).collect();
    let parts = partition(&heights, &cfg()).expect("partition");
    assert_eq!(parts.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![10, 2]);
    assert_eq!(parts[0].plan.placements[0].y, 180);
    assert_eq!(parts[1].plan.placements[0].y, 180);
    // second partition: heights 210 and 220
    assert_eq!(parts[1].plan.offsets(), vec![180, 180 + 210 + 300]);
    assert_eq!(parts[1].plan.total_height, 180 + 250 + 210 + 220 + 300);
    assert_eq!(parts[1].number, 2);
}

#[test]
fn more_groups_than_allowed_is_an_error() {
    match split_ranges(21, 10, 2) {
        Err(LongPageError::GroupLimitExceeded {
            count,
            max_per_group,
            max_groups,
        }) => {
            assert_eq!(count, 21);
            assert_eq!(max_per_group, 10);
            assert_eq!(max_groups, 2);
        }
        other => panic!("expected GroupLimitExceeded, got {:?}", other),
    }
}

#[test]
fn raising_max_groups_allows_general_chunking() {
    let ranges = split_ranges(25, 10, 3).expect("split");
    assert_eq!(ranges, vec![0..10, 10..20, 20..25]);
}

#[test]
fn empty_sequence_cannot_be_partitioned() {
    assert!(matches!(split_ranges(0, 10, 2), Err(LongPageError::Empty)));
    assert!(matches!(partition(&[], &cfg()), Err(LongPageError::Empty)));
}

#[test]
fn random_splits_concatenate_to_the_original() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let m = rng.gen_range(1..=12);
        let groups = rng.gen_range(1..=4);
        let n = rng.gen_range(1..=m * groups);
        let ranges = split_ranges(n, m, groups).expect("split");
        assert_eq!(ranges.len(), n.div_ceil(m));
        assert!(ranges.iter().all(|r| !r.is_empty() && r.len() <= m));
        let flat: Vec<usize> = ranges.into_iter().flatten().collect();
        assert_eq!(flat, (0..n).collect::<Vec<_>>());
    }
}
