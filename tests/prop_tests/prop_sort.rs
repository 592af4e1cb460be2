use bson::doc;
use friedlite::query::{Cursor, FindOptions, Order, SortSpec, SortSpecifier, page_window};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config {
        cases: 64,
        .. proptest::test_runner::Config::default()
    })]

    #[test]
    fn prop_multi_key_sort_non_decreasing(
        v in proptest::collection::vec(
            (-1_000_000i64..1_000_000, -1_000_000i64..1_000_000),
            0..50,
        )
    ) {
        let docs = v.iter().map(|(a, b)| doc! {"a": *a, "b": *b}).collect();
        let spec = SortSpecifier::new(vec![
            SortSpec::new("a", Order::Asc),
            SortSpec::new("b", Order::Desc),
        ]);
        let mut c = Cursor::new(docs);
        c.sort_by(spec);
        let out = c.to_vec();
        prop_assert_eq!(out.len(), v.len());
        for w in out.windows(2) {
            let (a0, b0) = (w[0].get_i64("a").unwrap(), w[0].get_i64("b").unwrap());
            let (a1, b1) = (w[1].get_i64("a").unwrap(), w[1].get_i64("b").unwrap());
            prop_assert!(a0 < a1 || (a0 == a1 && b0 >= b1));
        }
    }

    #[test]
    fn prop_sort_is_stable(keys in proptest::collection::vec(0i32..4, 0..40)) {
        let docs = keys.iter().enumerate().map(|(i, k)| doc! {"k": *k, "i": i as i64}).collect();
        let mut c = Cursor::new(docs);
        c.sort_by(SortSpecifier::single("k", Order::Desc));
        let out = c.to_vec();
        for w in out.windows(2) {
            let (k0, k1) = (w[0].get_i32("k").unwrap(), w[1].get_i32("k").unwrap());
            prop_assert!(k0 >= k1);
            if k0 == k1 {
                prop_assert!(w[0].get_i64("i").unwrap() < w[1].get_i64("i").unwrap());
            }
        }
    }

    #[test]
    fn prop_page_window_stays_in_bounds(
        count in 0usize..200,
        skip in 0usize..250,
        limit in 0usize..60
    ) {
        if let Some(w) = page_window(count, Some(skip), Some(limit)) {
            prop_assert!(w.start <= w.end);
            prop_assert!(w.end <= count);
            prop_assert!(limit > 0 && limit < count);
            if skip % limit == 0 && skip + limit <= count {
                prop_assert_eq!(w.len(), limit);
            }
        }
        let docs = (0..count).map(|i| doc! {"i": i as i64}).collect();
        let opts = FindOptions { sort: None, skip: Some(skip), limit: Some(limit) };
        prop_assert!(Cursor::with_options(docs, &opts).count() <= count);
    }
}
