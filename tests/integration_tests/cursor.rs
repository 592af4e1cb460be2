use bson::{Bson, bson, doc};
use friedlite::DbError;
use friedlite::query::{Cursor, FindOptions, Order, SortSpecifier};

fn sixty_two() -> Vec<bson::Document> {
    (0..62).map(|i| doc! {"_id": i, "n": i}).collect()
}

fn page(skip: usize) -> Vec<i32> {
    let opts = FindOptions { sort: None, skip: Some(skip), limit: Some(20) };
    Cursor::with_options(sixty_two(), &opts).map(|d| d.get_i32("n").unwrap()).collect()
}

#[test]
fn pagination_over_sixty_two_documents() {
    assert_eq!(page(0), (0..20).collect::<Vec<_>>());
    assert_eq!(page(20), (20..40).collect::<Vec<_>>());
    assert_eq!(page(40), (40..60).collect::<Vec<_>>());
    // a skip that is not a page start runs to the end
    assert_eq!(page(5), (5..62).collect::<Vec<_>>());
    assert_eq!(page(60), vec![60, 61]);
}

#[test]
fn limit_covering_everything_ignores_skip() {
    let opts = FindOptions { sort: None, skip: Some(10), limit: Some(62) };
    assert_eq!(Cursor::with_options(sixty_two(), &opts).count(), 62);
}

#[test]
fn mixed_type_ordering() {
    // the array class only shows up nested: a top-level [1, 2] sorts by its extreme
    // member, so `[[1, 2]]` stands in for an array value here
    let mut c = Cursor::new(vec![
        doc! {"v": true},
        doc! {"v": [[1, 2]]},
        doc! {"v": {"k": 1}},
        doc! {"v": "x"},
        doc! {"v": 5},
        doc! {"v": Bson::Null},
    ]);
    c.sort(&bson!("v"), None).unwrap();
    let values: Vec<Bson> = c.to_vec().into_iter().map(|d| d.get("v").cloned().unwrap()).collect();
    assert_eq!(
        values,
        vec![Bson::Null, bson!(5), bson!("x"), bson!({"k": 1}), bson!([[1, 2]]), bson!(true)]
    );
}

#[test]
fn top_level_array_sorts_as_a_number() {
    let docs = vec![doc! {"v": "x"}, doc! {"v": 1.5}, doc! {"v": [1, 2]}, doc! {"v": 0}];
    let mut c = Cursor::new(docs);
    c.sort(&bson!("v"), None).unwrap();
    let values: Vec<Bson> = c.to_vec().into_iter().map(|d| d.get("v").cloned().unwrap()).collect();
    // [1, 2] sorts as 1 ascending, between 0 and 1.5, not after the string
    assert_eq!(values, vec![bson!(0), bson!([1, 2]), bson!(1.5), bson!("x")]);
}

#[test]
fn descending_reverses_type_order() {
    let mut c = Cursor::new(vec![doc! {"v": 1}, doc! {"v": "a"}, doc! {"v": false}, doc! {}]);
    c.sort(&bson!("v"), Some(&bson!(-1))).unwrap();
    let kinds: Vec<Option<&Bson>> = (0..Cursor::count(&c)).map(|i| c[i].get("v")).collect();
    assert_eq!(kinds, vec![Some(&bson!(false)), Some(&bson!("a")), Some(&bson!(1)), None]);
}

#[test]
fn arrays_compare_by_extreme_member() {
    let docs = vec![
        doc! {"_id": "a", "t": [5, 1]},
        doc! {"_id": "b", "t": [3]},
        doc! {"_id": "c", "t": [2, 9]},
    ];
    let ids = |order: Order| -> Vec<String> {
        let opts =
            FindOptions { sort: Some(SortSpecifier::single("t", order)), ..FindOptions::default() };
        Cursor::with_options(docs.clone(), &opts)
            .map(|d| d.get_str("_id").unwrap().to_string())
            .collect()
    };
    // ascending uses minima 1, 3, 2
    assert_eq!(ids(Order::Asc), vec!["a", "c", "b"]);
    // descending uses maxima 5, 3, 9
    assert_eq!(ids(Order::Desc), vec!["c", "a", "b"]);
}

#[test]
fn nested_sort_paths() {
    let mut c = Cursor::new(vec![
        doc! {"_id": 1, "p": {"age": 40}},
        doc! {"_id": 2, "p": [{"age": 10}]},
        doc! {"_id": 3, "p": {"age": 25}},
        doc! {"_id": 4, "p": [{"x": 1}, {"age": 99}]},
    ]);
    c.sort(&bson!("p.age"), None).unwrap();
    let ids: Vec<i32> = (0..Cursor::count(&c)).map(|i| c[i].get_i32("_id").unwrap()).collect();
    // the two-element list does not resolve when ascending
    assert_eq!(ids, vec![4, 2, 3, 1]);
    c.sort(&bson!("p.age"), Some(&bson!(-1))).unwrap();
    let ids: Vec<i32> = (0..Cursor::count(&c)).map(|i| c[i].get_i32("_id").unwrap()).collect();
    assert_eq!(ids, vec![4, 1, 3, 2]);
}

#[test]
fn multi_key_sort() {
    let mut c =
        Cursor::new(vec![doc! {"a": 1, "b": 1}, doc! {"a": 0, "b": 9}, doc! {"a": 1, "b": 2}]);
    c.sort(&bson!([["a", 1], ["b", -1]]), None).unwrap();
    assert_eq!(
        c.to_vec(),
        vec![doc! {"a": 0, "b": 9}, doc! {"a": 1, "b": 2}, doc! {"a": 1, "b": 1}]
    );
}

#[test]
fn invalid_specs_are_rejected_before_sorting() {
    let docs = vec![doc! {"a": 2}, doc! {"a": 1}];
    let mut c = Cursor::new(docs.clone());
    assert!(matches!(c.sort(&bson!([["a", 1]]), Some(&bson!(1))), Err(DbError::InvalidSort(_))));
    assert!(matches!(c.sort(&bson!({"a": 1}), None), Err(DbError::InvalidSort(_))));
    assert_eq!(c.to_vec(), docs);
}
