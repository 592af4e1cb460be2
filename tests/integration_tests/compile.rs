use bson::{Document, doc};
use friedlite::DbError;
use friedlite::config::QueryConfig;
use friedlite::query::{FilterNode, QueryCompiler, compile, parse_filter_json};
use friedlite::store::{MemoryStore, Store};

fn numbered() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_multiple((0..10).map(|i| doc! {"_id": format!("n{i}"), "a": i}).collect());
    store
}

fn search(store: &MemoryStore, filter: &Document) -> Vec<i32> {
    let p = compile(store, Some(filter)).unwrap();
    store.search(&p).iter().map(|d| d.get_i32("a").unwrap()).collect()
}

#[test]
fn empty_filter_matches_every_document() {
    let store = numbered();
    assert_eq!(search(&store, &doc! {}).len(), 10);
    let p = compile(&store, None).unwrap();
    assert_eq!(store.search(&p).len(), 10);
}

#[test]
fn not_inverts_each_comparison() {
    let store = numbered();
    for op in ["$gte", "$gt", "$lte", "$lt", "$ne"] {
        let plain = search(&store, &doc! {"a": {op: 5}});
        let negated = search(&store, &doc! {"a": {"$not": {op: 5}}});
        let mut union: Vec<i32> = plain.iter().chain(&negated).copied().collect();
        union.sort_unstable();
        assert_eq!(union, (0..10).collect::<Vec<_>>(), "{op}");
        assert!(plain.iter().all(|v| !negated.contains(v)), "{op}");
    }
    assert_eq!(search(&store, &doc! {"a": {"$not": 5}}).len(), 9);
}

#[test]
fn negated_range_keeps_both_bounds() {
    let store = numbered();
    // both inverted bounds are AND-ed, which no value satisfies
    assert!(search(&store, &doc! {"a": {"$not": {"$gte": 3, "$lte": 6}}}).is_empty());
}

#[test]
fn nested_fields_and_lists() {
    let store = MemoryStore::new();
    store.insert_multiple(vec![
        doc! {"_id": 1, "user": {"name": "ann", "tags": ["admin", "ops"]}, "scores": [3, 9]},
        doc! {"_id": 2, "user": {"name": "bo", "tags": ["ops"]}, "scores": [1]},
        doc! {"_id": 3, "user": {"name": "cid", "tags": []}, "scores": []},
    ]);
    let ids = |f: Document| -> Vec<i32> {
        let p = compile(&store, Some(&f)).unwrap();
        store.search(&p).iter().map(|d| d.get_i32("_id").unwrap()).collect()
    };
    assert_eq!(ids(doc! {"user.tags": "ops"}), vec![1, 2]);
    assert_eq!(ids(doc! {"user.tags": {"$all": ["admin", "ops"]}}), vec![1]);
    assert_eq!(ids(doc! {"scores": {"$in": [1, 3]}}), vec![1, 2]);
    assert_eq!(ids(doc! {"user.name": {"$in": ["bo", {"$regex": "c"}]}}), vec![2, 3]);
    assert_eq!(ids(doc! {"user": {"name": "bo", "tags": ["ops"]}}), vec![2]);
    assert_eq!(ids(doc! {"$or": [{"user.name": "ann"}, {"scores": []}]}), vec![1, 3]);
    assert_eq!(ids(doc! {"$and": [{"scores": 9}, {"user.name": {"$regex": "a"}}]}), vec![1]);
}

#[test]
fn regex_escapes_follow_stored_convention() {
    let store = MemoryStore::new();
    store.insert_multiple(vec![
        doc! {"_id": 1, "path": "C:\\tmp"},
        doc! {"_id": 2, "path": "a.b"},
        doc! {"_id": 3, "path": "axb"},
    ]);
    let ids = |pattern: &str| -> Vec<i32> {
        let p = compile(&store, Some(&doc! {"path": {"$regex": pattern}})).unwrap();
        store.search(&p).iter().map(|d| d.get_i32("_id").unwrap()).collect()
    };
    // doubled backslash keeps a literal escape
    assert_eq!(ids("a\\\\.b"), vec![2]);
    // single backslashes are dropped, so the dot is a wildcard again
    assert_eq!(ids("a\\.b"), vec![2, 3]);
    assert_eq!(ids(r"C:\\\\\\tmp"), vec![1]);
}

#[test]
fn compile_errors() {
    let store = numbered();
    assert!(matches!(compile(&store, Some(&doc! {"$and": []})), Err(DbError::EmptyFilter)));
    assert!(matches!(
        compile(&store, Some(&doc! {"a": {"$regex": "[z-a]"}})),
        Err(DbError::Regex(_))
    ));
    assert!(matches!(
        compile(&store, Some(&doc! {"a": {"$not": {"$regex": "x"}}})),
        Err(DbError::QueryError(_))
    ));
}

#[test]
fn custom_sentinel_and_id_field() {
    let store = MemoryStore::new();
    store.insert_multiple(vec![doc! {"key": "k1"}, doc! {"key": "none"}]);
    let cfg = QueryConfig {
        id_field: "key".into(),
        match_all_sentinel: "none".into(),
        ..QueryConfig::default()
    };
    let p = QueryCompiler::new(&store).with_config(cfg).compile(None).unwrap();
    // a document carrying the sentinel is not matched by the match-all predicate
    assert_eq!(store.search(&p).len(), 1);
}

#[test]
fn json_filters_parse_into_trees() {
    let node = parse_filter_json(r#"{"a": "x", "b": {"$lt": "y"}}"#).unwrap();
    assert_eq!(node.to_string(), r#"AND(a = "x", b < "y")"#);
    assert_eq!(parse_filter_json("{}").unwrap(), FilterNode::MatchAll);
}

#[test]
fn operators_after_a_field_apply_to_that_field() {
    let store = MemoryStore::new();
    store.insert_multiple(vec![
        doc! {"_id": 1, "a": 1, "name": "xa"},
        doc! {"_id": 2, "a": 2, "name": "xb", "tags": [1]},
    ]);
    let ids = |f: Document| -> Vec<i32> {
        let p = compile(&store, Some(&f)).unwrap();
        store.search(&p).iter().map(|d| d.get_i32("_id").unwrap()).collect()
    };
    assert_eq!(ids(doc! {"a": 1, "$gt": 0}), vec![1]);
    assert_eq!(ids(doc! {"a": 2, "$gt": 5}), Vec::<i32>::new());
    assert_eq!(ids(doc! {"name": "xb", "$regex": "x"}), vec![2]);
    assert_eq!(ids(doc! {"a": 2, "$in": [2, 3]}), vec![2]);
}

#[test]
fn embedded_values_match_themselves() {
    let store = MemoryStore::new();
    store.insert_multiple(vec![
        doc! {"_id": 1, "tags": ["z"], "addr": {"city": "oslo"}},
        doc! {"_id": 2, "tags": [["z"]], "city": "oslo"},
    ]);
    let ids = |f: Document| -> Vec<i32> {
        let p = compile(&store, Some(&f)).unwrap();
        store.search(&p).iter().map(|d| d.get_i32("_id").unwrap()).collect()
    };
    // a list value matches an equal list as well as a list containing it
    assert_eq!(ids(doc! {"tags": ["z"]}), vec![1, 2]);
    // a plain sub-document matches the embedded document, not same-named top-level keys
    assert_eq!(ids(doc! {"addr": {"city": "oslo"}}), vec![1]);
}
