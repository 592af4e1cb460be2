use bson::{Bson, doc};
use friedlite::query::{FindOptions, SortSpecifier};
use friedlite::{Database, DbError, InsertOptions};

fn seeded_db() -> Database {
    let db = Database::new("shop").unwrap();
    let items = db.collection("items").unwrap();
    items
        .insert_many(vec![
            doc! {
                "_id": "p1", "name": "pen", "price": 2.5, "tags": ["office"], "stock": {"qty": 100}
            },
            doc! {
                "_id": "p2", "name": "paper", "price": 7, "tags": ["office", "bulk"],
                "stock": {"qty": 0}
            },
            doc! {
                "_id": "p3", "name": "mug", "price": 12, "tags": ["kitchen"], "stock": {"qty": 8}
            },
            doc! {"_id": "p4", "name": "kettle", "price": 40, "tags": [], "stock": {"qty": 8}},
        ])
        .unwrap();
    db
}

#[test]
fn find_with_filter_sort_and_page() {
    let db = seeded_db();
    let items = db.get_collection("items").unwrap();
    let spec = SortSpecifier::parse(&bson::bson!([["stock.qty", -1], ["price", 1]]), None);
    let opts = FindOptions {
        sort: Some(spec.unwrap()),
        skip: None,
        limit: Some(3),
    };
    let names: Vec<String> = items
        .find(Some(&doc! {"price": {"$gt": 2}}), &opts)
        .unwrap()
        .map(|d| d.get_str("name").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["pen", "mug", "kettle"]);
}

#[test]
fn find_one_count_and_membership() {
    let db = seeded_db();
    let items = db.collection("items").unwrap();
    assert_eq!(items.count(None).unwrap(), 4);
    assert_eq!(items.count(Some(&doc! {"tags": "office"})).unwrap(), 2);
    assert_eq!(items.count(Some(&doc! {"tags": {"$in": ["kitchen", "bulk"]}})).unwrap(), 2);
    assert_eq!(items.count(Some(&doc! {"stock.qty": {"$not": {"$gt": 0}}})).unwrap(), 1);
    let mug = items.find_one(Some(&doc! {"name": {"$regex": "mu"}})).unwrap().unwrap();
    assert_eq!(mug.get_str("_id").unwrap(), "p3");
}

#[test]
fn stored_documents_match_themselves() {
    let db = seeded_db();
    let items = db.collection("items").unwrap();
    for doc in items.find(None, &FindOptions::default()).unwrap() {
        let found = items.find(Some(&doc), &FindOptions::default()).unwrap().to_vec();
        assert_eq!(found, vec![doc]);
    }
}

#[test]
fn duplicate_ids_are_rejected() {
    let db = seeded_db();
    let items = db.collection("items").unwrap();
    let err = items.insert_one(doc! {"_id": "p1"}).unwrap_err();
    assert_eq!(err.to_string(), "_id:p1 already exists in collection:items");
    let err = items.insert_many(vec![doc! {"_id": "n1"}, doc! {"_id": "p4"}]).unwrap_err();
    assert!(matches!(err, DbError::DuplicateKey { .. }));
    assert_eq!(items.len(), 4);
    let bypass = InsertOptions { bypass_document_validation: true };
    items.insert_many_with_options(vec![doc! {"_id": "p4"}], bypass).unwrap();
    assert_eq!(items.count(Some(&doc! {"_id": "p4"})).unwrap(), 2);
}

#[test]
fn generated_ids_are_returned() {
    let db = Database::new("gen").unwrap();
    let col = db.collection("c").unwrap();
    let res = col.insert_many(vec![doc! {"v": 1}, doc! {"_id": Bson::Null, "v": 2}]).unwrap();
    assert_eq!(res.inserted_ids.len(), 2);
    for id in &res.inserted_ids {
        assert_eq!(col.count(Some(&doc! {"_id": id.clone()})).unwrap(), 1);
    }
}

#[test]
fn update_and_delete_flow() {
    let db = seeded_db();
    let items = db.collection("items").unwrap();
    let res = items.update_one(&doc! {"stock.qty": 8}, &doc! {"$set": {"sale": true}}).unwrap();
    assert_eq!(res.matched_count(), 2);
    assert_eq!(items.count(Some(&doc! {"sale": true})).unwrap(), 2);

    assert_eq!(items.delete_one(&doc! {"sale": true}).unwrap().deleted_count(), 1);
    assert_eq!(items.remove(&doc! {"tags": "office"}, true).unwrap().deleted_count(), 2);
    assert_eq!(items.len(), 1);
    items.delete_many(&doc! {}).unwrap();
    assert!(items.is_empty());
}

#[test]
fn database_lists_and_drops_collections() {
    let db = seeded_db();
    db.collection("orders").unwrap();
    assert_eq!(db.collection_names(), vec!["items", "orders"]);
    assert!(db.drop_collection("items"));
    assert_eq!(db.collection_names(), vec!["orders"]);
    assert!(matches!(Database::new("bad name"), Err(DbError::InvalidName(_))));
}
