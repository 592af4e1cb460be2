#![no_main]
use friedlite::query::compile;
use friedlite::store::{MemoryStore, Store};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(filter) = friedlite::utils::json::parse_json_to_bson_document(s)
    {
        let store = MemoryStore::new();
        store.insert(bson::doc! {"_id": "1", "a": 1, "b": ["x", "y"], "c": {"d": "e"}});
        if let Ok(p) = compile(&store, Some(&filter)) {
            let _ = store.search(&p);
        }
    }
});
