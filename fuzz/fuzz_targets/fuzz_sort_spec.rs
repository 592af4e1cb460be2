#![no_main]
use friedlite::query::{Cursor, SortSpecifier};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 { return; }
    let Ok(s) = std::str::from_utf8(data) else { return };
    if let Ok(spec) = SortSpecifier::parse_arg(s) {
        let mut c = Cursor::new(vec![
            bson::doc! {"a": 1, "b": [3, "x"], "n": {"m": true}},
            bson::doc! {"a": "s", "b": [], "n": [{"m": 0}]},
            bson::doc! {"b": {"k": null}},
        ]);
        c.sort_by(spec);
        let _ = c.count();
    }
});
