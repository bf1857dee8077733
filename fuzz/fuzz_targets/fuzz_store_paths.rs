#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::json;
use vdb_runtime::store;

#[derive(Debug, Arbitrary)]
enum Op {
    Read(Vec<String>),
    Write(Vec<String>, i64),
}

fuzz_target!(|ops: Vec<Op>| {
    let mut data = json!({ "products": [{ "name": "Apples" }], "name": "Shop" });
    for op in ops {
        match op {
            Op::Read(segments) => {
                let _ = store::lookup(&data, &segments.join("/"));
            }
            Op::Write(segments, n) => {
                let path = segments.join("/");
                let before = data.clone();
                match store::assign(&mut data, &path, json!(n)) {
                    Ok(()) => assert_eq!(store::lookup(&data, &path), Some(&json!(n))),
                    Err(_) => assert_eq!(data, before),
                }
            }
        }
    }
});
