#![no_main]

use libfuzzer_sys::fuzz_target;
use vdb_runtime::annotation;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(bindings) = annotation::parse(Some(text)) else {
        return;
    };
    // Whatever parses must survive a format round trip unchanged.
    let formatted = annotation::format(&bindings);
    assert_eq!(annotation::parse(Some(&formatted)), Ok(bindings));
});
