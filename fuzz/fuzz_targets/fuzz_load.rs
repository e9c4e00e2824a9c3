#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes through the load gate must never panic, and any
    // reader that survives validation must answer queries without panicking.
    if let Ok(reader) = apidex::index::IndexReader::from_bytes(data.to_vec()) {
        let _ = reader.lookup("list");
        let _ = reader.lookup(".");
        let _ = reader.stats();
    }
});
