#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Offset arithmetic in the builder depends on tokens concatenating back
    // to the input exactly.
    let tokens = apidex::utils::tokenize(data);
    assert_eq!(tokens.concat(), data);
});
