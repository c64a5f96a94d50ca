#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // Canonicalization of already-canonical output must be a fixpoint.
        if let Ok(once) = nfse::signature::c14n::canonicalize(text) {
            if let Ok(twice) = nfse::signature::c14n::canonicalize(&once) {
                assert_eq!(once, twice);
            }
        }
    }
});
