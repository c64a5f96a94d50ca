#![no_main]

use libfuzzer_sys::fuzz_target;

// The interpreter must classify or reject arbitrary bytes without panicking.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = nfse::soap::interpret(text);
    }
});
