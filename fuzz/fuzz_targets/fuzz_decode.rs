#![no_main]

use hsq::{decode, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must be rejected with an error, never a panic
    let _ = decode(data);
    let _ = tokenize(data);
});
