#![no_main]

use hsq::{decode, encode, Error};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Anything bigger cannot fit the 16-bit compressed size anyway
    if data.len() > 200_000 {
        return;
    }

    match encode(data) {
        Ok(compressed) => {
            let decompressed = decode(&compressed).expect("decode of encoder output failed");
            assert_eq!(data, &decompressed[..], "roundtrip failed");
        }
        Err(Error::InputTooLarge) => {}
        Err(e) => panic!("unexpected encode error: {}", e),
    }
});
