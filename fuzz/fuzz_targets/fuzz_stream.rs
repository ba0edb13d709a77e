#![no_main]

use hsq::{encode, Reader, Writer};
use libfuzzer_sys::fuzz_target;
use std::io::{Read, Write};

fuzz_target!(|data: &[u8]| {
    if data.len() > 200_000 {
        return;
    }

    // Writer output must match the one-shot encoder
    let mut compressed = Vec::new();
    let finished = {
        let mut writer = Writer::new(&mut compressed);
        let split = data.len() / 3;
        writer.write_all(&data[..split]).is_ok()
            && writer.write_all(&data[split..]).is_ok()
            && writer.finish().is_ok()
    };

    if finished {
        assert_eq!(Ok(&compressed), encode(data).as_ref());

        let mut reader = Reader::new(&compressed[..]);
        let mut decompressed = Vec::new();
        reader
            .read_to_end(&mut decompressed)
            .expect("reader failed on writer output");
        assert_eq!(data, &decompressed[..]);
    }

    // Arbitrary stream data must not panic
    let mut reader = Reader::new(data);
    let _ = reader.read_to_end(&mut Vec::new());
});
