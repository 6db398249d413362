#![no_main]

use libfuzzer_sys::fuzz_target;
use sx_runtime::{decode_records, encode_record};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(records) = decode_records(text) else {
        return;
    };
    let encoded = records.iter().map(encode_record).collect::<String>();
    assert_eq!(decode_records(&encoded).as_ref(), Ok(&records));
});
