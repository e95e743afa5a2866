#![no_main]

use libfuzzer_sys::fuzz_target;
use campaign_analyst::parser::{card_blocks, parse_analysis};

fuzz_target!(|data: &[u8]| {
    // Model output is arbitrary text; parsing must never panic
    let text = String::from_utf8_lossy(data);
    for card in parse_analysis(&text) {
        let _ = card_blocks(&card);
    }
});
