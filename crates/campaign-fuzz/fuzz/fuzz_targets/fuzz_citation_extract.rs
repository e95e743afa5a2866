#![no_main]

use libfuzzer_sys::fuzz_target;
use campaign_analyst::parser::extract_citations;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let extraction = extract_citations(text);
        assert!(extraction.text.len() <= text.len());
    }
});
