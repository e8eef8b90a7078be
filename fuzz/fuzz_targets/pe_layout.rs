#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(layout) = codenav::formats::pe::parse_layout(data) {
        let _ = layout.validate();
    }
});
