#![no_main]

use libfuzzer_sys::fuzz_target;

use flotilla::Application;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Fuzz application manifest parsing - this should never panic
        let _ = serde_yaml_ng::from_str::<Application>(content);
    }
});
