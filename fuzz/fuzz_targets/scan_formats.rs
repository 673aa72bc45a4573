#![no_main]

use libfuzzer_sys::fuzz_target;

use harborscan_engine::api::dto::{ScanFileFormat, formats_to_rules};

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(formats) = serde_json::from_str::<Vec<ScanFileFormat>>(content) {
            let _ = formats_to_rules(&formats);
        }
    }
});
