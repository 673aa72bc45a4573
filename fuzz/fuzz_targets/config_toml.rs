#![no_main]

use libfuzzer_sys::fuzz_target;

use harborscan_core::config::HarborscanConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok(config) = HarborscanConfig::parse(content) {
            let _ = config.validate();
        }
    }
});
