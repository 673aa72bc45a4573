#![no_main]

use libfuzzer_sys::fuzz_target;

use harborscan_core::types::ScanStatus;
use harborscan_engine::api::dto::ScanStatusResponse;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = ScanStatus::from_str_loose(content);

        if let Ok(response) = serde_json::from_str::<ScanStatusResponse>(content) {
            let _ = response.into_snapshot();
        }
    }
});
