#![no_main]

use authlog_classifier::ClassificationTables;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // 로드에 성공한 테이블은 항상 검증을 통과해야 한다
        if let Ok(tables) = ClassificationTables::from_toml(text, "fuzz") {
            assert!(tables.validate().is_ok());
        }
    }
});
