#![no_main]

use authlog_classifier::{ClassificationTables, classify_line};
use authlog_core::types::NONE_SENTINEL;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let tables = ClassificationTables::builtin();
    let line = String::from_utf8_lossy(data);

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(record) = classify_line(&tables, &line) {
        assert!(record.service == NONE_SENTINEL || tables.is_known_service(&record.service));
    }
});
