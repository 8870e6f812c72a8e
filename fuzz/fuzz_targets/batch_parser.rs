#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use authlog_classifier::{AuthLogClassifier, BatchParser, MalformedPolicy};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 배치 라인 목록
    lines: Vec<String>,
    /// Skip 정책 사용 여부
    skip: bool,
    /// 최대 라인 길이 (0은 기본값)
    max_line_bytes: u16,
}

fuzz_target!(|input: FuzzInput| {
    let policy = if input.skip {
        MalformedPolicy::Skip
    } else {
        MalformedPolicy::Abort
    };
    let mut parser = BatchParser::new(AuthLogClassifier::with_builtin_tables()).with_policy(policy);
    if input.max_line_bytes > 0 {
        parser = parser.with_max_line_bytes(usize::from(input.max_line_bytes));
    }

    if let Ok(report) = parser.parse(&input.lines) {
        // 컬럼 길이는 항상 같고, 레코드 + 건너뛴 라인 = 입력 라인
        assert!(report.batch.is_aligned());
        assert_eq!(report.batch.len() + report.skipped.len(), input.lines.len());
        assert_eq!(report.total_lines, input.lines.len());
    }
});
