//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않으면 기록은 무시됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `authlog_`
//! - 모듈명: `classifier_`
//! - 접미어: `_total` (counter)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 상태 레이블 키 (Success, Failed, Neutral, Info, unknown)
pub const LABEL_STATUS: &str = "status";

// ─── Classifier 메트릭 ─────────────────────────────────────────────

/// Classifier: 입력된 전체 라인 수 (counter)
pub const CLASSIFIER_LINES_TOTAL: &str = "authlog_classifier_lines_total";

/// Classifier: 분류에 실패한 라인 수 (counter)
pub const CLASSIFIER_MALFORMED_LINES_TOTAL: &str = "authlog_classifier_malformed_lines_total";

/// Classifier: 상태별 생성된 레코드 수 (counter, label: status)
pub const CLASSIFIER_RECORDS_TOTAL: &str = "authlog_classifier_records_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_metrics() {
    metrics::describe_counter!(
        CLASSIFIER_LINES_TOTAL,
        "Total number of raw lines handed to the batch parser"
    );
    metrics::describe_counter!(
        CLASSIFIER_MALFORMED_LINES_TOTAL,
        "Total number of lines rejected as malformed"
    );
    metrics::describe_counter!(
        CLASSIFIER_RECORDS_TOTAL,
        "Total number of classified records by status"
    );
}
