//! 파이프라인 trait — 모듈 확장 포인트 정의

use crate::error::AuthlogError;
use crate::types::LogRecord;

/// 라인 분류기 trait
///
/// 원시 로그 한 줄을 [`LogRecord`]로 변환합니다.
/// 구현체는 공유 가변 상태를 갖지 않아야 하며, 같은 입력에 항상 같은 결과를 반환해야 합니다.
pub trait LineClassifier: Send + Sync {
    /// 분류기 이름
    fn name(&self) -> &str;

    /// 한 줄을 분류하여 레코드를 생성
    fn classify(&self, line: &str) -> Result<LogRecord, AuthlogError>;
}
