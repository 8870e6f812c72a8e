//! 분류기 에러 타입
//!
//! [`ClassifierError`]는 분류 엔진 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<ClassifierError> for AuthlogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use authlog_core::error::{AuthlogError, ConfigError, ParseError, SourceError};

/// 분류 엔진 도메인 에러
///
/// 테이블 로딩/검증, 라인 분류, 로그 소스 접근 등
/// 분류 엔진 내부의 모든 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// 토큰 수 부족으로 라인 분류 불가
    #[error("malformed line: expected at least {expected} tokens, got {found}")]
    TooFewTokens {
        /// 필요한 최소 토큰 수
        expected: usize,
        /// 실제 토큰 수
        found: usize,
    },

    /// 테이블 파일 로딩 실패
    #[error("tables load error: {path}: {reason}")]
    TablesLoad {
        /// 테이블 파일 경로
        path: String,
        /// 로딩 실패 사유
        reason: String,
    },

    /// 테이블 유효성 검증 실패
    #[error("tables validation error: {table}: {reason}")]
    TablesValidation {
        /// 문제가 된 테이블 (services, event, user, status_group)
        table: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 로그 소스 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ClassifierError> for AuthlogError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::TooFewTokens { expected, found } => {
                AuthlogError::Parse(ParseError::TooFewTokens { expected, found })
            }
            ClassifierError::Source(e) => AuthlogError::Source(e),
            ClassifierError::Io(e) => AuthlogError::Io(e),
            ClassifierError::Config { field, reason } => {
                AuthlogError::Config(ConfigError::InvalidValue { field, reason })
            }
            other @ (ClassifierError::TablesLoad { .. }
            | ClassifierError::TablesValidation { .. }) => {
                AuthlogError::Config(ConfigError::InvalidValue {
                    field: "classifier.tables_path".to_owned(),
                    reason: other.to_string(),
                })
            }
        }
    }
}
