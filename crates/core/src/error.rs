//! 에러 타입 — 도메인별 에러 정의

/// authlog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AuthlogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 라인 분류 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 로그 소스 (입력 파일) 에러
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 라인 분류 에러
///
/// 토큰이 부족한 라인은 서비스 추출이 불가능하므로 분류 자체가 실패합니다.
/// 알 수 없는 서비스나 키워드 미매칭은 에러가 아니라 `NONE`/`unknown` 값으로 기록됩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// 단일 라인의 토큰 수 부족
    #[error("malformed line: expected at least {expected} tokens, got {found}")]
    TooFewTokens { expected: usize, found: usize },

    /// 배치 내 특정 라인의 분류 실패 (1부터 시작하는 라인 번호)
    #[error("malformed line {line_number}: {reason}: {content:?}")]
    MalformedLine {
        line_number: usize,
        reason: String,
        content: String,
    },
}

/// 로그 소스 에러
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// 파일이 존재하지 않음
    #[error("log file not found: {path}")]
    NotFound { path: String },

    /// 일반 파일이 아님 (디렉토리 등)
    #[error("not a regular file: {path}")]
    NotAFile { path: String },

    /// 읽기 권한 없음 또는 읽기 실패
    #[error("log file not readable: {path}: {reason}")]
    NotReadable { path: String, reason: String },

    /// 확장자 불일치
    #[error("not a .{expected} file: {path}")]
    WrongExtension { path: String, expected: String },
}
