//! 라인 분류기 -- 인증 로그 한 줄을 [`LogRecord`]로 변환
//!
//! 분류 단계는 고정된 순서로 각각 독립적으로 수행됩니다.
//!
//! 1. 타임스탬프: 앞 세 토큰 (최소 5개 토큰 필요)
//! 2. 서비스: 인덱스 4 토큰을 `[`, `:`, `(` 순서로 검사하여 잘라낸 뒤 화이트리스트 조회
//! 3. 이벤트 유형: 이벤트 규칙 중 첫 번째로 포함된 트리거
//! 4. 사용자: 사용자 패턴 중 첫 번째로 포함된 트리거 뒤의 첫 토큰
//! 5. 출발지 IP: `from` 토큰 바로 다음 토큰
//! 6. validity/status: 상태 그룹 중 첫 번째로 트리거가 포함된 그룹
//!
//! # 사용 예시
//! ```ignore
//! use authlog_classifier::{AuthLogClassifier, ClassificationTables};
//! use std::sync::Arc;
//!
//! let classifier = AuthLogClassifier::new(Arc::new(ClassificationTables::builtin()));
//! let record = classifier.classify_line(
//!     "Mar 27 13:06:56 host sshd[1291]: Accepted password for john from 10.0.0.1 port 22 ssh2",
//! )?;
//! assert_eq!(record.service, "sshd");
//! ```

use std::sync::Arc;

use authlog_core::error::AuthlogError;
use authlog_core::pipeline::LineClassifier;
use authlog_core::types::{LogRecord, NONE_SENTINEL, Status, Validity};

use crate::error::ClassifierError;
use crate::tables::ClassificationTables;

/// 분류에 필요한 최소 토큰 수 (서비스 토큰이 인덱스 4)
pub const MIN_LINE_TOKENS: usize = 5;

/// 서비스 토큰 절단 구분자 (검사 순서 고정)
const SERVICE_DELIMITERS: [char; 3] = ['[', ':', '('];

/// `from` 다음 토큰을 출발지로 사용
const SOURCE_MARKER: &str = "from";

/// 인증 로그 분류기
///
/// 분류 테이블을 공유 참조로 보유하며 내부 가변 상태가 없습니다.
/// 여러 스레드에서 동시에 호출해도 안전합니다.
#[derive(Debug, Clone)]
pub struct AuthLogClassifier {
    tables: Arc<ClassificationTables>,
}

impl AuthLogClassifier {
    /// 주입된 테이블로 분류기를 생성합니다.
    pub fn new(tables: Arc<ClassificationTables>) -> Self {
        Self { tables }
    }

    /// 내장 테이블로 분류기를 생성합니다.
    pub fn with_builtin_tables() -> Self {
        Self::new(Arc::new(ClassificationTables::builtin()))
    }

    /// 한 줄을 분류합니다.
    pub fn classify_line(&self, line: &str) -> Result<LogRecord, ClassifierError> {
        classify_line(&self.tables, line)
    }
}

impl Default for AuthLogClassifier {
    fn default() -> Self {
        Self::with_builtin_tables()
    }
}

impl LineClassifier for AuthLogClassifier {
    fn name(&self) -> &str {
        "authlog"
    }

    fn classify(&self, line: &str) -> Result<LogRecord, AuthlogError> {
        self.classify_line(line).map_err(AuthlogError::from)
    }
}

/// 주어진 테이블로 한 줄을 분류합니다.
///
/// 토큰이 [`MIN_LINE_TOKENS`]개 미만이면 [`ClassifierError::TooFewTokens`]를 반환합니다.
/// 그 외의 모든 미매칭은 에러가 아니라 `NONE`, `None`, `unknown` 값으로 기록됩니다.
/// 끝의 개행 문자는 토큰화 과정에서 무시됩니다.
pub fn classify_line(tables: &ClassificationTables, line: &str) -> Result<LogRecord, ClassifierError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_LINE_TOKENS {
        return Err(ClassifierError::TooFewTokens {
            expected: MIN_LINE_TOKENS,
            found: tokens.len(),
        });
    }

    let timestamp = [
        tokens[0].to_owned(),
        tokens[1].to_owned(),
        tokens[2].to_owned(),
    ];
    let (validity, status) = match_status(tables, line);

    Ok(LogRecord {
        timestamp,
        service: extract_service(tables, tokens[4]),
        event_type: match_event(tables, line),
        user: extract_user(tables, line),
        source_ip: extract_source(&tokens),
        validity,
        status,
    })
}

fn extract_service(tables: &ClassificationTables, token: &str) -> String {
    let name = SERVICE_DELIMITERS
        .iter()
        .find_map(|&delim| token.split_once(delim).map(|(head, _)| head))
        .unwrap_or(token);

    if tables.is_known_service(name) {
        name.to_owned()
    } else {
        NONE_SENTINEL.to_owned()
    }
}

fn match_event(tables: &ClassificationTables, line: &str) -> Option<String> {
    tables
        .event_map()
        .iter()
        .find(|rule| line.contains(rule.trigger.as_str()))
        .map(|rule| rule.event_type.clone())
}

fn extract_user(tables: &ClassificationTables, line: &str) -> Option<String> {
    let pattern = tables
        .user_patterns()
        .iter()
        .find(|p| line.contains(p.trigger.as_str()))?;

    // 첫 번째로 매칭된 패턴에서 결정되며 하위 패턴으로 넘어가지 않음
    let (_, rest) = line.split_once(pattern.trigger.as_str())?;
    let name = rest.split_whitespace().next()?;
    Some(format!("{} {name}", pattern.label))
}

fn extract_source(tokens: &[&str]) -> String {
    tokens
        .iter()
        .position(|t| *t == SOURCE_MARKER)
        .and_then(|idx| tokens.get(idx + 1))
        .map_or_else(|| NONE_SENTINEL.to_owned(), |ip| (*ip).to_owned())
}

fn match_status(tables: &ClassificationTables, line: &str) -> (Validity, Status) {
    tables
        .status_groups()
        .iter()
        .find(|group| group.triggers.iter().any(|t| line.contains(t.as_str())))
        .map_or((Validity::Unknown, Status::Unknown), |group| {
            (group.validity, group.status)
        })
}
