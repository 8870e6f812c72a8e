//! 도메인 타입 — 분류 결과 레코드와 컬럼형 배치
//!
//! [`LogRecord`]는 인증 로그 한 줄의 분류 결과이고,
//! [`ParsedBatch`]는 레코드들을 필드별 컬럼으로 모은 결과 집합입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// "인식되었지만 값이 없음"을 나타내는 센티널 값
///
/// 서비스가 화이트리스트에 없거나 `from` 토큰이 없을 때 기록됩니다.
/// 파싱 실패와는 구별되는 정상적인 결과입니다.
pub const NONE_SENTINEL: &str = "NONE";

/// 인증 이벤트의 결과 태그
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// 인증 성공
    Success,
    /// 인증 실패
    Failed,
    /// 관리 작업 (세션 종료, 계정 변경 등)
    Neutral,
    /// 시스템 정보성 메시지
    Info,
    /// 어떤 그룹에도 매칭되지 않음
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl Status {
    /// 출력/직렬화에 사용하는 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::Neutral => "Neutral",
            Self::Info => "Info",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 매칭된 상태 그룹 이름
///
/// 그룹 이름이 곧 validity 태그입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    Invalid,
    Valid,
    Neutral,
    System,
    #[default]
    Unknown,
}

impl Validity {
    /// 출력/직렬화에 사용하는 문자열 표현
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Valid => "valid",
            Self::Neutral => "neutral",
            Self::System => "system",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 분류된 로그 레코드
///
/// 라인 분류기가 한 줄당 하나씩 생성하며, 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// 라인의 앞 세 토큰 (날짜 파싱 없이 원문 그대로)
    pub timestamp: [String; 3],
    /// 인식된 서비스명 또는 `NONE`
    pub service: String,
    /// 이벤트 유형 태그 (매칭 없으면 `None`)
    pub event_type: Option<String>,
    /// `"<label> <name>"` 형식의 사용자 (매칭 없으면 `None`)
    pub user: Option<String>,
    /// `from` 다음 토큰 또는 `NONE`
    pub source_ip: String,
    /// 매칭된 상태 그룹
    pub validity: Validity,
    /// 상태 그룹에 연결된 결과 태그
    pub status: Status,
}

impl LogRecord {
    /// 타임스탬프 토큰을 공백으로 이어 붙인 문자열
    pub fn timestamp_text(&self) -> String {
        self.timestamp.join(" ")
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] {} event={} user={} ip={}",
            self.timestamp_text(),
            self.service,
            self.status,
            self.validity,
            self.event_type.as_deref().unwrap_or("-"),
            self.user.as_deref().unwrap_or("-"),
            self.source_ip,
        )
    }
}

/// 배치 내 한 레코드에 대한 차용 뷰
///
/// 컬럼에서 같은 인덱스의 값을 모아 레코드를 재구성합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordView<'a> {
    pub timestamp: &'a [String; 3],
    pub service: &'a str,
    pub event_type: Option<&'a str>,
    pub user: Option<&'a str>,
    pub source_ip: &'a str,
    pub validity: Validity,
    pub status: Status,
}

impl RecordView<'_> {
    /// 타임스탬프 토큰을 공백으로 이어 붙인 문자열
    pub fn timestamp_text(&self) -> String {
        self.timestamp.join(" ")
    }

    /// 소유권을 가진 레코드로 복사합니다.
    pub fn to_record(&self) -> LogRecord {
        LogRecord {
            timestamp: self.timestamp.clone(),
            service: self.service.to_owned(),
            event_type: self.event_type.map(str::to_owned),
            user: self.user.map(str::to_owned),
            source_ip: self.source_ip.to_owned(),
            validity: self.validity,
            status: self.status,
        }
    }
}

/// 컬럼형 분류 결과 집합
///
/// 일곱 개 컬럼은 항상 같은 길이를 유지하며, 인덱스 `i`의 값들이 모여
/// 레코드 `i`를 이룹니다. `event_types`와 `users`는 `Option`을 담으므로
/// 값이 없어도 컬럼이 짧아지지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBatch {
    timestamps: Vec<[String; 3]>,
    services: Vec<String>,
    event_types: Vec<Option<String>>,
    users: Vec<Option<String>>,
    source_ips: Vec<String>,
    validities: Vec<Validity>,
    statuses: Vec<Status>,
}

impl ParsedBatch {
    /// 빈 배치를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지정한 레코드 수만큼 컬럼 용량을 미리 확보합니다.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            timestamps: Vec::with_capacity(capacity),
            services: Vec::with_capacity(capacity),
            event_types: Vec::with_capacity(capacity),
            users: Vec::with_capacity(capacity),
            source_ips: Vec::with_capacity(capacity),
            validities: Vec::with_capacity(capacity),
            statuses: Vec::with_capacity(capacity),
        }
    }

    /// 레코드의 각 필드를 해당 컬럼 끝에 추가합니다.
    pub fn push(&mut self, record: LogRecord) {
        self.timestamps.push(record.timestamp);
        self.services.push(record.service);
        self.event_types.push(record.event_type);
        self.users.push(record.user);
        self.source_ips.push(record.source_ip);
        self.validities.push(record.validity);
        self.statuses.push(record.status);
    }

    /// 레코드 수
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// 일곱 컬럼의 길이가 모두 같은지 확인합니다.
    pub fn is_aligned(&self) -> bool {
        let n = self.timestamps.len();
        self.services.len() == n
            && self.event_types.len() == n
            && self.users.len() == n
            && self.source_ips.len() == n
            && self.validities.len() == n
            && self.statuses.len() == n
    }

    /// 인덱스 `index`의 레코드 뷰를 반환합니다.
    pub fn get(&self, index: usize) -> Option<RecordView<'_>> {
        Some(RecordView {
            timestamp: self.timestamps.get(index)?,
            service: self.services.get(index)?,
            event_type: self.event_types.get(index)?.as_deref(),
            user: self.users.get(index)?.as_deref(),
            source_ip: self.source_ips.get(index)?,
            validity: *self.validities.get(index)?,
            status: *self.statuses.get(index)?,
        })
    }

    /// 입력 순서대로 레코드 뷰를 순회합니다.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = RecordView<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn timestamps(&self) -> &[[String; 3]] {
        &self.timestamps
    }

    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn event_types(&self) -> &[Option<String>] {
        &self.event_types
    }

    pub fn users(&self) -> &[Option<String>] {
        &self.users
    }

    pub fn source_ips(&self) -> &[String] {
        &self.source_ips
    }

    pub fn validities(&self) -> &[Validity] {
        &self.validities
    }

    pub fn statuses(&self) -> &[Status] {
        &self.statuses
    }
}

impl FromIterator<LogRecord> for ParsedBatch {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut batch = Self::with_capacity(iter.size_hint().0);
        for record in iter {
            batch.push(record);
        }
        batch
    }
}
