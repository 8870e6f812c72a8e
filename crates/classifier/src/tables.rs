//! 분류 테이블 -- 라인 분류를 구동하는 정적 매핑 데이터
//!
//! 네 개의 테이블로 구성됩니다.
//! - 서비스 화이트리스트 (`known_services`)
//! - 이벤트 유형 키워드 목록 (`event`)
//! - 사용자 추출 패턴 목록 (`user`)
//! - 상태 그룹 목록 (`status_group`)
//!
//! 목록형 테이블은 모두 순서가 곧 우선순위입니다. 첫 번째로 매칭된 항목이 이기므로
//! 구체적인 트리거를 일반적인 트리거보다 앞에 두어야 합니다.
//!
//! # TOML 스키마
//! ```toml
//! known_services = ["sshd", "sudo"]
//!
//! [[event]]
//! trigger = "Failed password"
//! event_type = "failed_login"
//!
//! [[user]]
//! trigger = "for invalid user"
//! label = "invalid_user"
//!
//! [[status_group]]
//! validity = "invalid"
//! status = "Failed"
//! triggers = ["Failed password", "invalid user"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use authlog_core::config::ClassifierConfig;
use authlog_core::types::{Status, Validity};

use crate::error::ClassifierError;

/// 테이블 파일 최대 크기
const MAX_TABLES_FILE_SIZE: u64 = 1024 * 1024; // 1MB

const KNOWN_SERVICES: &[&str] = &[
    "sshd",                 // 원격 SSH 로그인
    "login",                // 로컬 콘솔 로그인
    "sudo",                 // sudo 권한 상승
    "su",                   // 사용자 전환
    "gdm-password",         // GNOME 그래픽 로그인
    "lightdm",              // Ubuntu/Debian 그래픽 로그인
    "systemd",              // 세션 관리
    "systemd-logind",       // 사용자 세션
    "polkitd",              // PolicyKit 권한
    "passwd",               // 비밀번호 변경
    "cron",                 // 사용자 예약 작업
    "atd",                  // 일회성 예약 작업
    "dbus",                 // 데스크톱 서비스 통신
    "pam_unix",             // 로컬 비밀번호 PAM 모듈
    "pam_sss",              // SSSD 경유 PAM (LDAP / AD)
    "useradd",              // 사용자 생성
    "usermod",              // 사용자 변경
    "userdel",              // 사용자 삭제
    "groupadd",             // 그룹 생성
    "groupdel",             // 그룹 삭제
    "gnome-keyring-daemon", // GNOME 비밀번호 저장소
    "sssd",                 // LDAP / AD 접근
    "snapd",                // Snap 서비스
    "auditd",               // 감사 서비스
    "cupsd",                // 인쇄 서비스
    "rsyslogd",             // 로깅 서비스
];

const EVENT_MAP: &[(&str, &str)] = &[
    ("sudo:", "sudo_usage"),
    ("su:", "su_switch"),
    ("Failed password", "failed_login"),
    ("Accepted password", "success_login"),
    ("invalid user", "invalid_user"),
    ("session opened", "session_opened"),
    ("session closed", "session_closed"),
    ("authentication failure", "auth_failure"),
    ("passwd:", "password_change"),
];

const USER_PATTERNS: &[(&str, &str)] = &[
    ("for invalid user", "invalid_user"),
    ("for user", "valid_user_explicit"),
    ("for", "valid_user_basic"),
];

const INVALID_TRIGGERS: &[&str] = &[
    "Failed password",
    "invalid user",
    "authentication failure",
    "Failed publickey",
    "Connection closed by authenticating user",
    "PAM authentication error",
    "Disconnected from",
    "Too many authentication failures",
    "User not known to the underlying authentication module",
    "User not in sudoers",
];

const VALID_TRIGGERS: &[&str] = &[
    "Accepted password",
    "Accepted publickey",
    "session opened",
    "PAM: session opened",
    "login success",
    "authentication succeeded",
    "User logged in",
    "sudo: pam_unix(sudo:session): session opened",
    "su: session opened",
];

const NEUTRAL_TRIGGERS: &[&str] = &[
    "session closed",
    "sudo:",
    "su:",
    "useradd:",
    "usermod:",
    "userdel:",
    "groupadd:",
    "groupdel:",
    "password changed",
    "gpasswd:",
];

const SYSTEM_TRIGGERS: &[&str] = &[
    "Server listening",
    "Listening on",
    "Starting",
    "Started",
    "Stopping",
    "Stopped",
    "Service started",
    "Reloading",
    "Rebooting",
    "Watching system buttons",
    "dbus-daemon:",
    "gnome-keyring-daemon:",
];

/// 이벤트 유형 규칙 -- 트리거가 라인에 포함되면 `event_type`을 기록합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRule {
    /// 부분 문자열 트리거 (대소문자 구분)
    pub trigger: String,
    /// 이벤트 유형 태그
    pub event_type: String,
}

/// 사용자 추출 패턴 -- 트리거 바로 뒤의 첫 토큰을 사용자명으로 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPattern {
    /// 부분 문자열 트리거
    pub trigger: String,
    /// 사용자 문자열 앞에 붙는 레이블
    pub label: String,
}

/// 상태 그룹 -- 트리거 중 하나라도 포함되면 그룹이 매칭됩니다.
///
/// 그룹의 `validity`가 곧 그룹 이름입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusGroup {
    /// 그룹 이름 (validity 태그)
    pub validity: Validity,
    /// 그룹에 연결된 결과 태그
    pub status: Status,
    /// 부분 문자열 트리거 목록
    pub triggers: Vec<String>,
}

/// 분류 테이블
///
/// 프로세스 시작 시 한 번 생성되며 이후 변경되지 않습니다.
/// 분류기에는 `Arc<ClassificationTables>`로 주입됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTables {
    known_services: HashSet<String>,
    #[serde(rename = "event", default)]
    event_map: Vec<EventRule>,
    #[serde(rename = "user", default)]
    user_patterns: Vec<UserPattern>,
    #[serde(rename = "status_group", default)]
    status_groups: Vec<StatusGroup>,
}

impl ClassificationTables {
    /// 테이블을 직접 구성합니다. 구성 직후 유효성을 검증합니다.
    pub fn new(
        known_services: impl IntoIterator<Item = String>,
        event_map: Vec<EventRule>,
        user_patterns: Vec<UserPattern>,
        status_groups: Vec<StatusGroup>,
    ) -> Result<Self, ClassifierError> {
        let tables = Self {
            known_services: known_services.into_iter().collect(),
            event_map,
            user_patterns,
            status_groups,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// 내장 테이블을 생성합니다.
    pub fn builtin() -> Self {
        let group = |validity, status, triggers: &[&str]| StatusGroup {
            validity,
            status,
            triggers: triggers.iter().map(|t| (*t).to_owned()).collect(),
        };

        Self {
            known_services: KNOWN_SERVICES.iter().map(|s| (*s).to_owned()).collect(),
            event_map: EVENT_MAP
                .iter()
                .map(|(trigger, event_type)| EventRule {
                    trigger: (*trigger).to_owned(),
                    event_type: (*event_type).to_owned(),
                })
                .collect(),
            user_patterns: USER_PATTERNS
                .iter()
                .map(|(trigger, label)| UserPattern {
                    trigger: (*trigger).to_owned(),
                    label: (*label).to_owned(),
                })
                .collect(),
            status_groups: vec![
                group(Validity::Invalid, Status::Failed, INVALID_TRIGGERS),
                group(Validity::Valid, Status::Success, VALID_TRIGGERS),
                group(Validity::Neutral, Status::Neutral, NEUTRAL_TRIGGERS),
                group(Validity::System, Status::Info, SYSTEM_TRIGGERS),
            ],
        }
    }

    /// 분류기 설정에 따라 테이블을 준비합니다.
    ///
    /// `tables_path`가 비어 있으면 내장 테이블을, 아니면 해당 파일을 사용합니다.
    pub async fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        if config.tables_path.is_empty() {
            tracing::debug!("using builtin classification tables");
            return Ok(Self::builtin());
        }
        Self::load(&config.tables_path).await
    }

    /// TOML 파일에서 테이블을 로드합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ClassifierError::TablesLoad {
                path: path.display().to_string(),
                reason: format!("failed to read file metadata: {e}"),
            })?;

        if metadata.len() > MAX_TABLES_FILE_SIZE {
            return Err(ClassifierError::TablesLoad {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_TABLES_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ClassifierError::TablesLoad {
                    path: path.display().to_string(),
                    reason: format!("failed to read file: {e}"),
                })?;

        let tables = Self::from_toml(&content, &path.display().to_string())?;

        tracing::info!(
            path = %path.display(),
            services = tables.known_services.len(),
            events = tables.event_map.len(),
            user_patterns = tables.user_patterns.len(),
            status_groups = tables.status_groups.len(),
            "loaded classification tables"
        );

        Ok(tables)
    }

    /// TOML 문자열을 파싱하여 테이블을 생성합니다.
    ///
    /// `source`는 에러 메시지에 표시할 출처입니다.
    pub fn from_toml(toml_str: &str, source: &str) -> Result<Self, ClassifierError> {
        let tables: Self = toml::from_str(toml_str).map_err(|e| ClassifierError::TablesLoad {
            path: source.to_owned(),
            reason: e.to_string(),
        })?;
        tables.validate()?;
        Ok(tables)
    }

    /// 테이블의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.known_services.is_empty() {
            return Err(invalid("known_services", "must not be empty"));
        }
        if self.known_services.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid("known_services", "service name must not be empty"));
        }

        for (idx, rule) in self.event_map.iter().enumerate() {
            if rule.trigger.is_empty() {
                return Err(invalid("event", &format!("entry[{idx}] has an empty trigger")));
            }
            if rule.event_type.is_empty() {
                return Err(invalid(
                    "event",
                    &format!("entry[{idx}] ('{}') has an empty event_type", rule.trigger),
                ));
            }
        }

        for (idx, pattern) in self.user_patterns.iter().enumerate() {
            if pattern.trigger.is_empty() {
                return Err(invalid("user", &format!("entry[{idx}] has an empty trigger")));
            }
            if pattern.label.is_empty() {
                return Err(invalid(
                    "user",
                    &format!("entry[{idx}] ('{}') has an empty label", pattern.trigger),
                ));
            }
        }

        let mut seen = HashSet::new();
        for group in &self.status_groups {
            if group.validity == Validity::Unknown {
                return Err(invalid(
                    "status_group",
                    "'unknown' is reserved for lines matching no group",
                ));
            }
            if !seen.insert(group.validity) {
                return Err(invalid(
                    "status_group",
                    &format!("duplicate group '{}'", group.validity),
                ));
            }
            if group.triggers.is_empty() {
                return Err(invalid(
                    "status_group",
                    &format!("group '{}' has no triggers", group.validity),
                ));
            }
            if group.triggers.iter().any(String::is_empty) {
                return Err(invalid(
                    "status_group",
                    &format!("group '{}' has an empty trigger", group.validity),
                ));
            }
        }

        Ok(())
    }

    /// 서비스명이 화이트리스트에 있는지 확인합니다.
    pub fn is_known_service(&self, service: &str) -> bool {
        self.known_services.contains(service)
    }

    pub fn known_services(&self) -> &HashSet<String> {
        &self.known_services
    }

    /// 우선순위 순서의 이벤트 규칙
    pub fn event_map(&self) -> &[EventRule] {
        &self.event_map
    }

    /// 우선순위 순서의 사용자 패턴
    pub fn user_patterns(&self) -> &[UserPattern] {
        &self.user_patterns
    }

    /// 우선순위 순서의 상태 그룹
    pub fn status_groups(&self) -> &[StatusGroup] {
        &self.status_groups
    }
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self::builtin()
    }
}

fn invalid(table: &str, reason: &str) -> ClassifierError {
    ClassifierError::TablesValidation {
        table: table.to_owned(),
        reason: reason.to_owned(),
    }
}
