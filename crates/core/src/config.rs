//! 설정 관리 — authlog.toml 파싱 및 런타임 설정
//!
//! [`AuthlogConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`AUTHLOG_OUTPUT_LIMIT=20` 형식)
//! 3. 설정 파일 (`authlog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), authlog_core::error::AuthlogError> {
//! use authlog_core::config::AuthlogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = AuthlogConfig::load("authlog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = AuthlogConfig::parse("[output]\nlimit = 25")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AuthlogError, ConfigError};

/// authlog 통합 설정
///
/// `authlog.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthlogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 분류기 설정
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// 로그 소스 설정
    #[serde(default)]
    pub source: SourceConfig,
    /// 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

impl AuthlogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AuthlogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수 오버라이드로 설정을 구성합니다.
    pub fn from_env() -> Result<Self, AuthlogError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, AuthlogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AuthlogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AuthlogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, AuthlogError> {
        toml::from_str(toml_str).map_err(|e| {
            AuthlogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `AUTHLOG_{SECTION}_{FIELD}`
    /// 예: `AUTHLOG_CLASSIFIER_ON_MALFORMED=skip`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "AUTHLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "AUTHLOG_GENERAL_LOG_FORMAT");

        // Classifier
        override_string(
            &mut self.classifier.tables_path,
            "AUTHLOG_CLASSIFIER_TABLES_PATH",
        );
        override_string(
            &mut self.classifier.on_malformed,
            "AUTHLOG_CLASSIFIER_ON_MALFORMED",
        );

        // Source
        override_bool(
            &mut self.source.require_log_extension,
            "AUTHLOG_SOURCE_REQUIRE_LOG_EXTENSION",
        );
        override_usize(
            &mut self.source.max_line_bytes,
            "AUTHLOG_SOURCE_MAX_LINE_BYTES",
        );

        // Output
        override_usize(&mut self.output.limit, "AUTHLOG_OUTPUT_LIMIT");
        override_bool(&mut self.output.color, "AUTHLOG_OUTPUT_COLOR");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AuthlogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        let valid_policies = ["abort", "skip"];
        if !valid_policies.contains(&self.classifier.on_malformed.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "classifier.on_malformed".to_owned(),
                reason: format!("must be one of: {}", valid_policies.join(", ")),
            }
            .into());
        }

        if self.source.max_line_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "source.max_line_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.output.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "output.limit".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 분류기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// 분류 테이블 TOML 파일 경로 (비어 있으면 내장 테이블 사용)
    pub tables_path: String,
    /// 분류 불가 라인 처리 정책 (abort, skip)
    pub on_malformed: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            tables_path: String::new(),
            on_malformed: "abort".to_owned(),
        }
    }
}

/// 로그 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// `.log` 확장자 강제 여부
    pub require_log_extension: bool,
    /// 최대 라인 길이 (바이트), 초과 시 분류 불가 라인으로 처리
    pub max_line_bytes: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            require_log_extension: true,
            max_line_bytes: 64 * 1024, // 64KB
        }
    }
}

/// 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 기본 표시 레코드 수
    pub limit: usize,
    /// 상태별 색상 출력 여부
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            color: true,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
