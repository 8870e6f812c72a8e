#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`tables`]: 서비스 화이트리스트, 이벤트/사용자/상태 키워드 테이블
//! - [`classifier`]: 한 줄을 [`LogRecord`](authlog_core::types::LogRecord)로 변환하는 라인 분류기
//! - [`batch`]: 라인 목록을 [`ParsedBatch`](authlog_core::types::ParsedBatch)로 모으는 배치 파서
//! - [`source`]: `.log` 파일을 읽어 라인 목록을 제공하는 로그 소스
//! - [`error`]: 도메인 에러 타입

pub mod batch;
pub mod classifier;
pub mod error;
pub mod source;
pub mod tables;

// --- 주요 타입 re-export ---

// 분류기
pub use classifier::{AuthLogClassifier, MIN_LINE_TOKENS, classify_line};

// 배치 파서
pub use batch::{BatchParser, BatchReport, MalformedLine, MalformedPolicy, parse_batch};

// 분류 테이블
pub use tables::{ClassificationTables, EventRule, StatusGroup, UserPattern};

// 로그 소스
pub use source::LogSource;

// 에러
pub use error::ClassifierError;
