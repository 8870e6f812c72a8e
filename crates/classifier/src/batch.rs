//! 배치 파서 -- 라인 목록을 컬럼형 [`ParsedBatch`]로 변환
//!
//! 라인을 입력 순서대로 하나씩 분류하여 각 필드를 해당 컬럼에 추가합니다.
//! 중복 제거, 정렬, 필터링은 하지 않습니다.
//!
//! 분류 불가 라인 처리는 [`MalformedPolicy`]로 결정합니다.
//! - [`MalformedPolicy::Abort`] (기본값): 첫 번째 분류 불가 라인에서 배치 전체가 실패
//! - [`MalformedPolicy::Skip`]: 해당 라인을 건너뛰고 [`BatchReport::skipped`]에 기록

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use authlog_core::config::AuthlogConfig;
use authlog_core::error::{AuthlogError, ParseError};
use authlog_core::metrics as m;
use authlog_core::pipeline::LineClassifier;
use authlog_core::types::ParsedBatch;

use crate::classifier::AuthLogClassifier;
use crate::error::ClassifierError;
use crate::tables::ClassificationTables;

/// 에러/리포트에 담는 라인 내용의 최대 길이 (문자)
const CONTENT_PREVIEW_CHARS: usize = 256;

/// 분류 불가 라인 처리 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// 배치 전체를 실패 처리
    #[default]
    Abort,
    /// 라인을 건너뛰고 리포트에 기록
    Skip,
}

impl MalformedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MalformedPolicy {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(ClassifierError::Config {
                field: "classifier.on_malformed".to_owned(),
                reason: format!("unknown policy '{other}', expected 'abort' or 'skip'"),
            }),
        }
    }
}

/// 건너뛴 분류 불가 라인
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedLine {
    /// 1부터 시작하는 입력 라인 번호
    pub line_number: usize,
    /// 분류 실패 사유
    pub reason: String,
    /// 라인 내용 (긴 라인은 잘림)
    pub content: String,
}

impl From<MalformedLine> for ParseError {
    fn from(line: MalformedLine) -> Self {
        ParseError::MalformedLine {
            line_number: line.line_number,
            reason: line.reason,
            content: line.content,
        }
    }
}

/// 배치 파싱 결과
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// 분류된 레코드
    pub batch: ParsedBatch,
    /// 건너뛴 라인 (`Skip` 정책에서만 채워짐)
    pub skipped: Vec<MalformedLine>,
    /// 입력된 전체 라인 수
    pub total_lines: usize,
}

impl BatchReport {
    /// 모든 라인이 레코드가 되었는지 여부
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.batch.len() == self.total_lines
    }
}

/// 배치 파서
///
/// 라인 분류기를 입력 라인마다 한 번씩 호출합니다.
/// 분류기는 공유 상태가 없으므로 파서 자체도 `&self`로 재사용할 수 있습니다.
pub struct BatchParser<C: LineClassifier> {
    classifier: C,
    policy: MalformedPolicy,
    max_line_bytes: usize,
}

impl<C: LineClassifier> BatchParser<C> {
    /// 기본 정책(`Abort`)으로 파서를 생성합니다.
    ///
    /// 라인 길이 제한은 없습니다. 제한은 [`Self::with_max_line_bytes`]나
    /// [`Self::from_config`]로만 적용됩니다.
    pub fn new(classifier: C) -> Self {
        Self {
            classifier,
            policy: MalformedPolicy::default(),
            max_line_bytes: usize::MAX,
        }
    }

    /// 분류 불가 라인 정책을 설정합니다.
    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// 설정에서 정책과 최대 라인 길이를 읽어 파서를 생성합니다.
    pub fn from_config(classifier: C, config: &AuthlogConfig) -> Result<Self, ClassifierError> {
        let policy = config.classifier.on_malformed.parse()?;
        Ok(Self::new(classifier)
            .with_policy(policy)
            .with_max_line_bytes(config.source.max_line_bytes))
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// 라인 목록을 분류하여 배치를 생성합니다.
    ///
    /// `Abort` 정책에서는 첫 번째 분류 불가 라인에서
    /// [`ParseError::MalformedLine`]을 반환하며 부분 결과는 버려집니다.
    pub fn parse<I, S>(&self, lines: I) -> Result<BatchReport, AuthlogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines.into_iter();
        let mut report = BatchReport {
            batch: ParsedBatch::with_capacity(lines.size_hint().0),
            ..BatchReport::default()
        };

        for (idx, line) in lines.enumerate() {
            let line = line.as_ref();
            let line_number = idx + 1;
            report.total_lines += 1;
            metrics::counter!(m::CLASSIFIER_LINES_TOTAL).increment(1);

            let result = if line.len() > self.max_line_bytes {
                Err(format!(
                    "line too long: {} bytes (max: {})",
                    line.len(),
                    self.max_line_bytes
                ))
            } else {
                match self.classifier.classify(line) {
                    Ok(record) => Ok(record),
                    Err(AuthlogError::Parse(e)) => Err(e.to_string()),
                    Err(other) => return Err(other),
                }
            };

            match result {
                Ok(record) => {
                    metrics::counter!(m::CLASSIFIER_RECORDS_TOTAL, m::LABEL_STATUS => record.status.as_str())
                        .increment(1);
                    report.batch.push(record);
                }
                Err(reason) => {
                    metrics::counter!(m::CLASSIFIER_MALFORMED_LINES_TOTAL).increment(1);
                    let malformed = MalformedLine {
                        line_number,
                        reason,
                        content: preview(line),
                    };

                    match self.policy {
                        MalformedPolicy::Abort => {
                            debug!(
                                line_number,
                                classifier = self.classifier.name(),
                                "aborting batch on malformed line"
                            );
                            return Err(ParseError::from(malformed).into());
                        }
                        MalformedPolicy::Skip => {
                            warn!(
                                line_number,
                                reason = %malformed.reason,
                                "skipping malformed line"
                            );
                            report.skipped.push(malformed);
                        }
                    }
                }
            }
        }

        debug!(
            classifier = self.classifier.name(),
            total_lines = report.total_lines,
            records = report.batch.len(),
            skipped = report.skipped.len(),
            "batch parsed"
        );

        Ok(report)
    }
}

/// 내장 분류기와 `Abort` 정책으로 라인 목록을 분류합니다.
///
/// 첫 번째 분류 불가 라인에서 전체가 실패합니다.
pub fn parse_batch<I, S>(
    tables: Arc<ClassificationTables>,
    lines: I,
) -> Result<ParsedBatch, AuthlogError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    BatchParser::new(AuthLogClassifier::new(tables))
        .parse(lines)
        .map(|report| report.batch)
}

fn preview(line: &str) -> String {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.chars().count() <= CONTENT_PREVIEW_CHARS {
        return line.to_owned();
    }
    let mut truncated: String = line.chars().take(CONTENT_PREVIEW_CHARS).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use authlog_core::types::{NONE_SENTINEL, Status, Validity};
    use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
    use std::sync::atomic::{AtomicU64, Ordering};

    const LINES: [&str; 3] = [
        "Mar 27 13:06:56 ip-10-77-20-248 sshd[1291]: Accepted password for john from 192.168.0.101 port 22 ssh2",
        "Mar 27 13:06:57 ip-10-77-20-248 sshd[1292]: Failed password for invalid user admin from 203.0.113.42 port 22 ssh2",
        "Mar 27 13:06:58 ip-10-77-20-248 CRON[2001]: pam_unix(cron:session): session closed for user root",
    ];

    fn builtin_parser() -> BatchParser<AuthLogClassifier> {
        BatchParser::new(AuthLogClassifier::with_builtin_tables())
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("abort".parse::<MalformedPolicy>().unwrap(), MalformedPolicy::Abort);
        assert_eq!("skip".parse::<MalformedPolicy>().unwrap(), MalformedPolicy::Skip);
        assert!("Skip".parse::<MalformedPolicy>().is_err());
        assert!("ignore".parse::<MalformedPolicy>().is_err());
        assert_eq!(MalformedPolicy::default(), MalformedPolicy::Abort);
    }

    #[test]
    fn parse_preserves_order_and_alignment() {
        let report = builtin_parser().parse(LINES).unwrap();
        assert_eq!(report.total_lines, 3);
        assert!(report.is_complete());

        let batch = &report.batch;
        assert_eq!(batch.len(), 3);
        assert!(batch.is_aligned());
        assert_eq!(batch.timestamps()[2][2], "13:06:58");
        assert_eq!(
            batch.statuses(),
            &[Status::Success, Status::Failed, Status::Neutral]
        );
        assert_eq!(batch.services()[2], NONE_SENTINEL);
    }

    #[test]
    fn absent_fields_do_not_shorten_columns() {
        let lines = [
            "Mar 27 13:06:56 host kernel: random noise",
            "Mar 27 13:06:57 host sshd[1]: Accepted password for bob from 10.0.0.2 port 22",
        ];
        let batch = parse_batch(Arc::new(ClassificationTables::builtin()), lines).unwrap();
        assert_eq!(batch.event_types().len(), 2);
        assert_eq!(batch.users().len(), 2);
        assert_eq!(batch.event_types()[0], None);
        assert_eq!(batch.users()[1].as_deref(), Some("valid_user_basic bob"));
        assert_eq!(batch.validities()[0], Validity::Unknown);
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let report = builtin_parser().parse(Vec::<String>::new()).unwrap();
        assert!(report.batch.is_empty());
        assert_eq!(report.total_lines, 0);
    }

    #[test]
    fn abort_policy_reports_line_number_and_content() {
        let lines = [LINES[0], "short line", LINES[1]];
        let err = builtin_parser().parse(lines).unwrap_err();
        match err {
            AuthlogError::Parse(ParseError::MalformedLine {
                line_number,
                reason,
                content,
            }) => {
                assert_eq!(line_number, 2);
                assert!(reason.contains("got 2"));
                assert_eq!(content, "short line");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_line_is_malformed() {
        let err = builtin_parser().parse([LINES[0], "   "]).unwrap_err();
        assert!(matches!(
            err,
            AuthlogError::Parse(ParseError::MalformedLine { line_number: 2, .. })
        ));
    }

    #[test]
    fn skip_policy_collects_malformed_lines() {
        let parser = builtin_parser().with_policy(MalformedPolicy::Skip);
        let lines = ["", LINES[0], "a b c", LINES[1]];
        let report = parser.parse(lines).unwrap();

        assert_eq!(report.total_lines, 4);
        assert_eq!(report.batch.len(), 2);
        assert!(report.batch.is_aligned());
        assert!(!report.is_complete());

        let numbers: Vec<usize> = report.skipped.iter().map(|m| m.line_number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(report.skipped[1].content, "a b c");
    }

    #[test]
    fn overlong_line_is_malformed() {
        let parser = builtin_parser()
            .with_policy(MalformedPolicy::Skip)
            .with_max_line_bytes(40);
        let report = parser.parse([LINES[0]]).unwrap();
        assert!(report.batch.is_empty());
        assert!(report.skipped[0].reason.contains("line too long"));
    }

    #[test]
    fn parse_batch_has_no_line_length_limit() {
        let line = format!(
            "Mar 27 13:06:56 host sshd[1]: Accepted password for john from 10.0.0.1 {}",
            "x".repeat(70 * 1024)
        );
        let batch = parse_batch(Arc::new(ClassificationTables::builtin()), [line]).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.statuses()[0], Status::Success);
        assert_eq!(batch.source_ips()[0], "10.0.0.1");
    }

    #[test]
    fn preview_truncates_long_content() {
        let long = "x".repeat(CONTENT_PREVIEW_CHARS + 10);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), CONTENT_PREVIEW_CHARS + 3);
        assert_eq!(preview("abc\r\n"), "abc");
    }

    #[test]
    fn from_config_reads_policy_and_limit() {
        let mut config = AuthlogConfig::default();
        config.classifier.on_malformed = "skip".to_owned();
        config.source.max_line_bytes = 128;
        let parser =
            BatchParser::from_config(AuthLogClassifier::with_builtin_tables(), &config).unwrap();
        assert_eq!(parser.policy(), MalformedPolicy::Skip);
        assert_eq!(parser.max_line_bytes, 128);
    }

    #[test]
    fn from_config_rejects_unknown_policy() {
        let mut config = AuthlogConfig::default();
        config.classifier.on_malformed = "retry".to_owned();
        let result = BatchParser::from_config(AuthLogClassifier::with_builtin_tables(), &config);
        assert!(matches!(result, Err(ClassifierError::Config { .. })));
    }

    #[derive(Default)]
    struct CountingRecorder {
        counters: std::sync::Mutex<std::collections::HashMap<String, Arc<AtomicU64>>>,
    }

    impl CountingRecorder {
        fn get(&self, key: &str) -> u64 {
            self.counters
                .lock()
                .unwrap()
                .get(key)
                .map_or(0, |c| c.load(Ordering::Relaxed))
        }
    }

    impl Recorder for CountingRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let mut name = key.name().to_owned();
            for label in key.labels() {
                name.push_str(&format!("{{{}={}}}", label.key(), label.value()));
            }
            let counter = self.counters.lock().unwrap().entry(name).or_default().clone();
            Counter::from_arc(counter)
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn parse_records_counters_when_recorder_installed() {
        let recorder = CountingRecorder::default();
        metrics::with_local_recorder(&recorder, || {
            builtin_parser()
                .with_policy(MalformedPolicy::Skip)
                .parse([LINES[0], "x", LINES[1], LINES[0]])
                .unwrap();
        });

        assert_eq!(recorder.get(m::CLASSIFIER_LINES_TOTAL), 4);
        assert_eq!(recorder.get(m::CLASSIFIER_MALFORMED_LINES_TOTAL), 1);
        assert_eq!(
            recorder.get(&format!("{}{{status=Success}}", m::CLASSIFIER_RECORDS_TOTAL)),
            2
        );
        assert_eq!(
            recorder.get(&format!("{}{{status=Failed}}", m::CLASSIFIER_RECORDS_TOTAL)),
            1
        );
    }

    #[test]
    fn parser_accepts_owned_strings() {
        let owned: Vec<String> = LINES.iter().map(|l| format!("{l}\n")).collect();
        let report = builtin_parser().parse(&owned).unwrap();
        assert_eq!(report.batch.len(), 3);
        assert_eq!(report.batch.source_ips()[0], "192.168.0.101");
    }
}
