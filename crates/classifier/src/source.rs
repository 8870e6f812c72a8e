//! 로그 소스 -- 인증 로그 파일을 읽어 라인 목록을 제공
//!
//! 파일 전체를 한 번에 읽는 배치 방식입니다. 로테이션 추적이나 증분 읽기는 하지 않습니다.
//!
//! # 검사 순서
//! 1. 확장자 (`require_log_extension`이 켜진 경우 `.log`만 허용)
//! 2. 존재 여부
//! 3. 일반 파일 여부
//! 4. 읽기 가능 여부
//!
//! 잘못된 UTF-8 바이트는 대체 문자로 치환됩니다.

use std::path::{Path, PathBuf};

use tracing::info;

use authlog_core::config::SourceConfig;
use authlog_core::error::SourceError;

use crate::error::ClassifierError;

/// 허용되는 로그 파일 확장자
const LOG_EXTENSION: &str = "log";

/// 메모리에 적재된 로그 파일
#[derive(Debug, Clone)]
pub struct LogSource {
    path: PathBuf,
    lines: Vec<String>,
}

impl LogSource {
    /// 로그 파일을 열어 라인 단위로 읽습니다.
    pub async fn open(path: impl AsRef<Path>, config: &SourceConfig) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        if config.require_log_extension && !has_log_extension(path) {
            return Err(SourceError::WrongExtension {
                path: display,
                expected: LOG_EXTENSION.to_owned(),
            }
            .into());
        }

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound { path: display }.into());
            }
            Err(e) => {
                return Err(SourceError::NotReadable {
                    path: display,
                    reason: e.to_string(),
                }
                .into());
            }
        };

        if !metadata.is_file() {
            return Err(SourceError::NotAFile { path: display }.into());
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SourceError::NotReadable {
                path: display.clone(),
                reason: e.to_string(),
            })?;

        let lines: Vec<String> = String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_owned)
            .collect();

        info!(path = %path.display(), lines = lines.len(), bytes = bytes.len(), "read log file");

        Ok(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 개행 문자가 제거된 라인 목록
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn has_log_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == LOG_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[tokio::test]
    async fn open_reads_lines_without_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "auth.log", b"first line\r\nsecond line\nthird");
        let source = LogSource::open(&path, &SourceConfig::default()).await.unwrap();
        assert_eq!(source.lines(), &["first line", "second line", "third"]);
        assert_eq!(source.len(), 3);
        assert_eq!(source.path(), path.as_path());
    }

    #[tokio::test]
    async fn open_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "auth.txt", b"x");
        let err = LogSource::open(&path, &SourceConfig::default()).await.unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::Source(SourceError::WrongExtension { .. })
        ));
    }

    #[tokio::test]
    async fn extension_check_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "auth.txt", b"a b c d e");
        let config = SourceConfig {
            require_log_extension: false,
            ..SourceConfig::default()
        };
        let source = LogSource::open(&path, &config).await.unwrap();
        assert_eq!(source.len(), 1);
    }

    #[tokio::test]
    async fn extension_checked_before_existence() {
        let err = LogSource::open("/nonexistent/auth.txt", &SourceConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::Source(SourceError::WrongExtension { .. })
        ));
    }

    #[tokio::test]
    async fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogSource::open(dir.path().join("missing.log"), &SourceConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Source(SourceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("archive.log");
        std::fs::create_dir(&sub).unwrap();
        let err = LogSource::open(&sub, &SourceConfig::default()).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Source(SourceError::NotAFile { .. })));
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "auth.log", b"bad \xff byte\n");
        let source = LogSource::open(&path, &SourceConfig::default()).await.unwrap();
        assert_eq!(source.lines()[0], "bad \u{FFFD} byte");
    }

    #[tokio::test]
    async fn empty_file_has_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "empty.log", b"");
        let source = LogSource::open(&path, &SourceConfig::default()).await.unwrap();
        assert!(source.is_empty());
    }
}
