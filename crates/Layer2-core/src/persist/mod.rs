//! Context Persistence - 문서 안에 컨텍스트 파일 목록 저장/복원
//!
//! 저장 값은 절대 경로의 JSON 배열 하나입니다: `["/a/b.rs","/c.md"]`
//!
//! ## 인코딩
//!
//! | DocumentKind | Codec | 위치 |
//! |--------------|-------|------|
//! | StructuredProperty | `PropertyCodec` | 문서 맨 위 property drawer |
//! | LocalVariable | `LocalVariableCodec` | 문서 끝 local variables 섹션 |
//! | Other | - | `UnsupportedDocument` |
//!
//! 버퍼 항목은 저장하지 않습니다 (재시작 후 식별 불가).

mod local_var;
mod property;
mod store;

pub use local_var::LocalVariableCodec;
pub use property::PropertyCodec;
pub use store::{ContextPersistenceStore, RestoreOutcome};

use crate::host::DocumentKind;
use std::path::PathBuf;
use tally_foundation::{Error, Result};

/// 문서 종류별 저장 형식
pub trait ContextCodec: Send + Sync {
    /// 담당 문서 종류
    fn kind(&self) -> DocumentKind;

    /// 저장된 원문 값 (없으면 None)
    fn read_raw(&self, text: &str) -> Option<String>;

    /// 값을 기록한 새 문서 본문
    ///
    /// 기존 값은 교체되며, 같은 값을 두 번 써도 결과는 같아야 합니다.
    fn write(&self, text: &str, blob: &str) -> String;
}

/// 경로 목록 → 저장 값
pub fn encode_paths(paths: &[PathBuf]) -> Result<String> {
    let strings: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    Ok(serde_json::to_string(&strings)?)
}

/// 저장 값 → 경로 목록
pub fn decode_paths(blob: &str) -> Result<Vec<PathBuf>> {
    let strings: Vec<String> = serde_json::from_str(blob.trim())
        .map_err(|e| Error::corrupt(format!("{}: {}", blob.trim(), e)))?;
    Ok(strings.into_iter().map(PathBuf::from).collect())
}

/// 문서가 쓰는 줄바꿈 (`\r\n`이 하나라도 있으면 CRLF)
pub(crate) fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ending() {
        assert_eq!(line_ending(""), "\n");
        assert_eq!(line_ending("a\nb\n"), "\n");
        assert_eq!(line_ending("a\r\nb\r\n"), "\r\n");
    }

    #[test]
    fn test_paths_blob() {
        let paths = vec![PathBuf::from("/a/b.rs"), PathBuf::from("/c d/e.md")];
        let blob = encode_paths(&paths).unwrap();
        assert_eq!(blob, r#"["/a/b.rs","/c d/e.md"]"#);
        assert_eq!(decode_paths(&blob).unwrap(), paths);

        assert_eq!(encode_paths(&[]).unwrap(), "[]");
        assert!(decode_paths(" [] ").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_blob() {
        for blob in ["(\"/a\"", "not json", "{\"a\":1}", "[1, 2]"] {
            assert!(matches!(
                decode_paths(blob),
                Err(Error::CorruptPersistedContext(_))
            ));
        }
    }
}
