//! Context Entry - 대화에 첨부된 파일/버퍼

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 열린 버퍼 핸들 (호스트가 발급)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(pub String);

impl BufferId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 컨텍스트 항목
///
/// 동일성은 경로(파일) 또는 핸들(버퍼) 값으로 판단합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextEntry {
    File { path: PathBuf },
    Buffer { handle: BufferId },
}

impl ContextEntry {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn buffer(handle: BufferId) -> Self {
        Self::Buffer { handle }
    }

    /// 파일 항목이면 경로
    pub fn as_file(&self) -> Option<&Path> {
        match self {
            Self::File { path } => Some(path),
            Self::Buffer { .. } => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }

    /// 로그/이벤트용 식별 문자열
    pub fn identity(&self) -> String {
        match self {
            Self::File { path } => path.display().to_string(),
            Self::Buffer { handle } => format!("buffer:{}", handle),
        }
    }
}
