//! Document Host - 외부 협력자 인터페이스
//!
//! 문서(대화 버퍼)를 소유한 호스트가 제공해야 하는 기능:
//! - 범위 단어 수, 파일 속성 (크기, 바이너리 여부)
//! - 단어 수 계산용 임시 텍스트 (scope 종료 시 해제)
//! - 문서 본문 읽기/쓰기 (컨텍스트 저장 위치)
//! - 사용자 확인 (`Prompter`)

mod memory;

pub use memory::MemoryHost;

use crate::context::BufferId;
use std::ops::Range;
use std::path::Path;
use tally_foundation::Result;

/// 문서 종류 - 컨텍스트 저장 인코딩 선택에 사용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// property drawer를 지원하는 문서 (org 스타일)
    StructuredProperty,
    /// 파일 끝 local variables 섹션을 지원하는 문서 (markdown 스타일)
    LocalVariable,
    /// 저장 인코딩 없음
    Other,
}

impl DocumentKind {
    /// 파일 확장자로 종류 추정
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("org") => Self::StructuredProperty,
            Some("md") | Some("markdown") => Self::LocalVariable,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredProperty => "structured-property",
            Self::LocalVariable => "local-variable",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 단어 수 계산을 위해 잠시 연 파일 내용
///
/// 구현체는 `Drop`에서 임시 자원을 해제해야 합니다.
pub trait ScratchText {
    fn text(&self) -> &str;
}

/// 문서 호스트
pub trait DocumentHost: Send + Sync {
    /// 현재 문서(또는 선택 영역)의 범위 내 단어 수
    fn count_words_in_range(&self, range: Range<usize>) -> usize;

    /// 현재 문서 전체 길이 (범위 지정이 없을 때 사용)
    fn document_len(&self) -> usize;

    /// 바이너리 파일 여부
    fn is_binary(&self, path: &Path) -> bool;

    /// 파일 크기 (bytes)
    fn file_size(&self, path: &Path) -> Result<u64>;

    /// 단어 수 계산용 임시 내용 열기
    fn open_scratch(&self, path: &Path) -> Result<Box<dyn ScratchText + '_>>;

    /// 열린 버퍼의 전체 내용 (버퍼가 사라졌으면 None)
    fn buffer_text(&self, buffer: &BufferId) -> Option<String>;

    /// 문서 종류
    fn document_kind(&self) -> DocumentKind;

    /// 문서 본문
    fn document_text(&self) -> Result<String>;

    /// 문서 본문 교체
    fn write_document_text(&self, text: &str) -> Result<()>;
}

/// 사용자 확인 (yes/no, 블로킹)
pub trait Prompter: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// 항상 승인하는 Prompter (`--yes` 모드)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

impl<F> Prompter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// 공백 기준 단어 수
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 바이트 범위의 단어 수
///
/// 범위는 텍스트 길이로 잘리고, 문자 경계가 아니면 안쪽으로 좁혀집니다.
pub fn count_words_in(text: &str, range: Range<usize>) -> usize {
    let mut end = range.end.min(text.len());
    let mut start = range.start.min(end);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    while end > start && !text.is_char_boundary(end) {
        end -= 1;
    }
    count_words(&text[start..end.max(start)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            DocumentKind::from_path(Path::new("/notes/chat.org")),
            DocumentKind::StructuredProperty
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("README.MD")),
            DocumentKind::LocalVariable
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("notes.markdown")),
            DocumentKind::LocalVariable
        );
        assert_eq!(DocumentKind::from_path(Path::new("main.rs")), DocumentKind::Other);
        assert_eq!(DocumentKind::from_path(Path::new("Makefile")), DocumentKind::Other);
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("fn main() {\n    println!(\"hi\");\n}"), 5);
        assert_eq!(count_words("one\ttwo\nthree  four"), 4);
    }

    #[test]
    fn test_count_words_in_range() {
        let text = "alpha beta gamma delta";
        assert_eq!(count_words_in(text, 0..text.len()), 4);
        assert_eq!(count_words_in(text, 6..16), 2);
        assert_eq!(count_words_in(text, 0..10_000), 4);
        assert_eq!(count_words_in(text, 50..60), 0);
        // 문자 경계가 아닌 범위
        assert_eq!(count_words_in("héllo wörld", 2..13), 2);
    }

    #[test]
    fn test_closure_prompter() {
        let prompter = |prompt: &str| prompt.contains("Overwrite");
        assert!(prompter.confirm("Overwrite saved context?"));
        assert!(!prompter.confirm("Replace live context?"));
        assert!(AssumeYes.confirm("anything"));
    }
}
