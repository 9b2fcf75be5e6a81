//! Word Counter - 범위/파일/버퍼 단어 수
//!
//! 바이너리 파일은 0으로 건너뜁니다 (에러 아님).
//! 파일 내용은 `ScratchText`로 열고 함수가 끝나면 항상 해제됩니다.

use crate::context::ContextEntry;
use crate::host::{count_words, DocumentHost};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tally_foundation::Result;
use tracing::{debug, trace};

/// 단어 수 계산기
#[derive(Clone)]
pub struct WordCounter {
    host: Arc<dyn DocumentHost>,
}

impl WordCounter {
    pub fn new(host: Arc<dyn DocumentHost>) -> Self {
        Self { host }
    }

    /// 현재 문서의 범위 단어 수
    pub fn count_range(&self, range: Range<usize>) -> usize {
        self.host.count_words_in_range(range)
    }

    /// 현재 문서 전체 단어 수
    pub fn count_document(&self) -> usize {
        self.count_range(0..self.host.document_len())
    }

    /// 파일 단어 수
    pub fn count_file(&self, path: &Path) -> Result<usize> {
        if self.host.is_binary(path) {
            debug!(path = %path.display(), "Skipping binary file");
            return Ok(0);
        }

        let scratch = self.host.open_scratch(path)?;
        let words = count_words(scratch.text());
        trace!(path = %path.display(), words, "Counted file");
        Ok(words)
    }

    /// 컨텍스트 항목 단어 수
    ///
    /// 닫힌 버퍼는 보낼 내용이 없으므로 0입니다.
    pub fn count_entry(&self, entry: &ContextEntry) -> Result<usize> {
        match entry {
            ContextEntry::File { path } => self.count_file(path),
            ContextEntry::Buffer { handle } => Ok(self
                .host
                .buffer_text(handle)
                .map(|text| count_words(&text))
                .unwrap_or(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BufferId;
    use crate::host::{DocumentKind, MemoryHost};

    fn setup() -> (Arc<MemoryHost>, WordCounter) {
        let host = Arc::new(
            MemoryHost::new(DocumentKind::Other)
                .with_document("ask the model something useful")
                .with_file("/src/a.rs", "fn a() {}\nfn b() {}"),
        );
        host.insert_binary("/img.png", 4096);
        let counter = WordCounter::new(host.clone());
        (host, counter)
    }

    #[test]
    fn test_count_file() {
        let (host, counter) = setup();
        assert_eq!(counter.count_file(Path::new("/src/a.rs")).unwrap(), 6);
        assert_eq!(host.open_scratch_count(), 0);
    }

    #[test]
    fn test_binary_contributes_zero() {
        let (host, counter) = setup();
        assert_eq!(counter.count_file(Path::new("/img.png")).unwrap(), 0);
        // 바이너리는 열지도 않음
        assert_eq!(host.scratch_opened_total(), 0);
    }

    #[test]
    fn test_missing_file_error_releases_nothing() {
        let (host, counter) = setup();
        assert!(counter.count_file(Path::new("/gone.rs")).is_err());
        assert_eq!(host.open_scratch_count(), 0);
    }

    #[test]
    fn test_count_buffer_entry() {
        let (host, counter) = setup();
        let handle = BufferId::new("notes");
        host.set_buffer(handle.clone(), "three little words");

        let entry = ContextEntry::buffer(handle.clone());
        assert_eq!(counter.count_entry(&entry).unwrap(), 3);

        host.close_buffer(&handle);
        assert_eq!(counter.count_entry(&entry).unwrap(), 0);
    }

    #[test]
    fn test_count_document() {
        let (_host, counter) = setup();
        assert_eq!(counter.count_document(), 5);
        assert_eq!(counter.count_range(0..7), 2);
    }
}
