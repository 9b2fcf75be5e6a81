//! In-memory Document Host
//!
//! 파일시스템 없이 세션을 구동할 때 사용합니다 (임베딩, 테스트).
//! 열린 임시 내용 수를 추적하므로 해제 누락을 확인할 수 있습니다.

use super::{count_words_in, DocumentHost, DocumentKind, ScratchText};
use crate::context::BufferId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tally_foundation::{Error, Result};

#[derive(Debug, Clone)]
struct MemoryFile {
    text: String,
    size: u64,
    binary: bool,
}

/// 메모리 기반 문서 호스트
#[derive(Debug)]
pub struct MemoryHost {
    kind: DocumentKind,
    document: Mutex<String>,
    files: RwLock<HashMap<PathBuf, MemoryFile>>,
    buffers: RwLock<HashMap<BufferId, String>>,
    open_scratches: AtomicUsize,
    scratch_opened: AtomicUsize,
}

impl MemoryHost {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            document: Mutex::new(String::new()),
            files: RwLock::new(HashMap::new()),
            buffers: RwLock::new(HashMap::new()),
            open_scratches: AtomicUsize::new(0),
            scratch_opened: AtomicUsize::new(0),
        }
    }

    pub fn with_document(self, text: impl Into<String>) -> Self {
        *self.document.lock() = text.into();
        self
    }

    pub fn with_file(self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.insert_file(path, text);
        self
    }

    /// 파일 등록 (크기 = 텍스트 바이트 수)
    pub fn insert_file(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        let text = text.into();
        let size = text.len() as u64;
        self.insert_file_sized(path, text, size);
    }

    /// 파일 등록 (크기 지정)
    pub fn insert_file_sized(&self, path: impl Into<PathBuf>, text: impl Into<String>, size: u64) {
        self.files.write().insert(
            path.into(),
            MemoryFile {
                text: text.into(),
                size,
                binary: false,
            },
        );
    }

    /// 바이너리 파일 등록
    pub fn insert_binary(&self, path: impl Into<PathBuf>, size: u64) {
        self.files.write().insert(
            path.into(),
            MemoryFile {
                text: String::new(),
                size,
                binary: true,
            },
        );
    }

    pub fn remove_file(&self, path: &Path) {
        self.files.write().remove(path);
    }

    pub fn set_buffer(&self, handle: BufferId, text: impl Into<String>) {
        self.buffers.write().insert(handle, text.into());
    }

    pub fn close_buffer(&self, handle: &BufferId) {
        self.buffers.write().remove(handle);
    }

    pub fn set_document(&self, text: impl Into<String>) {
        *self.document.lock() = text.into();
    }

    /// 현재 열려있는 임시 내용 수 (0이어야 정상)
    pub fn open_scratch_count(&self) -> usize {
        self.open_scratches.load(Ordering::SeqCst)
    }

    /// 지금까지 연 임시 내용 수
    pub fn scratch_opened_total(&self) -> usize {
        self.scratch_opened.load(Ordering::SeqCst)
    }
}

struct MemoryScratch<'a> {
    text: String,
    open: &'a AtomicUsize,
}

impl ScratchText for MemoryScratch<'_> {
    fn text(&self) -> &str {
        &self.text
    }
}

impl Drop for MemoryScratch<'_> {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DocumentHost for MemoryHost {
    fn count_words_in_range(&self, range: Range<usize>) -> usize {
        count_words_in(&self.document.lock(), range)
    }

    fn document_len(&self) -> usize {
        self.document.lock().len()
    }

    fn is_binary(&self, path: &Path) -> bool {
        self.files
            .read()
            .get(path)
            .map(|f| f.binary)
            .unwrap_or(false)
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        self.files
            .read()
            .get(path)
            .map(|f| f.size)
            .ok_or_else(|| Error::NotFound(path.display().to_string()))
    }

    fn open_scratch(&self, path: &Path) -> Result<Box<dyn ScratchText + '_>> {
        let text = self
            .files
            .read()
            .get(path)
            .map(|f| f.text.clone())
            .ok_or_else(|| Error::NotFound(path.display().to_string()))?;

        self.open_scratches.fetch_add(1, Ordering::SeqCst);
        self.scratch_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryScratch {
            text,
            open: &self.open_scratches,
        }))
    }

    fn buffer_text(&self, buffer: &BufferId) -> Option<String> {
        self.buffers.read().get(buffer).cloned()
    }

    fn document_kind(&self) -> DocumentKind {
        self.kind
    }

    fn document_text(&self) -> Result<String> {
        Ok(self.document.lock().clone())
    }

    fn write_document_text(&self, text: &str) -> Result<()> {
        *self.document.lock() = text.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_released_on_drop() {
        let host = MemoryHost::new(DocumentKind::Other).with_file("/a.txt", "one two");

        {
            let scratch = host.open_scratch(Path::new("/a.txt")).unwrap();
            assert_eq!(scratch.text(), "one two");
            assert_eq!(host.open_scratch_count(), 1);
        }

        assert_eq!(host.open_scratch_count(), 0);
        assert_eq!(host.scratch_opened_total(), 1);
    }

    #[test]
    fn test_missing_file() {
        let host = MemoryHost::new(DocumentKind::Other);
        assert!(matches!(
            host.file_size(Path::new("/nope")),
            Err(Error::NotFound(_))
        ));
        assert!(host.open_scratch(Path::new("/nope")).is_err());
        assert_eq!(host.open_scratch_count(), 0);
    }

    #[test]
    fn test_document_roundtrip() {
        let host = MemoryHost::new(DocumentKind::LocalVariable).with_document("hello world");
        assert_eq!(host.count_words_in_range(0..host.document_len()), 2);

        host.write_document_text("replaced").unwrap();
        assert_eq!(host.document_text().unwrap(), "replaced");
    }
}
