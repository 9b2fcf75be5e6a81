//! Filesystem Document Host
//!
//! 문서 파일 하나를 세션 문서로 사용합니다. 문서 본문은 열 때 읽어 메모리에 두고,
//! 컨텍스트 저장 시에만 디스크에 씁니다.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tally_core::host::count_words_in;
use tally_core::{BufferId, DocumentHost, DocumentKind, ScratchText};
use tally_foundation::{Error, Result};
use tracing::{debug, trace};

/// 바이너리 판별 시 읽는 앞부분 크기
const SNIFF_LEN: u64 = 8 * 1024;

/// 확장자만으로 바이너리로 보는 파일
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", // 이미지
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", // 문서
    "zip", "tar", "gz", "rar", "7z", // 압축
    "exe", "dll", "so", "dylib", // 실행
    "mp3", "mp4", "avi", "mov", "mkv", // 미디어
    "woff", "woff2", "ttf", "otf", // 폰트
];

/// 파일시스템 기반 문서 호스트
pub struct FsHost {
    document: PathBuf,
    kind: DocumentKind,
    text: RwLock<String>,
    buffers: RwLock<HashMap<BufferId, String>>,
}

impl FsHost {
    /// 문서 열기 (없는 파일은 빈 문서)
    pub fn open(document: impl Into<PathBuf>) -> Result<Self> {
        let document = document.into();
        let text = match fs::read_to_string(&document) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        let kind = DocumentKind::from_path(&document);
        debug!(path = %document.display(), %kind, bytes = text.len(), "Document opened");

        Ok(Self {
            document,
            kind,
            text: RwLock::new(text),
            buffers: RwLock::new(HashMap::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.document
    }

    /// 이름 붙은 임시 버퍼 등록
    pub fn set_buffer(&self, handle: BufferId, text: impl Into<String>) {
        self.buffers.write().insert(handle, text.into());
    }

    pub fn close_buffer(&self, handle: &BufferId) -> bool {
        self.buffers.write().remove(handle).is_some()
    }

    fn sniff_binary(path: &Path) -> io::Result<bool> {
        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        fs::File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
        Ok(head.contains(&0))
    }
}

/// 단어 수 계산용으로 읽은 파일 내용
struct FileScratch {
    text: String,
}

impl ScratchText for FileScratch {
    fn text(&self) -> &str {
        &self.text
    }
}

impl DocumentHost for FsHost {
    fn count_words_in_range(&self, range: Range<usize>) -> usize {
        count_words_in(&self.text.read(), range)
    }

    fn document_len(&self) -> usize {
        self.text.read().len()
    }

    fn is_binary(&self, path: &Path) -> bool {
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| BINARY_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);

        // 읽을 수 없는 파일은 여기서 판단하지 않음 (열 때 에러)
        by_extension || Self::sniff_binary(path).unwrap_or(false)
    }

    fn file_size(&self, path: &Path) -> Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn open_scratch(&self, path: &Path) -> Result<Box<dyn ScratchText + '_>> {
        let bytes = fs::read(path)?;
        trace!(path = %path.display(), bytes = bytes.len(), "Scratch opened");
        Ok(Box::new(FileScratch {
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }))
    }

    fn buffer_text(&self, buffer: &BufferId) -> Option<String> {
        self.buffers.read().get(buffer).cloned()
    }

    fn document_kind(&self) -> DocumentKind {
        self.kind
    }

    fn document_text(&self) -> Result<String> {
        Ok(self.text.read().clone())
    }

    fn write_document_text(&self, text: &str) -> Result<()> {
        fs::write(&self.document, text)?;
        *self.text.write() = text.to_string();
        debug!(path = %self.document.display(), bytes = text.len(), "Document written");
        Ok(())
    }
}

/// 절대 경로로 변환 (존재하면 canonicalize)
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(path) {
        return Ok(canonical);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| Error::Internal(format!("cannot resolve {}: {}", path.display(), e)))?;
    Ok(cwd.join(path))
}
