//! Registry View - 크기순 목록 + 플래그 상태

use crate::context::ContextEntrySet;
use crate::host::DocumentHost;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tally_foundation::{Error, Result};
use tracing::{debug, info, warn};

// ============================================================================
// DisplayRow
// ============================================================================

/// 목록의 한 줄 (읽기 전용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    /// 전체 경로 (식별/제거에 사용)
    pub path: PathBuf,

    /// 표시용 경로 (홈 디렉토리는 `~`)
    pub display_path: String,

    /// 파일 크기 (bytes)
    pub size: u64,

    /// 제거 플래그
    pub flagged: bool,
}

#[derive(Debug, Clone)]
struct Row {
    path: PathBuf,
    size: u64,
}

// ============================================================================
// ContextFileRegistry
// ============================================================================

/// 컨텍스트 파일 목록 뷰
#[derive(Debug, Clone)]
pub struct ContextFileRegistry {
    rows: Vec<Row>,
    flags: HashMap<PathBuf, bool>,
    home: Option<PathBuf>,
}

impl Default for ContextFileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextFileRegistry {
    /// 사용자 홈 디렉토리 기준으로 생성
    pub fn new() -> Self {
        Self::with_home(dirs::home_dir())
    }

    /// 홈 디렉토리 지정 (None이면 축약 안 함)
    pub fn with_home(home: Option<PathBuf>) -> Self {
        Self {
            rows: Vec::new(),
            flags: HashMap::new(),
            home,
        }
    }

    /// 목록 재구성 - 모든 플래그 초기화
    ///
    /// 크기를 알 수 없는 파일은 0으로 표시되어 제거는 여전히 가능합니다.
    pub fn refresh(&mut self, entries: &ContextEntrySet, host: &dyn DocumentHost) {
        let mut rows: Vec<Row> = entries
            .file_paths()
            .into_iter()
            .map(|path| {
                let size = host.file_size(&path).unwrap_or_else(|e| {
                    warn!(path = %path.display(), error = %e, "Cannot read file size");
                    0
                });
                Row { path, size }
            })
            .collect();

        // stable sort: 같은 크기는 원래 순서 유지
        rows.sort_by(|a, b| b.size.cmp(&a.size));

        self.flags = rows.iter().map(|r| (r.path.clone(), false)).collect();
        self.rows = rows;
        debug!(rows = self.rows.len(), "Registry view rebuilt");
    }

    /// 현재 목록
    pub fn rows(&self) -> Vec<DisplayRow> {
        self.rows
            .iter()
            .map(|r| DisplayRow {
                path: r.path.clone(),
                display_path: self.display_path(&r.path),
                size: r.size,
                flagged: self.is_flagged(&r.path),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_flagged(&self, path: &Path) -> bool {
        self.flags.get(path).copied().unwrap_or(false)
    }

    /// 행 번호(0부터)의 플래그 반전, 새 플래그 값 반환
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let path = self
            .rows
            .get(index)
            .map(|r| r.path.clone())
            .ok_or_else(|| {
                Error::InvalidInput(format!("row {} out of range (0..{})", index, self.rows.len()))
            })?;
        self.toggle_path(&path)
    }

    /// 경로로 플래그 반전
    pub fn toggle_path(&mut self, path: &Path) -> Result<bool> {
        let flag = self
            .flags
            .get_mut(path)
            .ok_or_else(|| Error::NotFound(path.display().to_string()))?;
        *flag = !*flag;
        Ok(*flag)
    }

    pub fn flag_all(&mut self) {
        self.flags.values_mut().for_each(|f| *f = true);
    }

    pub fn unflag_all(&mut self) {
        self.flags.values_mut().for_each(|f| *f = false);
    }

    pub fn flagged_count(&self) -> usize {
        self.flags.values().filter(|f| **f).count()
    }

    /// 플래그된 경로 (목록 순서)
    pub fn flagged_paths(&self) -> Vec<PathBuf> {
        self.rows
            .iter()
            .filter(|r| self.is_flagged(&r.path))
            .map(|r| r.path.clone())
            .collect()
    }

    /// 플래그된 항목을 라이브 컨텍스트에서 제거, 실제 제거된 경로 반환
    ///
    /// 플래그가 하나도 없으면 아무것도 바꾸지 않고 빈 목록을 반환합니다.
    /// 이미 없는 항목은 건너뜁니다. 끝나면 목록을 다시 구성합니다.
    pub fn commit_removal(
        &mut self,
        entries: &ContextEntrySet,
        host: &dyn DocumentHost,
    ) -> Vec<PathBuf> {
        let flagged = self.flagged_paths();
        if flagged.is_empty() {
            info!("Nothing flagged for removal");
            return Vec::new();
        }

        let removed: Vec<PathBuf> = flagged
            .into_iter()
            .filter(|path| entries.remove_file(path))
            .collect();

        info!(removed = removed.len(), "Removed flagged context files");
        self.refresh(entries, host);
        removed
    }

    /// 표시용 경로
    pub fn display_path(&self, path: &Path) -> String {
        if let Some(rest) = self.home.as_deref().and_then(|h| path.strip_prefix(h).ok()) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
        path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BufferId;
    use crate::host::{DocumentKind, MemoryHost};
    use std::sync::Arc;
    use tally_foundation::EventBus;

    fn setup() -> (MemoryHost, ContextEntrySet, ContextFileRegistry) {
        let host = MemoryHost::new(DocumentKind::Other);
        host.insert_file_sized("/home/me/small.rs", "a", 10);
        host.insert_file_sized("/home/me/big.rs", "b", 3000);
        host.insert_file_sized("/tmp/mid-1.rs", "c", 200);
        host.insert_file_sized("/tmp/mid-2.rs", "d", 200);

        let entries = ContextEntrySet::new(Arc::new(EventBus::new()));
        entries.add_file("/home/me/small.rs");
        entries.add_file("/tmp/mid-1.rs");
        entries.add_buffer(BufferId::new("notes"));
        entries.add_file("/home/me/big.rs");
        entries.add_file("/tmp/mid-2.rs");

        let mut registry = ContextFileRegistry::with_home(Some(PathBuf::from("/home/me")));
        registry.refresh(&entries, &host);
        (host, entries, registry)
    }

    fn paths(rows: &[DisplayRow]) -> Vec<&str> {
        rows.iter().map(|r| r.display_path.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_size_stable() {
        let (_host, _entries, registry) = setup();
        let rows = registry.rows();

        assert_eq!(
            paths(&rows),
            vec!["~/big.rs", "/tmp/mid-1.rs", "/tmp/mid-2.rs", "~/small.rs"]
        );
        assert_eq!(rows[0].path, PathBuf::from("/home/me/big.rs"));
        assert!(rows.iter().all(|r| !r.flagged));
    }

    #[test]
    fn test_toggle_does_not_mutate_context() {
        let (_host, entries, mut registry) = setup();

        assert!(registry.toggle(0).unwrap());
        assert!(!registry.toggle(0).unwrap());
        assert!(registry.toggle(1).unwrap());
        assert_eq!(registry.flagged_count(), 1);
        assert_eq!(entries.len(), 5);

        assert!(matches!(registry.toggle(9), Err(Error::InvalidInput(_))));
        assert!(matches!(
            registry.toggle_path(Path::new("/nope")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_commit_removes_exactly_flagged() {
        let (host, entries, mut registry) = setup();
        registry.toggle_path(Path::new("/home/me/big.rs")).unwrap();
        registry.toggle_path(Path::new("/tmp/mid-2.rs")).unwrap();

        let removed = registry.commit_removal(&entries, &host);
        assert_eq!(
            removed,
            vec![PathBuf::from("/home/me/big.rs"), PathBuf::from("/tmp/mid-2.rs")]
        );
        assert_eq!(
            entries.file_paths(),
            vec![PathBuf::from("/home/me/small.rs"), PathBuf::from("/tmp/mid-1.rs")]
        );
        // 버퍼는 그대로
        assert_eq!(entries.len(), 3);
        // 재구성 후 플래그 초기화
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.flagged_count(), 0);
    }

    #[test]
    fn test_commit_nothing_flagged() {
        let (host, entries, mut registry) = setup();
        assert!(registry.commit_removal(&entries, &host).is_empty());
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn test_commit_skips_already_removed() {
        let (host, entries, mut registry) = setup();
        registry.flag_all();
        entries.remove_file(Path::new("/tmp/mid-1.rs"));

        let removed = registry.commit_removal(&entries, &host);
        assert_eq!(removed.len(), 3);
        assert_eq!(entries.file_paths(), Vec::<PathBuf>::new());
    }

    #[test]
    fn test_refresh_resets_flags() {
        let (host, entries, mut registry) = setup();
        registry.flag_all();
        assert_eq!(registry.flagged_count(), 4);

        registry.refresh(&entries, &host);
        assert_eq!(registry.flagged_count(), 0);

        registry.flag_all();
        registry.unflag_all();
        assert!(registry.flagged_paths().is_empty());
    }

    #[test]
    fn test_unsizable_file_listed_with_zero() {
        let (host, entries, mut registry) = setup();
        host.remove_file(Path::new("/tmp/mid-1.rs"));
        registry.refresh(&entries, &host);

        let last = registry.rows().pop().unwrap();
        assert_eq!(last.path, PathBuf::from("/tmp/mid-1.rs"));
        assert_eq!(last.size, 0);
    }

    #[test]
    fn test_display_path_without_home() {
        let registry = ContextFileRegistry::with_home(None);
        assert_eq!(registry.display_path(Path::new("/home/me/a.rs")), "/home/me/a.rs");

        let registry = ContextFileRegistry::with_home(Some(PathBuf::from("/home/me")));
        assert_eq!(registry.display_path(Path::new("/home/me")), "~");
        assert_eq!(registry.display_path(Path::new("/home/meow/a")), "/home/meow/a");
    }
}
