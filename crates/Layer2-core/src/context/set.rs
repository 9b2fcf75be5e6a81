//! Context Entry Set - 세션의 살아있는 컨텍스트 목록
//!
//! 집합 의미(중복 없음) + 삽입 순서 유지.
//! 실제로 내용이 바뀐 변경마다 이벤트를 정확히 하나 발행합니다.
//! 중복 추가나 없는 항목 제거는 아무 이벤트도 발행하지 않습니다.

use super::entry::{BufferId, ContextEntry};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_foundation::event::{context, EventBus};
use tracing::debug;

/// 컨텍스트 항목 집합
pub struct ContextEntrySet {
    entries: RwLock<Vec<ContextEntry>>,
    bus: Arc<EventBus>,
}

impl ContextEntrySet {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            bus,
        }
    }

    /// 항목 추가 (이미 있으면 false)
    pub fn add(&self, entry: ContextEntry) -> bool {
        {
            let mut entries = self.entries.write();
            if entries.contains(&entry) {
                return false;
            }
            entries.push(entry.clone());
        }

        debug!(entry = %entry.identity(), "Context entry added");
        self.bus.publish(context::entry_added(&entry.identity()));
        true
    }

    /// 파일 항목 추가
    pub fn add_file(&self, path: impl Into<PathBuf>) -> bool {
        self.add(ContextEntry::file(path))
    }

    /// 버퍼 항목 추가
    pub fn add_buffer(&self, handle: BufferId) -> bool {
        self.add(ContextEntry::buffer(handle))
    }

    /// 항목 제거 (없으면 false, 에러 아님)
    pub fn remove(&self, entry: &ContextEntry) -> bool {
        {
            let mut entries = self.entries.write();
            let Some(pos) = entries.iter().position(|e| e == entry) else {
                return false;
            };
            entries.remove(pos);
        }

        debug!(entry = %entry.identity(), "Context entry removed");
        self.bus.publish(context::entry_removed(&entry.identity()));
        true
    }

    /// 파일 항목 제거
    pub fn remove_file(&self, path: &Path) -> bool {
        self.remove(&ContextEntry::file(path))
    }

    /// 전체 제거, 제거된 개수 반환
    pub fn remove_all(&self) -> usize {
        let removed = {
            let mut entries = self.entries.write();
            let count = entries.len();
            entries.clear();
            count
        };

        if removed > 0 {
            debug!(removed, "Context cleared");
            self.bus.publish(context::cleared(removed));
        }
        removed
    }

    pub fn contains(&self, entry: &ContextEntry) -> bool {
        self.entries.read().contains(entry)
    }

    /// 현재 항목 스냅샷 (삽입 순서)
    pub fn snapshot(&self) -> Vec<ContextEntry> {
        self.entries.read().clone()
    }

    /// 파일 항목 경로만 (삽입 순서)
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.entries
            .read()
            .iter()
            .filter_map(|e| e.as_file().map(Path::to_path_buf))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
