//! Event Types - 컨텍스트/모델 변경 이벤트 정의
//!
//! 비용 캐시를 무효화해야 하는 모든 변경이 여기 정의된 이벤트로 발행됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Event ID
// ============================================================================

/// 이벤트 고유 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// 새 이벤트 ID 생성
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Event Kind
// ============================================================================

/// 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// 컨텍스트 항목 추가
    EntryAdded,
    /// 컨텍스트 항목 제거
    EntryRemoved,
    /// 컨텍스트 전체 제거
    EntriesCleared,
    /// 활성 모델 변경
    ModelChanged,
    /// 활성 Backend 변경
    BackendChanged,
}

impl EventKind {
    /// 종류 문자열 반환
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryAdded => "context.entry_added",
            Self::EntryRemoved => "context.entry_removed",
            Self::EntriesCleared => "context.cleared",
            Self::ModelChanged => "selection.model_changed",
            Self::BackendChanged => "selection.backend_changed",
        }
    }

    /// 컨텍스트 항목 집합이 바뀌는 이벤트인지
    pub fn is_context_mutation(&self) -> bool {
        matches!(
            self,
            Self::EntryAdded | Self::EntryRemoved | Self::EntriesCleared
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ContextEvent - 핵심 이벤트 타입
// ============================================================================

/// 컨텍스트/선택 변경 이벤트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEvent {
    /// 이벤트 ID
    pub id: EventId,

    /// 이벤트 종류
    pub kind: EventKind,

    /// 이벤트 발생 시간
    pub timestamp: DateTime<Utc>,

    /// 이벤트 소스 (모듈)
    pub source: String,

    /// 이벤트 데이터
    pub data: Value,
}

impl ContextEvent {
    /// 새 이벤트 생성
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            kind,
            timestamp: Utc::now(),
            source: String::new(),
            data: Value::Null,
        }
    }

    /// 소스 설정
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// 데이터 설정
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

// ============================================================================
// 사전 정의된 이벤트들
// ============================================================================

/// 컨텍스트 항목 이벤트
pub mod context {
    use super::*;

    /// 항목 추가 이벤트
    pub fn entry_added(identity: &str) -> ContextEvent {
        ContextEvent::new(EventKind::EntryAdded)
            .with_source("context")
            .with_data(serde_json::json!({ "entry": identity }))
    }

    /// 항목 제거 이벤트
    pub fn entry_removed(identity: &str) -> ContextEvent {
        ContextEvent::new(EventKind::EntryRemoved)
            .with_source("context")
            .with_data(serde_json::json!({ "entry": identity }))
    }

    /// 전체 제거 이벤트
    pub fn cleared(count: usize) -> ContextEvent {
        ContextEvent::new(EventKind::EntriesCleared)
            .with_source("context")
            .with_data(serde_json::json!({ "removed": count }))
    }
}

/// 모델/Backend 선택 이벤트
pub mod selection {
    use super::*;

    /// 모델 변경 이벤트
    pub fn model_changed(previous: &str, current: &str) -> ContextEvent {
        ContextEvent::new(EventKind::ModelChanged)
            .with_source("selection")
            .with_data(serde_json::json!({ "from": previous, "to": current }))
    }

    /// Backend 변경 이벤트
    pub fn backend_changed(previous: &str, current: &str) -> ContextEvent {
        ContextEvent::new(EventKind::BackendChanged)
            .with_source("selection")
            .with_data(serde_json::json!({ "from": previous, "to": current }))
    }
}

// ============================================================================
// 테스트
// ============================================================================
