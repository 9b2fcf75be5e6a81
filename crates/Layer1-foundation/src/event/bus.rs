//! Event Bus - 동기 이벤트 브로드캐스트
//!
//! `publish`는 모든 리스너가 처리를 끝낸 뒤에 반환합니다.
//! 이벤트는 발행 순서대로, 리스너는 등록 순서대로 처리됩니다.

use super::types::{ContextEvent, EventKind};
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

// ============================================================================
// EventListener Trait
// ============================================================================

/// 이벤트 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 이벤트 리스너 trait
pub trait EventListener: Send + Sync {
    /// 리스너 이름 (디버깅용)
    fn name(&self) -> &str;

    /// 관심 있는 이벤트 종류 (None이면 모든 이벤트)
    fn kinds(&self) -> Option<Vec<EventKind>> {
        None
    }

    /// 이벤트 처리
    fn on_event(&self, event: &ContextEvent);
}

// ============================================================================
// EventBus
// ============================================================================

/// 이벤트 버스 설정
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// 이벤트 히스토리 보관 개수
    pub history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { history_size: 100 }
    }
}

/// 이벤트 버스
///
/// ```ignore
/// let bus = EventBus::new();
/// let id = bus.subscribe(cache.clone());
/// bus.publish(context::entry_added("/tmp/a.rs"));
/// bus.unsubscribe(id);
/// ```
pub struct EventBus {
    config: EventBusConfig,

    /// 등록된 리스너 (등록 순서 유지)
    listeners: RwLock<Vec<(ListenerId, Arc<dyn EventListener>)>>,

    listener_counter: AtomicU64,

    history: Mutex<VecDeque<ContextEvent>>,

    /// 발행된 이벤트 수
    event_count: AtomicU64,
}

impl EventBus {
    /// 기본 설정으로 이벤트 버스 생성
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// 커스텀 설정으로 이벤트 버스 생성
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            config,
            listeners: RwLock::new(Vec::new()),
            listener_counter: AtomicU64::new(0),
            history: Mutex::new(VecDeque::new()),
            event_count: AtomicU64::new(0),
        }
    }

    /// 리스너 등록
    pub fn subscribe(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.listener_counter.fetch_add(1, Ordering::SeqCst));

        debug!(
            listener_name = listener.name(),
            listener_id = %id,
            "Registering event listener"
        );

        self.listeners.write().push((id, listener));
        id
    }

    /// 리스너 해제
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        let removed = listeners.len() != before;

        if removed {
            debug!(listener_id = %id, "Unregistered event listener");
        }

        removed
    }

    /// 이벤트 발행
    ///
    /// 리스너 목록을 복사한 뒤 락을 풀고 전달하므로, 리스너 안에서
    /// 다시 `publish`나 `subscribe`를 호출해도 교착되지 않습니다.
    pub fn publish(&self, event: ContextEvent) {
        let count = self.event_count.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(event_id = %event.id, kind = %event.kind, "Publishing event #{}", count);

        {
            let mut history = self.history.lock();
            history.push_back(event.clone());
            while history.len() > self.config.history_size {
                history.pop_front();
            }
        }

        let targets: Vec<(ListenerId, Arc<dyn EventListener>)> = self.listeners.read().clone();
        for (id, listener) in targets {
            let wanted = match listener.kinds() {
                Some(kinds) => kinds.contains(&event.kind),
                None => true,
            };

            if wanted {
                trace!(
                    listener_id = %id,
                    listener_name = listener.name(),
                    kind = %event.kind,
                    "Delivering event to listener"
                );
                listener.on_event(&event);
            }
        }
    }

    /// 최근 이벤트 히스토리 조회 (최신순)
    pub fn history(&self, limit: Option<usize>) -> Vec<ContextEvent> {
        let history = self.history.lock();
        let limit = limit.unwrap_or(history.len());
        history.iter().rev().take(limit).cloned().collect()
    }

    /// 등록된 리스너 수
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// 총 발행된 이벤트 수
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 테스트
// ============================================================================
