//! Event System - 이벤트 발행/구독 시스템
//!
//! 컨텍스트 항목 변경과 모델/Backend 변경을 구독자에게 알립니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      EventBus                         │
//! │   publish(event) ── 동기 전달, 등록 순서대로          │
//! │         │                                             │
//! │         ▼                                             │
//! │  ┌───────────────┐  ┌───────────────┐                │
//! │  │ CostCache     │  │ Listener N    │                │
//! │  │ (재계산)       │  │ (UI 등)        │                │
//! │  └───────────────┘  └───────────────┘                │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용법
//!
//! ```ignore
//! use tally_foundation::event::{EventBus, EventListener, ContextEvent, context};
//!
//! struct MyListener;
//!
//! impl EventListener for MyListener {
//!     fn name(&self) -> &str { "my_listener" }
//!     fn on_event(&self, event: &ContextEvent) {
//!         println!("Received: {}", event.kind);
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let id = bus.subscribe(Arc::new(MyListener));
//! bus.publish(context::entry_added("/tmp/notes.md"));
//! bus.unsubscribe(id);
//! ```

pub mod bus;
pub mod types;

// Re-exports
pub use bus::{EventBus, EventBusConfig, EventListener, ListenerId};

pub use types::{
    // Event constructors
    context,
    selection,
    // Core types
    ContextEvent,
    EventId,
    EventKind,
};
