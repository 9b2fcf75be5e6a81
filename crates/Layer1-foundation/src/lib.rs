//! # tally-foundation
//!
//! Foundation layer for Tally:
//! - Error: 중앙 에러 타입
//! - Config: 통합 설정 (TallyConfig, CostConfig, PersistenceConfig)
//! - Registry: 모델 가격 레지스트리 (PricingLookup)
//! - Event: 컨텍스트/모델 변경 이벤트 버스
//! - Storage: JsonStore (설정 파일)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  tally-core (Session)                                   │
//! │   ├── ContextEntrySet ──publish──┐                      │
//! │   └── ModelSelection  ──publish──┤                      │
//! │                                  ▼                      │
//! │                  EventBus (동기 전달)                    │
//! │                                  │                      │
//! │                                  ▼                      │
//! │        ContextCostCache ── PricingLookup (ModelRegistry)│
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    CostConfig, PersistenceConfig, TallyConfig, DEFAULT_BACKEND, DEFAULT_MODEL,
    DEFAULT_OUTPUT_TOKENS, DEFAULT_PROPERTY_KEY, DEFAULT_TOKENS_PER_WORD, DEFAULT_VARIABLE_NAME,
    TALLY_CONFIG_FILE,
};

// ============================================================================
// Registry (레지스트리)
// ============================================================================
pub use registry::{model_registry, ModelInfo, ModelPricing, ModelRegistry, PricingLookup};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;

// ============================================================================
// Event (이벤트 시스템)
// ============================================================================
pub use event::{
    ContextEvent, EventBus, EventBusConfig, EventId, EventKind, EventListener, ListenerId,
};
