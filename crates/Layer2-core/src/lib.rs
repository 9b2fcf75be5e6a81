//! tally-core: Cost cache and context registry engine
//!
//! Layer2 - 비용 추정, 컨텍스트 저장/복원, 컨텍스트 파일 목록
//!
//! # 주요 모듈
//!
//! - `host`: 문서 호스트 인터페이스 (`DocumentHost`, `Prompter`, `MemoryHost`)
//! - `context`: 컨텍스트 항목 집합과 모델/Backend 선택 (변경 시 이벤트 발행)
//! - `cost`: WordCounter, CostEstimator, ContextCostCache
//! - `persist`: 문서 종류별 컨텍스트 저장 (property drawer, local variables)
//! - `registry`: 크기순 컨텍스트 파일 목록과 플래그 기반 일괄 제거
//! - `session`: 위 기능을 묶은 문서 세션
//!
//! # 사용 예시
//!
//! ```ignore
//! use tally_core::{Session, MemoryHost, DocumentKind, AssumeYes};
//! use tally_foundation::TallyConfig;
//!
//! let host = Arc::new(MemoryHost::new(DocumentKind::LocalVariable));
//! let session = Session::with_config(host, Arc::new(AssumeYes), &TallyConfig::load()?)?;
//!
//! session.add_file("/src/main.rs");
//! println!("context: {:?}", session.cached_context_cost());
//! println!("total:   {:?}", session.total_cost(None));
//!
//! session.save_context()?;
//! ```

pub mod context;
pub mod cost;
pub mod host;
pub mod persist;
pub mod registry;
pub mod session;

// Re-exports: Host
pub use host::{count_words, AssumeYes, DocumentHost, DocumentKind, MemoryHost, Prompter, ScratchText};

// Re-exports: Context
pub use context::{BufferId, ContextEntry, ContextEntrySet, ModelSelection};

// Re-exports: Cost
pub use cost::{
    estimate, estimate_output, estimate_total, format_cost, ContextCostCache, CostBreakdown,
    CostEstimator, WordCounter,
};

// Re-exports: Persistence
pub use persist::{
    ContextCodec, ContextPersistenceStore, LocalVariableCodec, PropertyCodec, RestoreOutcome,
};

// Re-exports: Registry
pub use registry::{ContextFileRegistry, DisplayRow};

// Re-exports: Session
pub use session::Session;
