//! Cost - 비용 추정과 컨텍스트 비용 캐시
//!
//! - `words.rs` - WordCounter (범위/파일/버퍼)
//! - `estimator.rs` - 비용 공식, CostEstimator
//! - `cache.rs` - ContextCostCache (이벤트 구독, 즉시 재계산)

mod cache;
mod estimator;
mod words;

pub use cache::ContextCostCache;
pub use estimator::{
    estimate, estimate_output, estimate_total, format_cost, CostBreakdown, CostEstimator,
};
pub use words::WordCounter;
