//! Registry - 모델 메타데이터 관리
//!
//! - `model/` - 모델 가격 레지스트리

pub mod model;

// Model
pub use model::{registry as model_registry, ModelInfo, ModelPricing, ModelRegistry, PricingLookup};
