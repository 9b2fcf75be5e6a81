//! Config - 통합 설정 관리
//!
//! - `tally.rs` - TallyConfig 통합 설정 (비용 추정, 가격 override, 저장 키)

mod tally;

pub use tally::{
    CostConfig, PersistenceConfig, TallyConfig, DEFAULT_BACKEND, DEFAULT_MODEL,
    DEFAULT_OUTPUT_TOKENS, DEFAULT_PROPERTY_KEY, DEFAULT_TOKENS_PER_WORD, DEFAULT_VARIABLE_NAME,
    TALLY_CONFIG_FILE,
};
