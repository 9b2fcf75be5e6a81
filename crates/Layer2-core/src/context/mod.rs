//! Context - 대화에 첨부된 항목과 활성 모델 선택
//!
//! - `entry.rs` - ContextEntry (파일/버퍼)
//! - `set.rs` - ContextEntrySet (변경 시 이벤트 발행)
//! - `selection.rs` - ModelSelection (모델/Backend 변경 이벤트)

mod entry;
mod selection;
mod set;

pub use entry::{BufferId, ContextEntry};
pub use selection::ModelSelection;
pub use set::ContextEntrySet;
