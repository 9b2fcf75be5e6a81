//! # Context File Registry
//!
//! 컨텍스트 파일 항목을 크기순으로 보여주고, 플래그를 표시한 항목을 한 번에 제거합니다.
//!
//! ## 상태
//!
//! ```text
//! refresh() ──► rows (크기 내림차순, 플래그 모두 false)
//!                 │
//!        toggle / flag_all / unflag_all   (ContextEntrySet 변경 없음)
//!                 │
//!                 ▼
//!        commit_removal() ──► 플래그된 항목 제거 ──► refresh()
//! ```
//!
//! 플래그는 뷰 객체에만 존재하며 refresh마다 초기화됩니다.
//! 버퍼 항목은 크기가 없으므로 목록에 포함되지 않습니다.

mod view;

pub use view::{ContextFileRegistry, DisplayRow};
