//! Property drawer 인코딩 (org 스타일 문서)
//!
//! ```text
//! :PROPERTIES:
//! :TALLY_CONTEXT: ["/a/b.rs"]
//! :END:
//! ```
//!
//! 문서의 첫 번째 비어있지 않은 줄이 `:PROPERTIES:`이면 그 drawer를 수정하고,
//! 아니면 맨 위에 새 drawer를 추가합니다.

use super::{line_ending, ContextCodec};
use crate::host::DocumentKind;

const DRAWER_START: &str = ":PROPERTIES:";
const DRAWER_END: &str = ":END:";

/// Property drawer codec
#[derive(Debug, Clone)]
pub struct PropertyCodec {
    key: String,
}

impl PropertyCodec {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 맨 위 drawer의 (시작 줄, `:END:` 줄)
    fn drawer_bounds(lines: &[&str]) -> Option<(usize, usize)> {
        let start = lines.iter().position(|l| !l.trim().is_empty())?;
        if !lines[start].trim().eq_ignore_ascii_case(DRAWER_START) {
            return None;
        }
        let offset = lines[start + 1..]
            .iter()
            .position(|l| l.trim().eq_ignore_ascii_case(DRAWER_END))?;
        Some((start, start + 1 + offset))
    }

    /// `:KEY: value` 줄이면 value
    fn value_of<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.trim().strip_prefix(':')?;
        let (key, value) = rest.split_once(':')?;
        key.eq_ignore_ascii_case(&self.key).then(|| value.trim())
    }

    fn property_line(&self, blob: &str) -> String {
        format!(":{}: {}", self.key, blob)
    }
}

impl ContextCodec for PropertyCodec {
    fn kind(&self) -> DocumentKind {
        DocumentKind::StructuredProperty
    }

    fn read_raw(&self, text: &str) -> Option<String> {
        let lines: Vec<&str> = text.lines().collect();
        let (start, end) = Self::drawer_bounds(&lines)?;
        lines[start + 1..end]
            .iter()
            .find_map(|l| self.value_of(l))
            .map(str::to_string)
    }

    fn write(&self, text: &str, blob: &str) -> String {
        let eol = line_ending(text);
        let property = self.property_line(blob);

        // 줄마다 원래 줄바꿈을 그대로 유지
        let full: Vec<&str> = text.split_inclusive('\n').collect();
        let lines: Vec<&str> = full.iter().copied().map(strip_eol).collect();

        let Some((start, end)) = Self::drawer_bounds(&lines) else {
            return format!(
                "{}{eol}{}{eol}{}{eol}{}",
                DRAWER_START,
                property,
                DRAWER_END,
                text,
                eol = eol
            );
        };

        let mut out = String::with_capacity(text.len() + property.len() + eol.len());
        let mut written = false;
        for (i, (full, line)) in full.iter().zip(lines.iter()).enumerate() {
            let in_drawer = i > start && i < end;
            if in_drawer && self.value_of(line).is_some() {
                // 중복 키는 첫 줄만 남김
                if !written {
                    out.push_str(&property);
                    out.push_str(&full[line.len()..]);
                    written = true;
                }
                continue;
            }
            if i == end && !written {
                out.push_str(&property);
                out.push_str(eol);
                written = true;
            }
            out.push_str(full);
        }
        out
    }
}

/// `\n` 또는 `\r\n` 제거
fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
