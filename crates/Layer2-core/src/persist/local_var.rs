//! Local variables 인코딩 (markdown 스타일 문서)
//!
//! ```text
//! <!-- Local Variables: -->
//! <!-- tally-context: ["/a/b.rs"] -->
//! <!-- End: -->
//! ```
//!
//! 쓰기 전에 기존 섹션을 주변 빈 줄까지 모두 제거한 뒤, 문서 끝에 한 줄 띄우고 추가합니다.
//! 시작/끝 표시는 한 줄 전체일 때만 인식합니다. 문서의 줄바꿈(LF/CRLF)은 유지합니다.

use super::{line_ending, ContextCodec};
use crate::host::DocumentKind;
use regex::Regex;
use tally_foundation::{Error, Result};

const SECTION_START: &str = "<!-- Local Variables: -->";
const SECTION_END: &str = "<!-- End: -->";

/// Local variables codec
#[derive(Debug, Clone)]
pub struct LocalVariableCodec {
    name: String,
    section: Regex,
    variable: Regex,
}

impl LocalVariableCodec {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let section = Regex::new(&format!(
            r"(?ms)(?:\r?\n)*^{}[ \t]*\r?$.*?^{}[ \t]*\r?$(?:\r?\n)*",
            regex::escape(SECTION_START),
            regex::escape(SECTION_END)
        ))
        .map_err(|e| Error::Config(format!("local variables pattern: {}", e)))?;
        let variable = Regex::new(&format!(r"(?m)^<!-- {}: (.*) -->\s*$", regex::escape(&name)))
            .map_err(|e| Error::Config(format!("local variable name {:?}: {}", name, e)))?;

        Ok(Self {
            name,
            section,
            variable,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 문서 안의 local variables 섹션 수
    pub fn section_count(&self, text: &str) -> usize {
        self.section.find_iter(text).count()
    }

    /// 모든 섹션 제거
    fn strip_sections(&self, text: &str, eol: &str) -> String {
        self.section
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let at_start = caps.get(0).map(|m| m.start() == 0).unwrap_or(false);
                if at_start {
                    String::new()
                } else {
                    eol.repeat(2)
                }
            })
            .into_owned()
    }
}

impl ContextCodec for LocalVariableCodec {
    fn kind(&self) -> DocumentKind {
        DocumentKind::LocalVariable
    }

    fn read_raw(&self, text: &str) -> Option<String> {
        // 섹션이 여러 개면 마지막 것이 유효
        let section = self.section.find_iter(text).last()?;
        self.variable
            .captures(section.as_str())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }

    fn write(&self, text: &str, blob: &str) -> String {
        let eol = line_ending(text);
        let stripped = self.strip_sections(text, eol);
        let body = stripped.trim_end_matches(|c: char| c == '\r' || c == '\n');
        let section = format!(
            "{start}{eol}<!-- {}: {} -->{eol}{end}",
            self.name,
            blob,
            start = SECTION_START,
            end = SECTION_END,
            eol = eol
        );

        if body.is_empty() {
            format!("{}{}", section, eol)
        } else {
            format!("{}{eol}{eol}{}{eol}", body, section, eol = eol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> LocalVariableCodec {
        LocalVariableCodec::new("tally-context").unwrap()
    }

    #[test]
    fn test_append_section() {
        let out = codec().write("# Chat\n\nhello\n", r#"["/a.rs"]"#);
        assert_eq!(
            out,
            "# Chat\n\nhello\n\n<!-- Local Variables: -->\n<!-- tally-context: [\"/a.rs\"] -->\n<!-- End: -->\n"
        );
        assert_eq!(codec().read_raw(&out).as_deref(), Some(r#"["/a.rs"]"#));
    }

    #[test]
    fn test_empty_document() {
        let out = codec().write("", "[]");
        assert_eq!(
            out,
            "<!-- Local Variables: -->\n<!-- tally-context: [] -->\n<!-- End: -->\n"
        );
        assert_eq!(codec().read_raw(&out).as_deref(), Some("[]"));
    }

    #[test]
    fn test_write_twice_single_section() {
        let c = codec();
        let first = c.write("# Chat\n", r#"["/a.rs"]"#);
        let second = c.write(&first, r#"["/b.rs"]"#);

        assert_eq!(c.section_count(&second), 1);
        assert_eq!(c.read_raw(&second).as_deref(), Some(r#"["/b.rs"]"#));
        assert!(second.starts_with("# Chat\n\n<!--"));
        assert_eq!(c.write(&second, r#"["/b.rs"]"#), second);
    }

    #[test]
    fn test_section_in_middle_removed() {
        let c = codec();
        let text = "intro\n\n<!-- Local Variables: -->\n<!-- tally-context: [\"/x\"] -->\n<!-- End: -->\n\noutro\n";
        let out = c.write(text, "[]");

        assert_eq!(c.section_count(&out), 1);
        assert!(out.starts_with("intro\n\noutro\n\n<!-- Local Variables: -->"));
    }

    #[test]
    fn test_other_variables_ignored() {
        let text = "<!-- Local Variables: -->\n<!-- fill-column: 80 -->\n<!-- End: -->\n";
        assert_eq!(codec().read_raw(text), None);
        assert_eq!(codec().read_raw("no section here"), None);
    }

    #[test]
    fn test_name_is_escaped() {
        let c = LocalVariableCodec::new("ctx.files+").unwrap();
        let out = c.write("", r#"["/a"]"#);
        assert_eq!(c.read_raw(&out).as_deref(), Some(r#"["/a"]"#));
        assert_eq!(c.read_raw(&out.replace("ctx.files+", "ctxXfiles+")), None);
    }

    #[test]
    fn test_end_marker_inside_value() {
        let c = codec();
        let blob = r#"["/notes/<!-- End: -->.md"]"#;
        let first = c.write("# Chat\n", blob);
        let second = c.write(&first, blob);

        assert_eq!(second, first);
        assert_eq!(c.section_count(&second), 1);
        assert_eq!(c.read_raw(&second).as_deref(), Some(blob));
        assert!(second.starts_with("# Chat\n\n<!-- Local Variables: -->"));
    }

    #[test]
    fn test_crlf_document_keeps_line_endings() {
        let c = codec();
        let out = c.write("# Chat\r\n\r\nhello\r\n", r#"["/a.rs"]"#);
        assert_eq!(
            out,
            "# Chat\r\n\r\nhello\r\n\r\n<!-- Local Variables: -->\r\n<!-- tally-context: [\"/a.rs\"] -->\r\n<!-- End: -->\r\n"
        );
        assert_eq!(c.read_raw(&out).as_deref(), Some(r#"["/a.rs"]"#));

        let again = c.write(&out, "[]");
        assert_eq!(c.section_count(&again), 1);
        assert!(!again.replace("\r\n", "").contains('\n'));
        assert_eq!(c.read_raw(&again).as_deref(), Some("[]"));
    }
}
