//! Non-interactive CLI mode
//!
//! 명령 하나를 실행하고 종료합니다. 출력은 stdout, 로그는 stderr.

use crate::cost::{breakdown_lines, cost_label, row_lines};
use crate::host::{absolutize, FsHost};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_core::{Prompter, RestoreOutcome, Session};
use tally_foundation::{Result, TallyConfig};
use tracing::info;

/// 문서로 세션 열기
pub fn open_session(
    config: &TallyConfig,
    prompter: Arc<dyn Prompter>,
    document: &Path,
) -> Result<(Arc<FsHost>, Session)> {
    let host = Arc::new(FsHost::open(document)?);
    let session = Session::with_config(host.clone(), prompter, config)?;
    Ok((host, session))
}

/// 컨텍스트 파일 추가 (절대 경로로 변환)
pub fn add_files(session: &Session, files: &[PathBuf]) -> Result<usize> {
    let mut added = 0;
    for file in files {
        if session.add_file(absolutize(file)?) {
            added += 1;
        }
    }
    Ok(added)
}

/// `tally cost`
pub fn cost(
    config: &TallyConfig,
    prompter: Arc<dyn Prompter>,
    document: &Path,
    context: &[PathBuf],
    range: Option<Range<usize>>,
    saved: bool,
) -> Result<Vec<String>> {
    let (_host, session) = open_session(config, prompter, document)?;
    if saved {
        session.restore()?;
    }
    add_files(&session, context)?;

    let breakdown = session.cost_breakdown(range);
    let mut lines = breakdown_lines(&session.model(), &breakdown);
    lines.push(format!("files:   {}", session.entries().len()));
    Ok(lines)
}

/// `tally list`
pub fn list(
    config: &TallyConfig,
    prompter: Arc<dyn Prompter>,
    document: &Path,
    json: bool,
) -> Result<Vec<String>> {
    let (_host, session) = open_session(config, prompter, document)?;
    if session.restore()? == RestoreOutcome::NothingToDo {
        return Ok(vec![format!("No saved context in {}", document.display())]);
    }

    let rows = session.list_display_rows();
    if json {
        return Ok(vec![serde_json::to_string_pretty(&rows)?]);
    }

    let mut lines = row_lines(&rows);
    lines.push(format!(
        "{} file(s), context cost {}",
        rows.len(),
        cost_label(session.cached_context_cost())
    ));
    Ok(lines)
}

/// `tally save`
pub fn save(
    config: &TallyConfig,
    prompter: Arc<dyn Prompter>,
    document: &Path,
    context: &[PathBuf],
) -> Result<Vec<String>> {
    let (_host, session) = open_session(config, prompter, document)?;
    add_files(&session, context)?;

    let saved = session.save_context()?;
    info!(document = %document.display(), saved, "Saved context");
    Ok(vec![format!("Saved {} file(s) to {}", saved, document.display())])
}

/// `tally restore` - 저장된 컨텍스트 확인
pub fn restore(
    config: &TallyConfig,
    prompter: Arc<dyn Prompter>,
    document: &Path,
) -> Result<Vec<String>> {
    let (_host, session) = open_session(config, prompter, document)?;

    match session.restore()? {
        RestoreOutcome::NothingToDo => Ok(vec![format!(
            "Nothing to restore: {} has no saved context",
            document.display()
        )]),
        RestoreOutcome::Restored(count) => {
            let mut lines = vec![format!("Restored {} file(s):", count)];
            lines.extend(
                session
                    .entries()
                    .file_paths()
                    .iter()
                    .map(|p| format!("  {}", p.display())),
            );
            lines.push(format!(
                "context cost {}",
                cost_label(session.cached_context_cost())
            ));
            Ok(lines)
        }
    }
}
