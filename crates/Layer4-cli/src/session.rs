//! Interactive session - 줄 단위 명령 루프
//!
//! 표시 계층 역할만 합니다. 모든 상태 변경은 `tally_core::Session`을 통해 이루어집니다.

use crate::cli::{add_files, open_session};
use crate::cost::{breakdown_lines, cost_label, row_lines};
use crate::host::{absolutize, FsHost};
use std::io::{self, BufRead, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_core::{BufferId, DocumentHost, Prompter, RestoreOutcome, Session};
use tally_foundation::{Error, Result, TallyConfig};
use tracing::debug;

const HELP: &str = "\
commands:
  add <FILE>...            attach files to the context
  add-buffer <NAME> <TEXT> attach a named text buffer
  rm <FILE>                remove a file from the context
  clear                    remove every context entry
  model [ID]               show or change the model
  backend [NAME]           show or change the backend
  cost [START:END]         estimate the cost of the document (or a byte range)
  list                     list context files by size (clears flags)
  flag <N>...              toggle the removal flag of listed rows
  flag-all / unflag-all    set or clear every flag
  commit                   remove every flagged file
  save                     save the context file list into the document
  restore                  replace the context with the saved list
  help                     show this help
  quit                     leave the session";

// ============================================================================
// Command
// ============================================================================

/// 세션 명령
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(Vec<PathBuf>),
    AddBuffer { name: String, text: String },
    Remove(PathBuf),
    Clear,
    Model(Option<String>),
    Backend(Option<String>),
    Cost(Option<Range<usize>>),
    List,
    Flag(Vec<usize>),
    FlagAll,
    UnflagAll,
    Commit,
    Save,
    Restore,
    Help,
    Quit,
}

impl Command {
    /// 한 줄 파싱 (빈 줄은 None)
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name {
            "" => return Ok(None),
            "add" => {
                if args.is_empty() {
                    return Err(usage("add <FILE>..."));
                }
                Command::Add(args.iter().map(PathBuf::from).collect())
            }
            "add-buffer" => {
                let (buffer, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| usage("add-buffer <NAME> <TEXT>"))?;
                Command::AddBuffer {
                    name: buffer.to_string(),
                    text: text.trim().to_string(),
                }
            }
            "rm" => match args.as_slice() {
                [path] => Command::Remove(PathBuf::from(path)),
                _ => return Err(usage("rm <FILE>")),
            },
            "clear" => Command::Clear,
            "model" => Command::Model(args.first().map(|s| s.to_string())),
            "backend" => Command::Backend(args.first().map(|s| s.to_string())),
            "cost" => match args.first() {
                Some(range) => Command::Cost(Some(parse_range(range)?)),
                None => Command::Cost(None),
            },
            "list" | "ls" => Command::List,
            "flag" => {
                if args.is_empty() {
                    return Err(usage("flag <N>..."));
                }
                let rows = args
                    .iter()
                    .map(|a| match a.parse::<usize>() {
                        Ok(n) if n > 0 => Ok(n),
                        _ => Err(Error::InvalidInput(format!("not a row number: {}", a))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Command::Flag(rows)
            }
            "flag-all" => Command::FlagAll,
            "unflag-all" => Command::UnflagAll,
            "commit" => Command::Commit,
            "save" => Command::Save,
            "restore" => Command::Restore,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(Error::InvalidInput(format!(
                    "unknown command '{}' (try 'help')",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

fn usage(text: &str) -> Error {
    Error::InvalidInput(format!("usage: {}", text))
}

/// `START:END` 바이트 범위
pub fn parse_range(text: &str) -> Result<Range<usize>> {
    let invalid = || Error::InvalidInput(format!("invalid range '{}', expected START:END", text));
    let (start, end) = text.split_once(':').ok_or_else(invalid)?;
    let start: usize = start.trim().parse().map_err(|_| invalid())?;
    let end: usize = end.trim().parse().map_err(|_| invalid())?;
    if start > end {
        return Err(invalid());
    }
    Ok(start..end)
}

// ============================================================================
// Execution
// ============================================================================

/// 실행 결과
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

/// 명령 실행
pub fn execute(session: &Session, host: &FsHost, command: Command) -> Result<Flow> {
    debug!(?command, "Executing");
    let lines = match command {
        Command::Add(files) => {
            let added = add_files(session, &files)?;
            vec![format!(
                "Added {} file(s), context cost {}",
                added,
                cost_label(session.cached_context_cost())
            )]
        }
        Command::AddBuffer { name, text } => {
            let handle = BufferId::new(name);
            host.set_buffer(handle.clone(), text);
            let added = session.add_buffer(handle.clone());
            if !added {
                // 내용만 바뀐 경우 이벤트가 없으므로 직접 재계산
                session.cache().recompute();
            }
            vec![format!(
                "{} buffer {}, context cost {}",
                if added { "Added" } else { "Updated" },
                handle,
                cost_label(session.cached_context_cost())
            )]
        }
        Command::Remove(path) => {
            if session.remove_file(&absolutize(&path)?) {
                vec![format!(
                    "Removed {}, context cost {}",
                    path.display(),
                    cost_label(session.cached_context_cost())
                )]
            } else {
                vec![format!("{} is not in the context", path.display())]
            }
        }
        Command::Clear => {
            let removed = session.remove_all();
            vec![format!("Removed {} entr{}", removed, if removed == 1 { "y" } else { "ies" })]
        }
        Command::Model(None) => vec![format!("model: {}", session.model())],
        Command::Model(Some(model)) => {
            session.set_model(model);
            vec![format!(
                "model: {}, context cost {}",
                session.model(),
                cost_label(session.cached_context_cost())
            )]
        }
        Command::Backend(None) => vec![format!("backend: {}", session.backend())],
        Command::Backend(Some(backend)) => {
            session.set_backend(backend);
            vec![format!("backend: {}", session.backend())]
        }
        Command::Cost(range) => {
            let breakdown = session.cost_breakdown(range);
            breakdown_lines(&session.model(), &breakdown)
        }
        Command::List => {
            let rows = session.list_display_rows();
            if rows.is_empty() {
                vec!["No context files".to_string()]
            } else {
                row_lines(&rows)
            }
        }
        Command::Flag(rows) => {
            // 하나라도 범위 밖이면 아무것도 바꾸지 않음
            let count = session.display_rows().len();
            if let Some(bad) = rows.iter().find(|&&row| row > count) {
                return Err(Error::InvalidInput(format!(
                    "row {} out of range (1..={})",
                    bad, count
                )));
            }
            for row in rows {
                session.toggle_flag(row - 1)?;
            }
            let mut lines = row_lines(&session.display_rows());
            lines.push(format!("{} flagged", session.flagged_count()));
            lines
        }
        Command::FlagAll => {
            session.flag_all();
            vec![format!("{} flagged", session.flagged_count())]
        }
        Command::UnflagAll => {
            session.unflag_all();
            vec!["0 flagged".to_string()]
        }
        Command::Commit => {
            let removed = session.commit_removal();
            if removed.is_empty() {
                vec!["Nothing to do: no files flagged".to_string()]
            } else {
                let mut lines = vec![format!("Removed {} file(s):", removed.len())];
                lines.extend(removed.iter().map(|p| format!("  {}", p.display())));
                lines.push(format!(
                    "context cost {}",
                    cost_label(session.cached_context_cost())
                ));
                lines
            }
        }
        Command::Save => {
            let saved = session.save_context()?;
            vec![format!("Saved {} file(s) to {}", saved, host.path().display())]
        }
        Command::Restore => match session.restore()? {
            RestoreOutcome::NothingToDo => vec!["Nothing to restore".to_string()],
            RestoreOutcome::Restored(count) => vec![format!(
                "Restored {} file(s), context cost {}",
                count,
                cost_label(session.cached_context_cost())
            )],
        },
        Command::Help => vec![HELP.to_string()],
        Command::Quit => return Ok(Flow::Quit),
    };
    Ok(Flow::Continue(lines))
}

/// `tally session`
pub fn run(config: &TallyConfig, prompter: Arc<dyn Prompter>, document: &Path) -> anyhow::Result<()> {
    let (host, session) = open_session(config, prompter, document)?;
    println!(
        "tally session on {} ({}), model {} - type 'help' for commands",
        document.display(),
        host.document_kind(),
        session.model()
    );

    let stdin = io::stdin();
    loop {
        print!("tally> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match execute(&session, &host, command) {
            Ok(Flow::Continue(lines)) => lines.iter().for_each(|l| println!("{}", l)),
            Ok(Flow::Quit) => break,
            Err(e) if e.is_user_facing() => eprintln!("{}", e),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tally_core::AssumeYes;
    use tempfile::TempDir;

    fn run_lines(session: &Session, host: &FsHost, lines: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for line in lines {
            let command = Command::parse(line).unwrap().unwrap();
            match execute(session, host, command).unwrap() {
                Flow::Continue(lines) => out.extend(lines),
                Flow::Quit => break,
            }
        }
        out
    }

    fn setup() -> (TempDir, Arc<FsHost>, Session) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("small.rs"), "a b c").unwrap();
        fs::write(dir.path().join("large.rs"), "word ".repeat(300)).unwrap();
        let doc = dir.path().join("chat.md");
        fs::write(&doc, "# Chat\n").unwrap();

        let config = TallyConfig::new().default_model("gpt-4o");
        let (host, session) = open_session(&config, Arc::new(AssumeYes), &doc).unwrap();
        (dir, host, session)
    }

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
        assert_eq!(
            Command::parse("cost 0:10").unwrap(),
            Some(Command::Cost(Some(0..10)))
        );
        assert_eq!(
            Command::parse("flag 1 3").unwrap(),
            Some(Command::Flag(vec![1, 3]))
        );
        assert_eq!(
            Command::parse("add-buffer notes some free text").unwrap(),
            Some(Command::AddBuffer {
                name: "notes".to_string(),
                text: "some free text".to_string()
            })
        );
        assert!(Command::parse("flag 0").is_err());
        assert!(Command::parse("rm").is_err());
        assert!(Command::parse("frobnicate").is_err());
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("5:9").unwrap(), 5..9);
        assert!(parse_range("9:5").is_err());
        assert!(parse_range("5").is_err());
        assert!(parse_range("a:b").is_err());
    }

    #[test]
    fn test_flag_commit_flow() {
        let (dir, host, session) = setup();
        let small = dir.path().join("small.rs");
        let large = dir.path().join("large.rs");

        let add = format!("add {} {}", small.display(), large.display());
        run_lines(&session, &host, &[add.as_str(), "list", "flag 1"]);
        assert_eq!(session.flagged_count(), 1);

        let out = run_lines(&session, &host, &["commit"]);
        assert_eq!(out[0], "Removed 1 file(s):");
        assert_eq!(session.entries().len(), 1);
        assert!(session.entries().file_paths()[0].ends_with("small.rs"));

        let out = run_lines(&session, &host, &["commit"]);
        assert_eq!(out, vec!["Nothing to do: no files flagged"]);
    }

    #[test]
    fn test_save_restore_flow() {
        let (dir, host, session) = setup();
        let small = dir.path().join("small.rs");

        let add = format!("add {}", small.display());
        run_lines(
            &session,
            &host,
            &[add.as_str(), "add-buffer notes hello there", "save"],
        );
        let text = fs::read_to_string(dir.path().join("chat.md")).unwrap();
        assert!(text.contains("<!-- tally-context: ["));

        let out = run_lines(&session, &host, &["clear", "restore"]);
        assert_eq!(out[0], "Removed 2 entries");
        assert!(out[1].starts_with("Restored 1 file(s)"));
    }

    #[test]
    fn test_model_switch_to_unpriced() {
        let (dir, host, session) = setup();
        let small = dir.path().join("small.rs");

        let add = format!("add {}", small.display());
        let out = run_lines(&session, &host, &[add.as_str(), "model llama3.3", "cost"]);
        assert_eq!(out[1], "model: llama3.3, context cost n/a");
        assert_eq!(out.last().map(String::as_str), Some("total:   n/a"));
    }

    #[test]
    fn test_flag_with_bad_row_changes_nothing() {
        let (dir, host, session) = setup();
        let small = dir.path().join("small.rs");
        let large = dir.path().join("large.rs");

        let add = format!("add {} {}", small.display(), large.display());
        run_lines(&session, &host, &[add.as_str(), "list"]);

        let command = Command::parse("flag 1 99").unwrap().unwrap();
        assert!(matches!(
            execute(&session, &host, command),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(session.flagged_count(), 0);
    }

    #[test]
    fn test_flag_out_of_range() {
        let (_dir, host, session) = setup();
        run_lines(&session, &host, &["list"]);

        let command = Command::parse("flag 4").unwrap().unwrap();
        assert!(matches!(
            execute(&session, &host, command),
            Err(Error::InvalidInput(_))
        ));
    }
}
