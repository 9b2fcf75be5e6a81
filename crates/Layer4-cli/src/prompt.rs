//! 터미널 확인 프롬프트

use std::io::{self, BufRead, Write};
use tally_core::Prompter;
use tracing::warn;

/// stdin에서 y/N을 읽는 Prompter
///
/// 입력이 끝났거나 읽을 수 없으면 거부로 처리합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if let Err(e) = io::stdout().flush() {
            warn!(error = %e, "Cannot flush stdout");
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) => false,
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!(error = %e, "Cannot read confirmation");
                false
            }
        }
    }
}

/// y / yes (대소문자 무시)
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
