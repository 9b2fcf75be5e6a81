//! Cost display - 비용/목록 출력 포맷
//!
//! 계산은 tally-core가 하고, 여기서는 문자열로만 바꿉니다.

use tally_core::{format_cost, CostBreakdown, DisplayRow};

/// 계산 불가는 `n/a`
pub fn cost_label(cost: Option<f64>) -> String {
    cost.map(format_cost).unwrap_or_else(|| "n/a".to_string())
}

/// 사람이 읽기 쉬운 크기
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// 비용 세부 내역 줄
pub fn breakdown_lines(model: &str, breakdown: &CostBreakdown) -> Vec<String> {
    vec![
        format!("model:   {}", model),
        format!("input:   {}", cost_label(breakdown.input)),
        format!("context: {}", cost_label(breakdown.context)),
        format!("output:  {}", cost_label(breakdown.output)),
        format!("total:   {}", cost_label(breakdown.total())),
    ]
}

/// 목록 줄 (번호는 1부터)
pub fn row_lines(rows: &[DisplayRow]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            format!(
                "{:>3} [{}] {:>10}  {}",
                i + 1,
                if row.flagged { "x" } else { " " },
                format_size(row.size),
                row.display_path
            )
        })
        .collect()
}
