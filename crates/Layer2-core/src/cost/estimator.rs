//! Cost Estimator - 단어 수 기반 비용 추정
//!
//! `cost = rate_per_1m * tokens_per_word * words / 1_000_000`
//!
//! 추정 불가(가격 없음, 비율 0 이하)는 `None`으로 전파합니다. 0으로 바꾸지 않습니다.
//! 반올림은 하지 않으며, 표시용 포맷은 `format_cost`에서만 합니다.

use std::sync::Arc;
use tally_foundation::{CostConfig, Error, ModelPricing, PricingLookup, Result};

const TOKENS_PER_UNIT: f64 = 1_000_000.0;

/// 단어 수 비용
pub fn estimate(word_count: usize, tokens_per_word: f64, rate_per_1m: f64) -> Option<f64> {
    if tokens_per_word.is_nan() || tokens_per_word <= 0.0 {
        return None;
    }
    Some(rate_per_1m * tokens_per_word * word_count as f64 / TOKENS_PER_UNIT)
}

/// 출력 비용 (토큰 수를 그대로 사용)
pub fn estimate_output(output_tokens: u64, output_rate_per_1m: f64) -> f64 {
    output_rate_per_1m * output_tokens as f64 / TOKENS_PER_UNIT
}

/// 입력 + 컨텍스트 + 출력 (하나라도 None이면 None)
pub fn estimate_total(input: Option<f64>, context: Option<f64>, output: Option<f64>) -> Option<f64> {
    Some(input? + context? + output?)
}

/// 표시용 비용 문자열
pub fn format_cost(cost: f64) -> String {
    if cost < 0.01 {
        format!("${:.4}", cost)
    } else if cost < 1.0 {
        format!("${:.3}", cost)
    } else {
        format!("${:.2}", cost)
    }
}

/// 비용 세부 내역
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostBreakdown {
    /// 현재 문서/선택 영역
    pub input: Option<f64>,
    /// 컨텍스트 항목 (캐시 값)
    pub context: Option<f64>,
    /// 예상 응답
    pub output: Option<f64>,
}

impl CostBreakdown {
    pub fn total(&self) -> Option<f64> {
        estimate_total(self.input, self.context, self.output)
    }
}

/// 설정 + 가격 레지스트리를 묶은 추정기
#[derive(Clone)]
pub struct CostEstimator {
    config: CostConfig,
    pricing: Arc<dyn PricingLookup>,
}

impl CostEstimator {
    pub fn new(config: CostConfig, pricing: Arc<dyn PricingLookup>) -> Self {
        Self { config, pricing }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// 모델 가격 조회
    pub fn rates(&self, model_id: &str) -> Result<ModelPricing> {
        self.pricing
            .rates(model_id)
            .ok_or_else(|| Error::PricingUnavailable(model_id.to_string()))
    }

    /// 입력 단어 비용
    pub fn input_cost(&self, model_id: &str, word_count: usize) -> Option<f64> {
        let rates = self.rates(model_id).ok()?;
        estimate(word_count, self.config.tokens_per_word, rates.input_per_1m)
    }

    /// 가정된 출력 토큰 비용
    pub fn output_cost(&self, model_id: &str) -> Option<f64> {
        let rates = self.rates(model_id).ok()?;
        Some(estimate_output(self.config.output_tokens, rates.output_per_1m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_foundation::ModelRegistry;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_estimate_formula() {
        let cost = estimate(1300, 1.5, 3.0).unwrap();
        assert!(approx(cost, 0.00585));

        assert_eq!(estimate(0, 1.5, 3.0), Some(0.0));
        assert_eq!(estimate(1000, 1.5, 0.0), Some(0.0));
    }

    #[test]
    fn test_estimate_non_positive_ratio_unavailable() {
        assert_eq!(estimate(100, 0.0, 3.0), None);
        assert_eq!(estimate(100, -1.0, 3.0), None);
        assert_eq!(estimate(100, f64::NAN, 3.0), None);
    }

    #[test]
    fn test_estimate_monotonic() {
        let base = estimate(100, 1.2, 2.0).unwrap();
        assert!(estimate(101, 1.2, 2.0).unwrap() >= base);
        assert!(estimate(100, 1.3, 2.0).unwrap() >= base);
        assert!(estimate(100, 1.2, 2.5).unwrap() >= base);
    }

    #[test]
    fn test_output_not_multiplied_by_words() {
        assert!(approx(estimate_output(1000, 15.0), 0.015));
        assert_eq!(estimate_output(0, 15.0), 0.0);
    }

    #[test]
    fn test_total_unavailable_if_any_missing() {
        assert_eq!(estimate_total(Some(1.0), Some(2.0), Some(3.0)), Some(6.0));
        assert_eq!(estimate_total(None, Some(2.0), Some(3.0)), None);
        assert_eq!(estimate_total(Some(1.0), None, Some(3.0)), None);
        assert_eq!(estimate_total(Some(1.0), Some(2.0), None), None);
    }

    #[test]
    fn test_estimator_pricing_unavailable() {
        let estimator = CostEstimator::new(
            CostConfig::default(),
            Arc::new(ModelRegistry::with_defaults()),
        );

        assert!(matches!(
            estimator.rates("llama3.3"),
            Err(Error::PricingUnavailable(_))
        ));
        assert_eq!(estimator.input_cost("llama3.3", 10), None);
        assert_eq!(estimator.output_cost("llama3.3"), None);
        assert!(estimator.input_cost("gpt-4o", 10).is_some());
    }

    #[test]
    fn test_format_cost() {
        assert_eq!(format_cost(0.001), "$0.0010");
        assert_eq!(format_cost(0.1), "$0.100");
        assert_eq!(format_cost(1.5), "$1.50");
    }
}
