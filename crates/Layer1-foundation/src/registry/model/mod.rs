//! Model Registry - 모델별 토큰 단가
//!
//! 선택된 모델 ID로 입력/출력 단가(1M 토큰당 USD)를 조회합니다.
//! 가격이 없는 모델(로컬 모델 등)도 등록은 되지만 조회 결과는 `None`입니다.
//! `None`은 "계산 불가"이지 0이 아닙니다.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// 1M 토큰당 USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPricing {
    pub input_per_1m: f64,
    pub output_per_1m: f64,
}

impl ModelPricing {
    pub const fn new(input_per_1m: f64, output_per_1m: f64) -> Self {
        Self {
            input_per_1m,
            output_per_1m,
        }
    }
}

/// 가격 조회 인터페이스
pub trait PricingLookup: Send + Sync {
    fn rates(&self, model_id: &str) -> Option<ModelPricing>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
    /// Backend 이름 ("anthropic", "ollama", ...)
    pub backend: String,
    pub pricing: Option<ModelPricing>,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>, backend: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            backend: backend.into(),
            pricing: None,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn pricing(mut self, pricing: ModelPricing) -> Self {
        self.pricing = Some(pricing);
        self
    }
}

// ============================================================================
// 기본 가격표
// ============================================================================

/// (id, backend, 표시 이름, 단가)
const BUILTIN_MODELS: &[(&str, &str, &str, Option<ModelPricing>)] = &[
    // Anthropic
    ("claude-sonnet-4-20250514", "anthropic", "Claude Sonnet 4", Some(ModelPricing::new(3.0, 15.0))),
    ("claude-opus-4-20250514", "anthropic", "Claude Opus 4", Some(ModelPricing::new(15.0, 75.0))),
    ("claude-3-5-haiku-20241022", "anthropic", "Claude 3.5 Haiku", Some(ModelPricing::new(0.80, 4.0))),
    // OpenAI
    ("gpt-4o", "openai", "GPT-4o", Some(ModelPricing::new(2.50, 10.0))),
    ("gpt-4o-mini", "openai", "GPT-4o Mini", Some(ModelPricing::new(0.15, 0.60))),
    ("o3-mini", "openai", "o3-mini", Some(ModelPricing::new(1.10, 4.40))),
    // Gemini
    ("gemini-2.0-flash", "gemini", "Gemini 2.0 Flash", Some(ModelPricing::new(0.10, 0.40))),
    ("gemini-1.5-pro", "gemini", "Gemini 1.5 Pro", Some(ModelPricing::new(1.25, 5.0))),
    // Ollama (로컬) - 가격 없음
    ("llama3.3", "ollama", "Llama 3.3 (Local)", None),
    ("qwen2.5-coder", "ollama", "Qwen 2.5 Coder (Local)", None),
];

/// 사용자 설정으로 추가된 모델의 backend
const CUSTOM_BACKEND: &str = "custom";

static MODEL_REGISTRY: OnceLock<ModelRegistry> = OnceLock::new();

/// 기본 가격표만 담긴 전역 레지스트리
pub fn registry() -> &'static ModelRegistry {
    MODEL_REGISTRY.get_or_init(ModelRegistry::with_defaults)
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelInfo>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (id, backend, name, pricing) in BUILTIN_MODELS {
            let mut info = ModelInfo::new(*id, *backend).display_name(*name);
            info.pricing = *pricing;
            registry.register(info);
        }
        registry
    }

    /// 같은 ID는 덮어씀
    pub fn register(&mut self, model: ModelInfo) {
        self.models.insert(model.id.clone(), model);
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelInfo> {
        self.models.get(model_id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// 단가 지정. 모르는 모델은 custom backend로 등록
    pub fn set_pricing(&mut self, model_id: &str, pricing: ModelPricing) {
        self.models
            .entry(model_id.to_string())
            .or_insert_with(|| ModelInfo::new(model_id, CUSTOM_BACKEND))
            .pricing = Some(pricing);
    }

    /// 설정 파일의 `pricing` 섹션 적용
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, ModelPricing>) {
        for (model_id, pricing) in overrides {
            self.set_pricing(model_id, *pricing);
        }
    }
}

impl PricingLookup for ModelRegistry {
    fn rates(&self, model_id: &str) -> Option<ModelPricing> {
        self.get(model_id)?.pricing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let registry = registry();
        assert_eq!(registry.len(), BUILTIN_MODELS.len());

        let sonnet = registry.get("claude-sonnet-4-20250514").unwrap();
        assert_eq!(sonnet.backend, "anthropic");
        assert_eq!(sonnet.display_name, "Claude Sonnet 4");
    }

    #[test]
    fn test_rates() {
        let registry = ModelRegistry::with_defaults();

        assert_eq!(registry.rates("gpt-4o"), Some(ModelPricing::new(2.50, 10.0)));
        // 등록되어 있지만 가격 없음
        assert!(registry.get("llama3.3").is_some());
        assert!(registry.rates("llama3.3").is_none());
        assert!(registry.rates("no-such-model").is_none());
    }

    #[test]
    fn test_overrides() {
        let mut registry = ModelRegistry::with_defaults();
        let mut overrides = HashMap::new();
        overrides.insert("llama3.3".to_string(), ModelPricing::new(0.0, 0.0));
        overrides.insert("my-model".to_string(), ModelPricing::new(1.0, 2.0));
        registry.apply_overrides(&overrides);

        assert_eq!(registry.rates("llama3.3"), Some(ModelPricing::new(0.0, 0.0)));
        assert_eq!(registry.get("llama3.3").unwrap().backend, "ollama");

        let custom = registry.get("my-model").unwrap();
        assert_eq!(custom.backend, CUSTOM_BACKEND);
        assert_eq!(custom.display_name, "my-model");
        assert_eq!(custom.pricing, Some(ModelPricing::new(1.0, 2.0)));
    }
}
