//! Tally Config - 통합 설정
//!
//! 글로벌(`~/.config/tally/config.json`)과 프로젝트(`.tally/config.json`)
//! 설정을 병합합니다. 프로젝트 설정이 우선합니다.

use crate::registry::{model_registry, ModelPricing, ModelRegistry};
use crate::storage::JsonStore;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 설정 파일명
pub const TALLY_CONFIG_FILE: &str = "config.json";

/// 설정이 없을 때 사용할 모델
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// 설정이 없을 때 사용할 Backend
pub const DEFAULT_BACKEND: &str = "anthropic";

/// 기본 단어당 토큰 비율
pub const DEFAULT_TOKENS_PER_WORD: f64 = 1.5;

/// 기본 출력 토큰 가정치
pub const DEFAULT_OUTPUT_TOKENS: u64 = 1000;

/// 저장 컨텍스트 property 키 (org 스타일 문서)
pub const DEFAULT_PROPERTY_KEY: &str = "TALLY_CONTEXT";

/// 저장 컨텍스트 local variable 이름 (markdown 스타일 문서)
pub const DEFAULT_VARIABLE_NAME: &str = "tally-context";

// ============================================================================
// Tally Config (통합)
// ============================================================================

/// Tally 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyConfig {
    /// 기본 모델 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// 기본 Backend 이름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_backend: Option<String>,

    /// 비용 추정 설정
    #[serde(default)]
    pub cost: CostConfig,

    /// 모델별 가격 override (1M 토큰당 USD)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub pricing: HashMap<String, ModelPricing>,

    /// 컨텍스트 저장 설정
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl TallyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<TallyConfig>(TALLY_CONFIG_FILE)? {
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) =
                project.load_optional::<TallyConfig>(TALLY_CONFIG_FILE)?
            {
                config.merge(project_config);
            }
        }

        Ok(config)
    }

    /// 특정 저장소에서만 로드
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<TallyConfig>(TALLY_CONFIG_FILE)?
            .unwrap_or_default())
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: TallyConfig) {
        if other.default_model.is_some() {
            self.default_model = other.default_model;
        }
        if other.default_backend.is_some() {
            self.default_backend = other.default_backend;
        }

        self.cost.merge(other.cost);
        self.pricing.extend(other.pricing);
        self.persistence.merge(other.persistence);
    }

    // ========================================================================
    // Resolved values
    // ========================================================================

    /// 활성 모델 (미설정 시 기본값)
    pub fn model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// 활성 Backend (미설정 시 기본값)
    pub fn backend(&self) -> &str {
        self.default_backend.as_deref().unwrap_or(DEFAULT_BACKEND)
    }

    /// 기본 가격표 + `pricing` override
    pub fn build_registry(&self) -> ModelRegistry {
        let mut registry = model_registry().clone();
        registry.apply_overrides(&self.pricing);
        registry
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn default_backend(mut self, backend: impl Into<String>) -> Self {
        self.default_backend = Some(backend.into());
        self
    }

    pub fn tokens_per_word(mut self, ratio: f64) -> Self {
        self.cost.tokens_per_word = ratio;
        self
    }
}

// ============================================================================
// Cost Config
// ============================================================================

/// 비용 추정 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostConfig {
    /// 단어 1개당 토큰 수 (0 이하이면 추정 불가)
    #[serde(default = "default_tokens_per_word")]
    pub tokens_per_word: f64,

    /// 응답 출력 토큰 가정치
    #[serde(default = "default_output_tokens")]
    pub output_tokens: u64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            tokens_per_word: DEFAULT_TOKENS_PER_WORD,
            output_tokens: DEFAULT_OUTPUT_TOKENS,
        }
    }
}

impl CostConfig {
    fn merge(&mut self, other: CostConfig) {
        if other.tokens_per_word != DEFAULT_TOKENS_PER_WORD {
            self.tokens_per_word = other.tokens_per_word;
        }
        if other.output_tokens != DEFAULT_OUTPUT_TOKENS {
            self.output_tokens = other.output_tokens;
        }
    }
}

// ============================================================================
// Persistence Config
// ============================================================================

/// 컨텍스트 저장 키 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceConfig {
    /// property drawer 키
    #[serde(default = "default_property_key")]
    pub property_key: String,

    /// local variable 이름
    #[serde(default = "default_variable_name")]
    pub variable_name: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            property_key: default_property_key(),
            variable_name: default_variable_name(),
        }
    }
}

impl PersistenceConfig {
    fn merge(&mut self, other: PersistenceConfig) {
        if other.property_key != DEFAULT_PROPERTY_KEY {
            self.property_key = other.property_key;
        }
        if other.variable_name != DEFAULT_VARIABLE_NAME {
            self.variable_name = other.variable_name;
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_tokens_per_word() -> f64 {
    DEFAULT_TOKENS_PER_WORD
}

fn default_output_tokens() -> u64 {
    DEFAULT_OUTPUT_TOKENS
}

fn default_property_key() -> String {
    DEFAULT_PROPERTY_KEY.to_string()
}

fn default_variable_name() -> String {
    DEFAULT_VARIABLE_NAME.to_string()
}
