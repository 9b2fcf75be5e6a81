//! Context Cost Cache - 컨텍스트 항목 비용 캐시
//!
//! 상태: `None`(계산 불가/미계산) | `Some(cost)`
//!
//! - 컨텍스트 추가/제거/전체 제거, 모델/Backend 변경 이벤트마다 즉시 재계산
//! - `read()`는 재계산 없이 현재 값만 반환
//! - 현재 문서/선택 영역 비용은 캐시하지 않음 (호출자가 매번 계산)

use super::estimator::{estimate, CostEstimator};
use super::words::WordCounter;
use crate::context::{ContextEntrySet, ModelSelection};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tally_foundation::event::{ContextEvent, EventKind, EventListener};
use tracing::{debug, warn};

/// 컨텍스트 비용 캐시
pub struct ContextCostCache {
    value: RwLock<Option<f64>>,
    entries: Arc<ContextEntrySet>,
    selection: Arc<ModelSelection>,
    counter: WordCounter,
    estimator: CostEstimator,
    recomputes: AtomicU64,
}

impl ContextCostCache {
    pub fn new(
        entries: Arc<ContextEntrySet>,
        selection: Arc<ModelSelection>,
        counter: WordCounter,
        estimator: CostEstimator,
    ) -> Self {
        Self {
            value: RwLock::new(None),
            entries,
            selection,
            counter,
            estimator,
            recomputes: AtomicU64::new(0),
        }
    }

    /// 현재 캐시 값 (부수효과 없음)
    pub fn read(&self) -> Option<f64> {
        *self.value.read()
    }

    /// 재계산 후 저장
    pub fn recompute(&self) -> Option<f64> {
        let cost = self.compute();
        *self.value.write() = cost;
        self.recomputes.fetch_add(1, Ordering::SeqCst);
        debug!(?cost, entries = self.entries.len(), "Context cost recomputed");
        cost
    }

    /// 저장하지 않고 처음부터 계산
    ///
    /// 읽을 수 없는 파일은 경고 후 0으로 계산합니다.
    pub fn compute(&self) -> Option<f64> {
        let model = self.selection.model();
        let rates = match self.estimator.rates(&model) {
            Ok(rates) => rates,
            Err(e) => {
                debug!(error = %e, "Context cost unavailable");
                return None;
            }
        };
        let tokens_per_word = self.estimator.config().tokens_per_word;

        // 비율이 0 이하면 항목이 없어도 계산 불가
        let mut total = estimate(0, tokens_per_word, rates.input_per_1m)?;
        for entry in self.entries.snapshot() {
            let words = match self.counter.count_entry(&entry) {
                Ok(words) => words,
                Err(e) => {
                    warn!(entry = %entry.identity(), error = %e, "Cannot count context entry");
                    0
                }
            };
            total += estimate(words, tokens_per_word, rates.input_per_1m)?;
        }
        Some(total)
    }

    /// 지금까지의 재계산 횟수
    pub fn recompute_count(&self) -> u64 {
        self.recomputes.load(Ordering::SeqCst)
    }
}

impl EventListener for ContextCostCache {
    fn name(&self) -> &str {
        "context_cost_cache"
    }

    fn kinds(&self) -> Option<Vec<EventKind>> {
        Some(vec![
            EventKind::EntryAdded,
            EventKind::EntryRemoved,
            EventKind::EntriesCleared,
            EventKind::ModelChanged,
            EventKind::BackendChanged,
        ])
    }

    fn on_event(&self, event: &ContextEvent) {
        debug!(kind = %event.kind, "Invalidating context cost");
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{DocumentKind, MemoryHost};
    use std::path::Path;
    use tally_foundation::{CostConfig, EventBus, ModelPricing, ModelRegistry};

    struct Fixture {
        host: Arc<MemoryHost>,
        entries: Arc<ContextEntrySet>,
        selection: Arc<ModelSelection>,
        cache: Arc<ContextCostCache>,
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn fixture(tokens_per_word: f64) -> Fixture {
        let host = Arc::new(MemoryHost::new(DocumentKind::Other));
        host.insert_file("/a.txt", words(500));
        host.insert_file("/b.txt", words(800));

        let mut registry = ModelRegistry::new();
        registry.set_pricing("test-model", ModelPricing::new(3.0, 15.0));

        let bus = Arc::new(EventBus::new());
        let entries = Arc::new(ContextEntrySet::new(bus.clone()));
        let selection = Arc::new(ModelSelection::new("test-model", "test", bus.clone()));
        let config = CostConfig {
            tokens_per_word,
            ..CostConfig::default()
        };
        let cache = Arc::new(ContextCostCache::new(
            entries.clone(),
            selection.clone(),
            WordCounter::new(host.clone()),
            CostEstimator::new(config, Arc::new(registry)),
        ));
        bus.subscribe(cache.clone());

        Fixture {
            host,
            entries,
            selection,
            cache,
        }
    }

    #[test]
    fn test_initial_value_is_none() {
        let f = fixture(1.5);
        assert_eq!(f.cache.read(), None);
        assert_eq!(f.cache.recompute_count(), 0);
    }

    #[test]
    fn test_recompute_on_each_mutation() {
        let f = fixture(1.5);

        f.entries.add_file("/a.txt");
        assert!((f.cache.read().unwrap() - 0.00225).abs() < 1e-12);

        f.entries.add_file("/b.txt");
        assert!((f.cache.read().unwrap() - 0.00585).abs() < 1e-12);

        f.entries.remove_file(Path::new("/a.txt"));
        assert!((f.cache.read().unwrap() - 0.0036).abs() < 1e-12);

        f.entries.remove_all();
        assert_eq!(f.cache.read(), Some(0.0));
        assert_eq!(f.cache.recompute_count(), 4);
        assert_eq!(f.host.open_scratch_count(), 0);
    }

    #[test]
    fn test_model_without_pricing_clears_value() {
        let f = fixture(1.5);
        f.entries.add_file("/a.txt");
        assert!(f.cache.read().is_some());

        f.selection.set_model("unpriced");
        assert_eq!(f.cache.read(), None);

        f.selection.set_model("test-model");
        assert!(f.cache.read().is_some());
    }

    #[test]
    fn test_backend_change_recomputes() {
        let f = fixture(1.5);
        f.entries.add_file("/a.txt");
        let before = f.cache.recompute_count();

        f.selection.set_backend("other");
        assert_eq!(f.cache.recompute_count(), before + 1);
    }

    #[test]
    fn test_non_positive_ratio_unavailable() {
        let f = fixture(0.0);
        f.entries.add_file("/a.txt");
        assert_eq!(f.cache.read(), None);
    }

    #[test]
    fn test_non_positive_ratio_with_empty_context() {
        let f = fixture(0.0);
        assert_eq!(f.cache.recompute(), None);

        let f = fixture(-1.0);
        f.entries.add_file("/a.txt");
        f.entries.remove_all();
        assert_eq!(f.cache.read(), None);
    }

    #[test]
    fn test_vanished_file_counts_zero() {
        let f = fixture(1.5);
        f.entries.add_file("/a.txt");
        f.host.remove_file(Path::new("/a.txt"));

        assert_eq!(f.cache.recompute(), Some(0.0));
        assert_eq!(f.host.open_scratch_count(), 0);
    }
}
