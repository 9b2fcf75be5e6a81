//! Session - 문서 하나에 대한 비용/컨텍스트 세션
//!
//! 표시 계층이 사용하는 작업을 한 곳에 모읍니다:
//! - 비용: `total_cost`, `cached_context_cost`, `cost_breakdown`
//! - 컨텍스트: `add_file`, `remove_entry`, `remove_all`, `set_model`, `set_backend`
//! - 목록: `list_display_rows`, `toggle_flag`, `commit_removal`
//! - 저장: `save_context`, `load_context`, `restore_context`
//!
//! 열 때 비용 캐시를 이벤트 버스에 구독하고, drop 시 구독을 해제합니다.

use crate::context::{BufferId, ContextEntry, ContextEntrySet, ModelSelection};
use crate::cost::{ContextCostCache, CostBreakdown, CostEstimator, WordCounter};
use crate::host::{DocumentHost, Prompter};
use crate::persist::{ContextPersistenceStore, RestoreOutcome};
use crate::registry::{ContextFileRegistry, DisplayRow};
use parking_lot::Mutex;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tally_foundation::event::{EventBus, ListenerId};
use tally_foundation::{PricingLookup, Result, TallyConfig};
use tracing::{debug, info};

/// 문서 세션
pub struct Session {
    host: Arc<dyn DocumentHost>,
    prompter: Arc<dyn Prompter>,
    bus: Arc<EventBus>,
    entries: Arc<ContextEntrySet>,
    selection: Arc<ModelSelection>,
    counter: WordCounter,
    estimator: CostEstimator,
    cache: Arc<ContextCostCache>,
    cache_listener: ListenerId,
    registry: Mutex<ContextFileRegistry>,
    store: ContextPersistenceStore,
}

impl Session {
    /// 세션 열기
    ///
    /// 초기 재계산을 한 번 수행하므로, 가격이 있는 모델이면 빈 컨텍스트 비용은 0입니다.
    pub fn open(
        host: Arc<dyn DocumentHost>,
        prompter: Arc<dyn Prompter>,
        config: &TallyConfig,
        pricing: Arc<dyn PricingLookup>,
    ) -> Result<Self> {
        let store = ContextPersistenceStore::new(&config.persistence)?;

        let bus = Arc::new(EventBus::new());
        let entries = Arc::new(ContextEntrySet::new(bus.clone()));
        let selection = Arc::new(ModelSelection::new(
            config.model(),
            config.backend(),
            bus.clone(),
        ));

        let counter = WordCounter::new(host.clone());
        let estimator = CostEstimator::new(config.cost.clone(), pricing);
        let cache = Arc::new(ContextCostCache::new(
            entries.clone(),
            selection.clone(),
            counter.clone(),
            estimator.clone(),
        ));
        let cache_listener = bus.subscribe(cache.clone());
        cache.recompute();

        info!(
            document = %host.document_kind(),
            model = %selection.model(),
            backend = %selection.backend(),
            "Session opened"
        );

        Ok(Self {
            host,
            prompter,
            bus,
            entries,
            selection,
            counter,
            estimator,
            cache,
            cache_listener,
            registry: Mutex::new(ContextFileRegistry::new()),
            store,
        })
    }

    /// 설정의 가격 override를 적용한 레지스트리로 열기
    pub fn with_config(
        host: Arc<dyn DocumentHost>,
        prompter: Arc<dyn Prompter>,
        config: &TallyConfig,
    ) -> Result<Self> {
        let pricing = Arc::new(config.build_registry());
        Self::open(host, prompter, config, pricing)
    }

    /// 목록 뷰의 홈 디렉토리 지정 (표시용)
    pub fn with_home(self, home: Option<PathBuf>) -> Self {
        *self.registry.lock() = ContextFileRegistry::with_home(home);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn host(&self) -> &Arc<dyn DocumentHost> {
        &self.host
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn entries(&self) -> &Arc<ContextEntrySet> {
        &self.entries
    }

    pub fn cache(&self) -> &Arc<ContextCostCache> {
        &self.cache
    }

    pub fn model(&self) -> String {
        self.selection.model()
    }

    pub fn backend(&self) -> String {
        self.selection.backend()
    }

    // ========================================================================
    // Context mutation
    // ========================================================================

    pub fn add_file(&self, path: impl Into<PathBuf>) -> bool {
        self.entries.add_file(path)
    }

    pub fn add_buffer(&self, handle: BufferId) -> bool {
        self.entries.add_buffer(handle)
    }

    pub fn remove_entry(&self, entry: &ContextEntry) -> bool {
        self.entries.remove(entry)
    }

    pub fn remove_file(&self, path: &Path) -> bool {
        self.entries.remove_file(path)
    }

    pub fn remove_all(&self) -> usize {
        self.entries.remove_all()
    }

    pub fn set_model(&self, model: impl Into<String>) -> bool {
        self.selection.set_model(model)
    }

    pub fn set_backend(&self, backend: impl Into<String>) -> bool {
        self.selection.set_backend(backend)
    }

    // ========================================================================
    // Cost
    // ========================================================================

    /// 캐시된 컨텍스트 비용 (재계산 없음)
    pub fn cached_context_cost(&self) -> Option<f64> {
        self.cache.read()
    }

    /// 입력/컨텍스트/출력 비용
    ///
    /// `range`가 없으면 문서 전체를 입력으로 봅니다. 입력 비용은 매번 새로 계산합니다.
    pub fn cost_breakdown(&self, range: Option<Range<usize>>) -> CostBreakdown {
        let model = self.selection.model();
        let words = match range {
            Some(range) => self.counter.count_range(range),
            None => self.counter.count_document(),
        };

        let breakdown = CostBreakdown {
            input: self.estimator.input_cost(&model, words),
            context: self.cache.read(),
            output: self.estimator.output_cost(&model),
        };
        debug!(%model, words, ?breakdown, "Cost breakdown");
        breakdown
    }

    /// 총 비용 (하나라도 계산 불가면 None)
    pub fn total_cost(&self, range: Option<Range<usize>>) -> Option<f64> {
        self.cost_breakdown(range).total()
    }

    // ========================================================================
    // Registry view
    // ========================================================================

    /// 목록 새로 열기 (플래그 초기화)
    pub fn list_display_rows(&self) -> Vec<DisplayRow> {
        let mut registry = self.registry.lock();
        registry.refresh(&self.entries, self.host.as_ref());
        registry.rows()
    }

    /// 현재 목록 (플래그 유지)
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        self.registry.lock().rows()
    }

    pub fn toggle_flag(&self, index: usize) -> Result<bool> {
        self.registry.lock().toggle(index)
    }

    pub fn toggle_flag_path(&self, path: &Path) -> Result<bool> {
        self.registry.lock().toggle_path(path)
    }

    pub fn flag_all(&self) {
        self.registry.lock().flag_all();
    }

    pub fn unflag_all(&self) {
        self.registry.lock().unflag_all();
    }

    pub fn flagged_count(&self) -> usize {
        self.registry.lock().flagged_count()
    }

    /// 플래그된 항목 제거 (없으면 빈 목록)
    pub fn commit_removal(&self) -> Vec<PathBuf> {
        self.registry
            .lock()
            .commit_removal(&self.entries, self.host.as_ref())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// 현재 파일 항목을 문서에 저장
    pub fn save_context(&self) -> Result<usize> {
        self.store
            .save(self.host.as_ref(), &self.entries, self.prompter.as_ref())
    }

    /// 문서에 저장된 경로 목록
    pub fn load_context(&self) -> Result<Option<Vec<PathBuf>>> {
        self.store.load(self.host.as_ref())
    }

    /// 저장된 컨텍스트 복원
    pub fn restore(&self) -> Result<RestoreOutcome> {
        self.store
            .restore(self.host.as_ref(), &self.entries, self.prompter.as_ref())
    }

    /// 저장된 컨텍스트 복원, 복원 여부 반환
    pub fn restore_context(&self) -> Result<bool> {
        Ok(self.restore()?.restored())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.cache_listener);
        debug!("Session closed");
    }
}
