//! Model Selection - 활성 모델/Backend

use parking_lot::RwLock;
use std::sync::Arc;
use tally_foundation::event::{selection, EventBus};
use tracing::info;

/// 활성 모델과 Backend
///
/// 값이 실제로 바뀔 때만 변경 이벤트를 발행합니다.
pub struct ModelSelection {
    model: RwLock<String>,
    backend: RwLock<String>,
    bus: Arc<EventBus>,
}

impl ModelSelection {
    pub fn new(model: impl Into<String>, backend: impl Into<String>, bus: Arc<EventBus>) -> Self {
        Self {
            model: RwLock::new(model.into()),
            backend: RwLock::new(backend.into()),
            bus,
        }
    }

    pub fn model(&self) -> String {
        self.model.read().clone()
    }

    pub fn backend(&self) -> String {
        self.backend.read().clone()
    }

    /// 모델 변경
    pub fn set_model(&self, model: impl Into<String>) -> bool {
        let model = model.into();
        let previous = {
            let mut current = self.model.write();
            if *current == model {
                return false;
            }
            std::mem::replace(&mut *current, model.clone())
        };

        info!(from = %previous, to = %model, "Active model changed");
        self.bus.publish(selection::model_changed(&previous, &model));
        true
    }

    /// Backend 변경
    pub fn set_backend(&self, backend: impl Into<String>) -> bool {
        let backend = backend.into();
        let previous = {
            let mut current = self.backend.write();
            if *current == backend {
                return false;
            }
            std::mem::replace(&mut *current, backend.clone())
        };

        info!(from = %previous, to = %backend, "Active backend changed");
        self.bus.publish(selection::backend_changed(&previous, &backend));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_publishes_once() {
        let bus = Arc::new(EventBus::new());
        let selection = ModelSelection::new("gpt-4o", "openai", bus.clone());

        assert!(!selection.set_model("gpt-4o"));
        assert!(selection.set_model("gpt-4o-mini"));
        assert!(selection.set_backend("azure"));
        assert!(!selection.set_backend("azure"));

        assert_eq!(selection.model(), "gpt-4o-mini");
        assert_eq!(selection.backend(), "azure");
        assert_eq!(bus.event_count(), 2);
    }
}
