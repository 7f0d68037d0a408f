pub mod unit;

// Common test utilities and shared test setup
use std::sync::Arc;
use uuid::Uuid;

use crate::AppState;
use crate::services::AutomationService;
use crate::store::MemoryAutomationStore;

pub struct TestContext {
    pub store: Arc<MemoryAutomationStore>,
    pub service: AutomationService,
    pub owner: Uuid,
}

impl TestContext {
    pub fn new() -> Self {
        init_test_logging();

        let store = Arc::new(MemoryAutomationStore::new());
        Self {
            service: AutomationService::new(store.clone()),
            store,
            owner: Uuid::new_v4(),
        }
    }

    /// The full application router over this context's store.
    pub fn app(&self) -> axum::Router {
        crate::build_router(Arc::new(AppState {
            automations: self.service.clone(),
        }))
    }
}

/// Route log output through the test harness so it shows up only for failing tests.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("churnlens_backend=debug")
        .try_init();
}
