//! Test harness backed by the in-process store.
//!
//! Every test gets its own empty `MemoryStore`, so tests can reuse ids
//! freely and run in parallel.

use std::sync::Arc;

use axum::Router;
use review_core::kernel::{MemoryStore, ServerDeps};
use review_core::server::build_app;
use review_core::server::middleware::HttpMetrics;
use test_context::AsyncTestContext;

/// Initialize tracing to respect RUST_LOG.
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let pr = create_pull_request("pr-1", "Add search", "u1", &ctx.deps).await;
/// }
/// ```
pub struct TestHarness {
    /// Direct store handle - use this to inspect committed state.
    pub store: MemoryStore,
    /// Dependencies handed to activities.
    pub deps: ServerDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // Store is dropped with the harness
    }
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let store = MemoryStore::new();
        let deps = ServerDeps::new(Arc::new(store.clone()));
        Self { store, deps }
    }

    /// Router wired to this harness's store, with its own metrics registry.
    pub fn app(&self) -> Router {
        app_for(self.deps.clone())
    }
}

/// Router over arbitrary dependencies.
pub fn app_for(deps: ServerDeps) -> Router {
    let metrics = HttpMetrics::new().expect("Failed to register metrics");
    build_app(deps, Arc::new(metrics), &[])
}
