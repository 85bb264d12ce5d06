//! Server dependencies for activities (using traits for testability)

use std::sync::Arc;

use crate::kernel::BaseReviewStore;

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseReviewStore>,
}

impl ServerDeps {
    pub fn new(store: Arc<dyn BaseReviewStore>) -> Self {
        Self { store }
    }
}
