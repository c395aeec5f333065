//! Business logic services.
//!
//! - `selector`: reviewer choice over a candidate pool
//! - `lifecycle`: pull request creation, merge and reassignment
//! - `query`: read-only team and assignment lookups
//! - `teams`: team creation and user activation
//!
//! Services only depend on the [`ReviewStore`] trait and are independent of
//! the HTTP layer.

pub mod lifecycle;
pub mod query;
pub mod selector;
pub mod teams;

use std::sync::Arc;

use crate::store::ReviewStore;

pub use lifecycle::{PullRequestService, Reassignment};
pub use query::{QueryService, ReviewAssignments};
pub use selector::ReviewerSelector;
pub use teams::TeamService;

/// All services sharing one store and one selector.
#[derive(Clone)]
pub struct Services {
    pub teams: TeamService,
    pub pull_requests: PullRequestService,
    pub queries: QueryService,
    store: Arc<dyn ReviewStore>,
}

impl Services {
    pub fn new(
        store: Arc<dyn ReviewStore>,
        selector: ReviewerSelector,
        max_update_attempts: u32,
    ) -> Self {
        Self {
            teams: TeamService::new(store.clone()),
            pull_requests: PullRequestService::new(
                store.clone(),
                Arc::new(selector),
                max_update_attempts,
            ),
            queries: QueryService::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn ReviewStore> {
        &self.store
    }
}
