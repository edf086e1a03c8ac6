use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::ports::AddressLookup;
use crate::services::{AddressCachePolicy, DdnsState};

/// Outcome of an address cache refresh cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddressCacheRefreshOutcome {
    pub candidates_found: usize,
    pub refreshed: usize,
    pub failed: usize,
    pub cache_size: usize,
}

pub struct RefreshAddressCacheUseCase {
    state: Arc<DdnsState>,
    lookup: Arc<dyn AddressLookup>,
    policy: AddressCachePolicy,
}

impl RefreshAddressCacheUseCase {
    pub fn new(state: Arc<DdnsState>, lookup: Arc<dyn AddressLookup>) -> Self {
        Self {
            state,
            lookup,
            policy: AddressCachePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AddressCachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves every due entry concurrently and waits for all of them.
    pub async fn execute(&self) -> AddressCacheRefreshOutcome {
        let due = self.state.due_address_cache_hosts(Instant::now());
        let mut outcome = AddressCacheRefreshOutcome {
            candidates_found: due.len(),
            cache_size: self.state.address_cache_len(),
            ..Default::default()
        };
        if due.is_empty() {
            return outcome;
        }

        let lookups = due.into_iter().map(|host| {
            let lookup = Arc::clone(&self.lookup);
            async move {
                let result = lookup.lookup(&host).await;
                (host, result)
            }
        });

        for (host, result) in join_all(lookups).await {
            if let Err(e) = &result {
                warn!(host = %host, error = %e, "Address cache lookup failed");
            }
            if self
                .state
                .complete_address_lookup(&host, result, Instant::now(), &self.policy)
            {
                outcome.refreshed += 1;
            } else {
                outcome.failed += 1;
            }
        }

        debug!(
            candidates = outcome.candidates_found,
            refreshed = outcome.refreshed,
            failed = outcome.failed,
            "Address cache cycle completed"
        );
        outcome
    }
}
