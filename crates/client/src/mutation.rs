//! Write execution with tag invalidation.

use std::sync::Arc;

use edutage_api::ApiError;
use edutage_types::{EndpointSpec, Tag};
use serde_json::Value;
use tracing::debug;

use crate::cache::QueryCache;
use crate::transport::ResourceTransport;

/// Everything needed to perform one write: where, how, the payload, and the
/// tags to mark stale on success. Built from an [`EndpointSpec`] and
/// discarded after the call.
#[derive(Debug, Clone)]
pub struct MutationDescriptor {
    pub endpoint: String,
    pub method: String,
    pub body: Option<Value>,
    pub invalidates: Vec<Tag>,
}

impl MutationDescriptor {
    /// Descriptor for an endpoint without a path parameter.
    pub fn from_spec(spec: &EndpointSpec, body: Option<Value>) -> Self {
        Self {
            endpoint: spec.path.to_string(),
            method: spec.method.to_string(),
            body,
            invalidates: spec.invalidates.to_vec(),
        }
    }

    /// Descriptor for an endpoint whose path carries an `{id}`.
    pub fn from_spec_with_id(spec: &EndpointSpec, id: &str, body: Option<Value>) -> Self {
        Self {
            endpoint: spec.path_for(id),
            ..Self::from_spec(spec, body)
        }
    }
}

/// Runs mutations and keeps the query cache honest afterwards.
#[derive(Clone)]
pub struct MutationDispatcher {
    transport: Arc<dyn ResourceTransport>,
    cache: QueryCache,
}

impl MutationDispatcher {
    pub fn new(transport: Arc<dyn ResourceTransport>, cache: QueryCache) -> Self {
        Self { transport, cache }
    }

    /// Perform exactly one request.
    ///
    /// On HTTP success the descriptor's tags are invalidated before this
    /// returns, so any view that re-renders afterwards observes fresh data
    /// or a `Loading` state, never a silently stale payload. A failed call
    /// invalidates nothing. There is no automatic retry; callers that need
    /// ordering across overlapping mutations must serialize themselves.
    pub async fn execute(&self, descriptor: MutationDescriptor) -> Result<Value, ApiError> {
        debug!(
            endpoint = %descriptor.endpoint,
            method = %descriptor.method,
            "mutation started"
        );
        let value = self
            .transport
            .execute(
                &descriptor.method,
                &descriptor.endpoint,
                descriptor.body.as_ref(),
            )
            .await?;

        if !descriptor.invalidates.is_empty() {
            debug!(
                endpoint = %descriptor.endpoint,
                tags = ?descriptor.invalidates,
                "mutation succeeded; invalidating tags"
            );
            self.cache.invalidate(&descriptor.invalidates);
        }
        Ok(value)
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}
