//! The seam between cached state and the HTTP layer.

use std::sync::Arc;

use async_trait::async_trait;
use edutage_api::{ApiError, SchoolClient};
use edutage_types::ResourceKey;
use reqwest::Method;
use serde_json::Value;

/// Executes reads and writes against the backend.
///
/// The query cache only calls [`fetch`](ResourceTransport::fetch); the
/// mutation dispatcher only calls [`execute`](ResourceTransport::execute).
/// Tests substitute an in-memory implementation.
#[async_trait]
pub trait ResourceTransport: Send + Sync {
    /// Resolve a resource key to its payload (a GET with the key's query
    /// argument, when present).
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, ApiError>;

    /// Perform one write call.
    async fn execute(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError>;
}

/// Production transport backed by a [`SchoolClient`].
pub struct HttpTransport {
    client: Arc<SchoolClient>,
}

impl HttpTransport {
    pub fn new(client: Arc<SchoolClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceTransport for HttpTransport {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, ApiError> {
        self.client.get(key.endpoint(), key.params().as_ref()).await
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|error| ApiError::Network(format!("invalid method '{method}': {error}")))?;
        self.client.send(method, path, body).await
    }
}
