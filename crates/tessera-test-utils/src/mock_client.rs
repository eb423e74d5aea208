// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock data client for deterministic testing.
//!
//! `MockDataClient` implements `DataClient` with pre-configured responses and
//! records every request it serves.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use tessera_core::TesseraError;
use tessera_plugin::{DataClient, Method};

/// A recorded request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub payload: Option<Value>,
}

/// A data client that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty the
/// request is echoed back as `{"method", "endpoint"}`.
pub struct MockDataClient {
    responses: Arc<Mutex<VecDeque<Value>>>,
    requests: Arc<Mutex<Vec<Request>>>,
    unsupported: HashSet<Method>,
}

impl MockDataClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            unsupported: HashSet::new(),
        }
    }

    /// Create a mock client pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<Value>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Self::new()
        }
    }

    /// Report `method` as not implemented by this client.
    pub fn without(mut self, method: Method) -> Self {
        self.unsupported.insert(method);
        self
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockDataClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataClient for MockDataClient {
    fn supports(&self, method: Method) -> bool {
        !self.unsupported.contains(&method)
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Value, TesseraError> {
        self.requests.lock().await.push(Request {
            method,
            endpoint: endpoint.to_string(),
            payload,
        });
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| json!({ "method": method.to_string(), "endpoint": endpoint })))
    }
}
