//! In-memory transport for unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::error::ApiError;
use super::transport::{ApiRequest, ApiTransport};

type Handler = Box<dyn Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync>;

/// Answers every request with a handler and records what was sent
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> Result<Value, ApiError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Transport whose every call fails with the given status
    pub fn failing(status: u16) -> Arc<Self> {
        Self::new(move |_| {
            Err(ApiError::Status {
                status,
                body: "unavailable".to_string(),
            })
        })
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let response = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

/// Records `{id, uuid, createdAt}` numbered from `start`
pub fn numbered_records(start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|id| {
            json!({
                "id": id,
                "uuid": format!("uuid-{}", id),
                "createdAt": "2024-01-01T00:00:00.000Z"
            })
        })
        .collect()
}

/// Serve a table of `total` records in pages, honouring `first` and `after`
///
/// Cursors are the index of the next record.
pub fn paged_table(total: usize) -> impl Fn(&ApiRequest) -> Result<Value, ApiError> {
    move |request| {
        let first: usize = request
            .param("first")
            .and_then(|f| f.parse().ok())
            .unwrap_or(10);
        let start: usize = request
            .param("after")
            .and_then(|c| c.parse::<usize>().ok())
            .unwrap_or(0)
            .min(total);
        let end = (start + first).min(total);
        Ok(json!({
            "totalCount": total,
            "records": numbered_records(start, end - start),
            "pageInfo": {
                "hasNextPage": end < total,
                "hasPreviousPage": start > 0,
                "endCursor": end.to_string()
            }
        }))
    }
}
