use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::entities::listing::ItemsResult;
use crate::domain::entities::query::ListQuery;
use crate::error::FetchError;
use crate::infra::registry::{OwnerId, RequestRegistry};
use crate::usecase::ports::data_source::{DataSource, DataSourceMode};
use crate::usecase::ports::http::HttpClient;
use crate::usecase::services::query_builder::{build_remote_query, QueryOptions};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct RemoteHttpDataSource {
    key: String,
    owner: OwnerId,
    options: QueryOptions,
    debounce: Duration,
    http: Arc<dyn HttpClient>,
    registry: Arc<RequestRegistry>,
}

impl RemoteHttpDataSource {
    pub fn new(
        key: impl Into<String>,
        owner: OwnerId,
        options: QueryOptions,
        http: Arc<dyn HttpClient>,
        registry: Arc<RequestRegistry>,
    ) -> Self {
        Self {
            key: key.into(),
            owner,
            options,
            debounce: DEFAULT_DEBOUNCE,
            http,
            registry,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[async_trait]
impl DataSource for RemoteHttpDataSource {
    fn key(&self) -> &str {
        &self.key
    }

    fn mode(&self) -> DataSourceMode {
        DataSourceMode::Remote
    }

    fn debounce(&self) -> Option<Duration> {
        Some(self.debounce)
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<ItemsResult, FetchError> {
        let url = build_remote_query(query, &self.options).url_for(&self.key);
        let request = self.registry.supersede(&self.key, self.owner);
        debug!(data_source = %self.key, %url, "issuing request");

        let outcome = tokio::select! {
            biased;
            _ = request.cancelled() => Err(FetchError::Cancelled),
            response = self.http.get(&url) => response,
        };
        self.registry.complete(&request);

        // A response that raced its own abort is still discarded.
        if request.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let response = outcome?;
        if !response.is_success() {
            return Err(FetchError::Server {
                status: response.status,
            });
        }

        decode_page(&response.body)
    }
}

pub fn decode_page(body: &[u8]) -> Result<ItemsResult, FetchError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| FetchError::MalformedResponse(err.to_string()))?;
    let Value::Object(mut envelope) = value else {
        return Err(FetchError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let items = match envelope.remove("items") {
        Some(Value::Array(items)) => items,
        other => {
            warn!(found = ?other.map(|v| v.to_string()), "response has no items array");
            Vec::new()
        }
    };
    let total = match envelope.get("total").and_then(Value::as_u64) {
        Some(total) => total,
        None => {
            warn!("response has no numeric total");
            0
        }
    };

    Ok(ItemsResult { items, total })
}
