use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::listing::ItemsResult;
use crate::domain::entities::query::ListQuery;
use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceMode {
    Local,
    Remote,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn key(&self) -> &str;

    fn mode(&self) -> DataSourceMode;

    fn debounce(&self) -> Option<Duration>;

    async fn fetch_page(&self, query: &ListQuery) -> Result<ItemsResult, FetchError>;
}
