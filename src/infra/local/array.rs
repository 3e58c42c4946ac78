use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::entities::listing::{ItemsResult, Record};
use crate::domain::entities::query::ListQuery;
use crate::error::FetchError;
use crate::usecase::ports::data_source::{DataSource, DataSourceMode};
use crate::usecase::services::local_processor::process;
use crate::usecase::services::query_builder::{build_local_plan, QueryOptions};

pub struct LocalArrayDataSource {
    items: RwLock<Arc<Vec<Record>>>,
    options: QueryOptions,
}

impl LocalArrayDataSource {
    pub fn new(items: Vec<Record>, options: QueryOptions) -> Self {
        Self {
            items: RwLock::new(Arc::new(items)),
            options,
        }
    }

    pub fn replace(&self, items: Vec<Record>) {
        *self.items.write() = Arc::new(items);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl DataSource for LocalArrayDataSource {
    fn key(&self) -> &str {
        ""
    }

    fn mode(&self) -> DataSourceMode {
        DataSourceMode::Local
    }

    fn debounce(&self) -> Option<Duration> {
        None
    }

    async fn fetch_page(&self, query: &ListQuery) -> Result<ItemsResult, FetchError> {
        let items = Arc::clone(&self.items.read());
        let plan = build_local_plan(query, &self.options);
        Ok(process(&items, &plan, &query.pagination))
    }
}
