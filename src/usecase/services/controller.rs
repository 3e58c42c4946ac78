use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::domain::entities::listing::{ItemsResult, Record};
use crate::domain::entities::query::{
    FilterValues, ListQuery, PageRequest, PaginationState, SortSpec, DEFAULT_PAGE_SIZE,
};
use crate::error::FetchError;
use crate::infra::http::remote::{RemoteHttpDataSource, DEFAULT_DEBOUNCE};
use crate::infra::local::array::LocalArrayDataSource;
use crate::infra::registry::{OwnerId, RequestRegistry};
use crate::usecase::ports::data_source::{DataSource, DataSourceMode};
use crate::usecase::ports::http::HttpClient;
use crate::usecase::ports::notifier::{Notifier, TracingNotifier, LOAD_FAILED_MESSAGE};
use crate::usecase::services::query_builder::QueryOptions;

#[derive(Debug, Clone, PartialEq)]
pub struct DataSourceProps {
    pub query_key: String,
    pub data_source: String,
    pub only_local_data: bool,
    pub items: Vec<Record>,
    pub sort: Option<SortSpec>,
    pub abbreviated: bool,
    pub page_size: usize,
}

impl DataSourceProps {
    pub fn remote(data_source: impl Into<String>, query_key: impl Into<String>) -> Self {
        Self {
            query_key: query_key.into(),
            data_source: data_source.into(),
            only_local_data: false,
            items: Vec::new(),
            sort: None,
            abbreviated: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn local(items: Vec<Record>, query_key: impl Into<String>) -> Self {
        Self {
            only_local_data: true,
            items,
            ..Self::remote(String::new(), query_key)
        }
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn abbreviated(mut self) -> Self {
        self.abbreviated = true;
        self
    }
}

#[derive(Clone)]
pub struct ControllerServices {
    pub registry: Arc<RequestRegistry>,
    pub http: Arc<dyn HttpClient>,
    pub notifier: Arc<dyn Notifier>,
    pub debounce: Duration,
}

impl ControllerServices {
    pub fn new(registry: Arc<RequestRegistry>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            registry,
            http,
            notifier: Arc::new(TracingNotifier),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Settled,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub items: Vec<Record>,
    pub loading: bool,
    pub first_load: bool,
    pub status: LoadStatus,
    pub pagination: PaginationState,
    pub sort: Option<SortSpec>,
    pub filter_values: FilterValues,
    pub query_key: String,
    pub error: Option<String>,
}

impl ListState {
    fn initial(props: &DataSourceProps) -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            first_load: true,
            status: LoadStatus::Idle,
            pagination: PaginationState::with_page_size(props.page_size),
            sort: props.sort.clone(),
            filter_values: FilterValues::new(),
            query_key: props.query_key.clone(),
            error: None,
        }
    }

    pub fn total(&self) -> u64 {
        self.pagination.total
    }

    pub fn page(&self) -> usize {
        self.pagination.current_page
    }

    pub fn query(&self) -> ListQuery {
        ListQuery {
            pagination: self.pagination,
            sort: self.sort.clone(),
            filters: self.filter_values.clone(),
        }
    }
}

struct Shared {
    owner: OwnerId,
    options: QueryOptions,
    services: ControllerServices,
    source: RwLock<Arc<dyn DataSource>>,
    local: Option<Arc<LocalArrayDataSource>>,
    state: watch::Sender<ListState>,
    generation: AtomicU64,
    mounted: AtomicBool,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.mounted.load(Ordering::Acquire) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn refresh(self: &Arc<Self>) {
        if !self.mounted.load(Ordering::Acquire) {
            return;
        }

        let mut generation = 0;
        let mut query = ListQuery::default();
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            state.status = LoadStatus::Loading;
            query = state.query();
        });

        let source: Arc<dyn DataSource> = self.source.read().clone();
        let shared = Arc::clone(self);
        let task_source = Arc::clone(&source);
        let pending = PendingFetch {
            shared: Arc::clone(self),
            generation,
            finished: false,
        };
        let task = async move {
            shared.run(task_source, query, generation).await;
            pending.finish();
        };

        match source.debounce() {
            Some(delay) => self
                .services
                .registry
                .schedule(source.key(), self.owner, delay, task),
            None => self.services.registry.spawn(task),
        }
    }

    async fn run(self: Arc<Self>, source: Arc<dyn DataSource>, query: ListQuery, generation: u64) {
        match source.fetch_page(&query).await {
            Ok(page) => self.commit(page, generation),
            Err(FetchError::Cancelled) => {
                debug!(data_source = source.key(), generation, "fetch cancelled");
                self.displaced(generation);
            }
            Err(err) => self.fail(source.key(), err, generation),
        }
    }

    fn commit(&self, page: ItemsResult, generation: u64) {
        let committed = self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            state.items = page.items;
            state.pagination.total = page.total;
            state.loading = false;
            state.first_load = false;
            state.status = LoadStatus::Settled;
            state.error = None;
            true
        });

        if !committed {
            debug!(generation, "discarded stale page");
        }
    }

    // Another list on the same key replaced this fetch; nothing will settle it.
    fn displaced(&self, generation: u64) {
        let released = self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            state.loading = false;
            state.status = LoadStatus::Idle;
            true
        });

        if released {
            debug!(generation, "fetch displaced by another list on the same key");
        }
    }

    fn fail(&self, data_source: &str, err: FetchError, generation: u64) {
        let surfaced = self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            state.loading = false;
            state.status = LoadStatus::Failed;
            state.error = Some(LOAD_FAILED_MESSAGE.to_string());
            true
        });

        if surfaced {
            error!(data_source, "[Data Fetch Error]: {err}");
            self.services.notifier.notify_error(LOAD_FAILED_MESSAGE);
        } else {
            debug!(data_source, generation, "ignored failure of a superseded fetch: {err}");
        }
    }
}

struct PendingFetch {
    shared: Arc<Shared>,
    generation: u64,
    finished: bool,
}

impl PendingFetch {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for PendingFetch {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.displaced(self.generation);
        }
    }
}

pub struct DataSourceController {
    shared: Arc<Shared>,
}

impl DataSourceController {
    pub fn mount(props: DataSourceProps, services: ControllerServices) -> Self {
        let owner = services.registry.register_owner();
        let options = QueryOptions {
            abbreviated: props.abbreviated,
            ..QueryOptions::new(props.query_key.clone())
        };

        let (local, source): (Option<Arc<LocalArrayDataSource>>, Arc<dyn DataSource>) =
            if props.only_local_data {
                let local = Arc::new(LocalArrayDataSource::new(
                    props.items.clone(),
                    options.clone(),
                ));
                (Some(Arc::clone(&local)), local)
            } else {
                let remote = remote_source(&props.data_source, owner, &options, &services);
                (None, Arc::new(remote))
            };

        let (state, _) = watch::channel(ListState::initial(&props));
        let controller = Self {
            shared: Arc::new(Shared {
                owner,
                options,
                services,
                source: RwLock::new(source),
                local,
                state,
                generation: AtomicU64::new(0),
                mounted: AtomicBool::new(true),
            }),
        };
        controller.shared.refresh();
        controller
    }

    pub fn mode(&self) -> DataSourceMode {
        self.shared.source.read().mode()
    }

    pub fn data_source(&self) -> String {
        self.shared.source.read().key().to_string()
    }

    pub fn snapshot(&self) -> ListState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.shared.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::Acquire)
    }

    pub fn set_pagination(&self, request: PageRequest) {
        self.shared
            .state
            .send_modify(|state| state.pagination.apply(request));
        self.shared.refresh();
    }

    pub fn set_sort(&self, sort: Option<SortSpec>) {
        self.shared.state.send_modify(|state| state.sort = sort);
        self.shared.refresh();
    }

    pub fn set_filter_values(&self, filter_values: FilterValues) {
        self.shared.state.send_modify(|state| {
            state.filter_values = filter_values;
            state.pagination.current_page = 1;
        });
        self.shared.refresh();
    }

    pub fn set_items(&self, items: Vec<Record>) {
        let Some(local) = &self.shared.local else {
            warn!("set_items ignored: controller is in remote mode");
            return;
        };
        local.replace(items);
        self.shared.refresh();
    }

    pub fn set_data_source(&self, data_source: impl Into<String>) {
        let data_source = data_source.into();
        if self.shared.local.is_some() {
            warn!(data_source, "set_data_source ignored: controller is in local mode");
            return;
        }

        let previous = self.data_source();
        if previous == data_source {
            return;
        }

        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared
            .services
            .registry
            .release(&previous, self.shared.owner);
        let remote = remote_source(
            &data_source,
            self.shared.owner,
            &self.shared.options,
            &self.shared.services,
        );
        *self.shared.source.write() = Arc::new(remote);
        debug!(from = %previous, to = %data_source, "data source switched");
        self.shared.refresh();
    }

    pub fn reload(&self) {
        self.shared.refresh();
    }

    pub fn unmount(&self) {
        if !self.shared.mounted.swap(false, Ordering::AcqRel) {
            return;
        }
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        let key = self.data_source();
        if self.shared.local.is_none() {
            self.shared.services.registry.release(&key, self.shared.owner);
        }
        self.shared.state.send_modify(|state| state.loading = false);
        debug!(data_source = %key, "controller unmounted");
    }
}

impl Drop for DataSourceController {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn remote_source(
    data_source: &str,
    owner: OwnerId,
    options: &QueryOptions,
    services: &ControllerServices,
) -> RemoteHttpDataSource {
    RemoteHttpDataSource::new(
        data_source,
        owner,
        options.clone(),
        Arc::clone(&services.http),
        Arc::clone(&services.registry),
    )
    .with_debounce(services.debounce)
}
