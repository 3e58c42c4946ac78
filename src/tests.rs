use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::domain::entities::query::{FilterValues, PageRequest, SortSpec};
use crate::infra::registry::RequestRegistry;
use crate::usecase::ports::notifier::LOAD_FAILED_MESSAGE;
use crate::usecase::services::controller::{
    ControllerServices, DataSourceController, DataSourceProps, ListState, LoadStatus,
};

use self::support::{FakeHttp, RecordingNotifier};

pub mod support {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    use crate::error::FetchError;
    use crate::usecase::ports::http::{HttpClient, HttpResponse};
    use crate::usecase::ports::notifier::Notifier;

    #[derive(Debug, Clone)]
    enum Reply {
        Body(Value),
        Status(u16),
        Transport(String),
    }

    #[derive(Debug, Clone)]
    struct Route {
        reply: Reply,
        latency: Duration,
    }

    #[derive(Default)]
    pub struct FakeHttp {
        routes: Mutex<HashMap<String, Route>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeHttp {
        fn route(&self, key: &str, reply: Reply, latency: Duration) {
            self.routes
                .lock()
                .insert(key.to_string(), Route { reply, latency });
        }

        pub fn respond(&self, key: &str, body: Value) {
            self.route(key, Reply::Body(body), Duration::ZERO);
        }

        pub fn respond_after(&self, key: &str, body: Value, latency: Duration) {
            self.route(key, Reply::Body(body), latency);
        }

        pub fn fail_with_status(&self, key: &str, status: u16) {
            self.route(key, Reply::Status(status), Duration::ZERO);
        }

        pub fn fail_with_transport(&self, key: &str, message: &str) {
            self.route(key, Reply::Transport(message.to_string()), Duration::ZERO);
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl HttpClient for FakeHttp {
        async fn get(&self, path: &str) -> Result<HttpResponse, FetchError> {
            self.requests.lock().push(path.to_string());
            let key = path.split('?').next().unwrap_or(path);
            let route = self.routes.lock().get(key).cloned();
            let Route { reply, latency } = route.unwrap_or(Route {
                reply: Reply::Body(json!({"items": [], "total": 0})),
                latency: Duration::ZERO,
            });

            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }

            match reply {
                Reply::Body(body) => Ok(HttpResponse {
                    status: 200,
                    body: body.to_string().into_bytes(),
                }),
                Reply::Status(status) => Ok(HttpResponse {
                    status,
                    body: Vec::new(),
                }),
                Reply::Transport(message) => Err(FetchError::Transport(message)),
            }
        }
    }

    #[derive(Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn count(&self) -> usize {
            self.messages.lock().len()
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify_error(&self, message: &str) {
            self.messages.lock().push(message.to_string());
        }
    }
}

const PAST_DEBOUNCE: Duration = Duration::from_millis(350);

fn services(http: &Arc<FakeHttp>, notifier: &Arc<RecordingNotifier>) -> ControllerServices {
    ControllerServices::new(Arc::new(RequestRegistry::current()), http.clone())
        .with_notifier(notifier.clone())
}

async fn settled(controller: &DataSourceController) -> ListState {
    let mut receiver = controller.subscribe();
    let state = receiver
        .wait_for(|state| !state.loading)
        .await
        .expect("controller should still be publishing");
    state.clone()
}

fn names(state: &ListState) -> Vec<String> {
    state
        .items
        .iter()
        .map(|item| item["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn local_first_page_is_sorted_and_counts_everything() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let items: Vec<Value> = (1..=25)
        .rev()
        .map(|n| json!({"name": format!("user-{n:02}")}))
        .collect();

    let controller = DataSourceController::mount(
        DataSourceProps::local(items, "name").with_sort(SortSpec::ascending("name")),
        services(&http, &notifier),
    );
    let state = settled(&controller).await;

    assert_eq!(state.total(), 25);
    assert_eq!(state.items.len(), 10);
    let expected: Vec<String> = (1..=10).map(|n| format!("user-{n:02}")).collect();
    assert_eq!(names(&state), expected);
    assert!(http.requests().is_empty(), "local mode must not hit the network");
}

#[tokio::test(start_paused = true)]
async fn local_filter_change_resets_to_first_page() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let items = vec![
        json!({"name": "Solar", "status": "approved"}),
        json!({"name": "Carpool", "status": "pending"}),
        json!({"name": "Paperless", "status": "rejected"}),
    ];
    let controller = DataSourceController::mount(
        DataSourceProps::local(items, "name").with_page_size(2),
        services(&http, &notifier),
    );
    controller.set_pagination(PageRequest::new(2, 2));
    assert_eq!(settled(&controller).await.page(), 2);

    controller.set_filter_values(FilterValues::new().with("status", "approved"));
    let state = settled(&controller).await;

    assert_eq!(state.page(), 1);
    assert_eq!(state.total(), 1);
    assert_eq!(names(&state), vec!["Solar"]);
}

#[tokio::test(start_paused = true)]
async fn local_items_can_be_replaced() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = DataSourceController::mount(
        DataSourceProps::local(vec![json!({"name": "a"})], "name"),
        services(&http, &notifier),
    );
    assert_eq!(settled(&controller).await.total(), 1);

    controller.set_items(vec![json!({"name": "b"}), json!({"name": "c"})]);
    let state = settled(&controller).await;

    assert_eq!(state.total(), 2);
    assert_eq!(names(&state), vec!["b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn rapid_pagination_sends_only_the_last_request() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = DataSourceController::mount(
        DataSourceProps::remote("users", "name"),
        services(&http, &notifier),
    );

    controller.set_pagination(PageRequest::new(2, 10));
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.set_pagination(PageRequest::new(3, 20));
    tokio::time::sleep(PAST_DEBOUNCE).await;

    assert_eq!(http.requests(), vec!["users?limit=20&page=3".to_string()]);
    let state = controller.snapshot();
    assert_eq!(state.status, LoadStatus::Settled);
    assert_eq!(state.pagination.page_size, 20);
}

#[tokio::test(start_paused = true)]
async fn rapid_filter_changes_coalesce_into_one_request() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = DataSourceController::mount(
        DataSourceProps::remote("initiatives", "initiativeName"),
        services(&http, &notifier),
    );

    for text in ["s", "so", "solar roof"] {
        controller.set_filter_values(
            FilterValues::new()
                .with_query(text)
                .with("status", "approved"),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(PAST_DEBOUNCE).await;

    assert_eq!(
        http.requests(),
        vec![
            "initiatives?limit=10&filter=initiativeName|solar%20roof&filter=status|approved"
                .to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn switching_data_source_aborts_the_old_request() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    http.respond_after(
        "users",
        json!({"items": [{"name": "from-users"}], "total": 1}),
        Duration::from_millis(500),
    );
    http.respond_after(
        "roles",
        json!({"items": [{"name": "from-roles"}], "total": 1}),
        Duration::from_millis(100),
    );
    let registry = Arc::new(RequestRegistry::current());
    let controller = DataSourceController::mount(
        DataSourceProps::remote("users", "name"),
        ControllerServices::new(Arc::clone(&registry), http.clone())
            .with_notifier(notifier.clone()),
    );

    tokio::time::sleep(PAST_DEBOUNCE).await;
    assert!(registry.has_in_flight("users"));

    controller.set_data_source("roles");
    assert!(!registry.has_in_flight("users"));

    // Past the point where the users response would have landed.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(controller.snapshot().items.is_empty());

    let state = settled(&controller).await;
    assert_eq!(names(&state), vec!["from-roles"]);
    assert_eq!(controller.data_source(), "roles");
    assert_eq!(http.requests(), vec!["users?limit=10", "roles?limit=10"]);
    assert_eq!(notifier.count(), 0, "aborts are not user-visible errors");
}

#[tokio::test(start_paused = true)]
async fn network_failure_keeps_previous_items_and_notifies_once() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    http.respond(
        "roles",
        json!({"items": [{"name": "admin"}, {"name": "reviewer"}], "total": 2}),
    );
    let controller = DataSourceController::mount(
        DataSourceProps::remote("roles", "name"),
        services(&http, &notifier),
    );
    tokio::time::sleep(PAST_DEBOUNCE).await;
    assert_eq!(controller.snapshot().total(), 2);

    http.fail_with_transport("roles", "connection reset");
    controller.set_sort(Some(SortSpec::descending("name")));
    tokio::time::sleep(PAST_DEBOUNCE).await;

    let state = controller.snapshot();
    assert!(!state.loading);
    assert_eq!(state.status, LoadStatus::Failed);
    assert_eq!(names(&state), vec!["admin", "reviewer"]);
    assert_eq!(state.total(), 2);
    assert_eq!(notifier.messages(), vec![LOAD_FAILED_MESSAGE.to_string()]);

    http.respond("roles", json!({"items": [{"name": "reviewer"}], "total": 1}));
    controller.reload();
    tokio::time::sleep(PAST_DEBOUNCE).await;

    let recovered = controller.snapshot();
    assert_eq!(recovered.status, LoadStatus::Settled);
    assert_eq!(recovered.error, None);
    assert_eq!(names(&recovered), vec!["reviewer"]);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_never_committed() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    http.respond_after(
        "users",
        json!({"items": [{"name": "stale"}], "total": 1}),
        Duration::from_millis(200),
    );
    let controller = DataSourceController::mount(
        DataSourceProps::remote("users", "name"),
        services(&http, &notifier),
    );

    // Request issued at 300ms resolves at 500ms; the sort change lands in between.
    tokio::time::sleep(Duration::from_millis(400)).await;
    controller.set_sort(Some(SortSpec::ascending("email")));
    tokio::time::sleep(Duration::from_millis(150)).await;

    let state = controller.snapshot();
    assert!(state.items.is_empty());
    assert!(state.loading);
    assert!(state.first_load);

    http.respond("users", json!({"items": [{"name": "fresh"}], "total": 1}));
    let state = settled(&controller).await;
    assert_eq!(names(&state), vec!["fresh"]);
}

#[tokio::test(start_paused = true)]
async fn unmounting_mid_flight_is_silent() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    http.respond_after(
        "users",
        json!({"items": [{"name": "late"}], "total": 1}),
        Duration::from_millis(500),
    );
    let registry = Arc::new(RequestRegistry::current());
    let controller = DataSourceController::mount(
        DataSourceProps::remote("users", "name"),
        ControllerServices::new(Arc::clone(&registry), http.clone())
            .with_notifier(notifier.clone()),
    );
    let mut receiver = controller.subscribe();

    tokio::time::sleep(PAST_DEBOUNCE).await;
    controller.unmount();
    assert!(!controller.is_mounted());
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(registry.is_idle());
    assert!(receiver.borrow_and_update().items.is_empty());
    assert_eq!(notifier.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn server_paths_with_query_strings_are_extended() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = DataSourceController::mount(
        DataSourceProps::remote("users?department=hr", "name").abbreviated(),
        services(&http, &notifier),
    );
    controller.set_pagination(PageRequest::new(2, 10));
    tokio::time::sleep(PAST_DEBOUNCE).await;

    assert_eq!(
        http.requests(),
        vec!["users?department=hr&limit=10&abbreviated=true&page=2"]
    );
}

#[tokio::test(start_paused = true)]
async fn local_page_far_past_the_end_settles_empty() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let items = vec![
        json!({"name": "a"}),
        json!({"name": "b"}),
        json!({"name": "c"}),
    ];
    let controller = DataSourceController::mount(
        DataSourceProps::local(items, "name"),
        services(&http, &notifier),
    );
    assert_eq!(settled(&controller).await.total(), 3);

    controller.set_pagination(PageRequest::new(usize::MAX, 10));
    tokio::time::sleep(Duration::from_secs(1)).await;

    let state = controller.snapshot();
    assert!(!state.loading);
    assert_eq!(state.status, LoadStatus::Settled);
    assert!(state.items.is_empty());
    assert_eq!(state.total(), 3);
    assert_eq!(notifier.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn list_whose_timer_is_taken_over_stops_loading() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    http.respond("users", json!({"items": [{"name": "Lan"}], "total": 1}));
    let shared = services(&http, &notifier);

    let first = DataSourceController::mount(DataSourceProps::remote("users", "name"), shared.clone());
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = DataSourceController::mount(DataSourceProps::remote("users", "name"), shared);
    tokio::time::sleep(PAST_DEBOUNCE).await;

    assert_eq!(http.requests(), vec!["users?limit=10"]);
    let first_state = first.snapshot();
    assert!(!first_state.loading);
    assert_eq!(first_state.status, LoadStatus::Idle);
    assert!(first_state.items.is_empty());

    let second_state = second.snapshot();
    assert_eq!(second_state.status, LoadStatus::Settled);
    assert_eq!(names(&second_state), vec!["Lan"]);
    assert_eq!(notifier.count(), 0);

    first.reload();
    tokio::time::sleep(PAST_DEBOUNCE).await;
    assert_eq!(names(&first.snapshot()), vec!["Lan"]);
}

#[tokio::test(start_paused = true)]
async fn list_whose_request_is_superseded_by_another_stops_loading() {
    let http = Arc::new(FakeHttp::default());
    let notifier = Arc::new(RecordingNotifier::default());
    http.respond_after(
        "users",
        json!({"items": [{"name": "Lan"}], "total": 1}),
        Duration::from_millis(500),
    );
    let shared = services(&http, &notifier);

    let first = DataSourceController::mount(DataSourceProps::remote("users", "name"), shared.clone());
    tokio::time::sleep(PAST_DEBOUNCE).await;
    let second = DataSourceController::mount(DataSourceProps::remote("users", "name"), shared);

    // The second list's request goes out at 650ms and aborts the first one.
    tokio::time::sleep(Duration::from_millis(350)).await;
    let first_state = first.snapshot();
    assert!(!first_state.loading);
    assert_eq!(first_state.status, LoadStatus::Idle);

    let second_state = settled(&second).await;
    assert_eq!(names(&second_state), vec!["Lan"]);
    assert!(first.snapshot().items.is_empty());
    assert_eq!(http.requests().len(), 2);
    assert_eq!(notifier.count(), 0);
}
