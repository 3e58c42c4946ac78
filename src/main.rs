use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use initiatives::app::App;
use initiatives::config::{default_session_path, default_webview_data_dir, AppConfig};
use initiatives::infra::http::client::ReqwestClient;
use initiatives::infra::registry::RequestRegistry;
use initiatives::infra::session::file::FileSessionStore;
use initiatives::usecase::ports::http::HttpClient;
use initiatives::usecase::ports::session::SessionStore;
use initiatives::usecase::services::controller::ControllerServices;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let _runtime_guard = runtime.enter();

    let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open(default_session_path()?));
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(&config, session)?);
    let registry = Arc::new(RequestRegistry::new(runtime.handle().clone()));
    let services = ControllerServices::new(registry, http).with_debounce(config.debounce);
    let webview_data_dir = default_webview_data_dir()?;

    info!(api_url = %config.api_url, "starting initiatives");
    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Initiatives"))
                .with_data_directory(webview_data_dir),
        )
        .with_context(config)
        .with_context(services)
        .launch(App);

    Ok(())
}
