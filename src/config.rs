use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use tracing::info;

use crate::domain::entities::query::DEFAULT_PAGE_SIZE;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub debounce: Duration,
    pub page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            debounce: Duration::from_millis(300),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let page_size: usize = try_load(&lookup, "INITIATIVES_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            anyhow::bail!("INITIATIVES_PAGE_SIZE must be greater than zero")
        }

        Ok(Self {
            api_url: lookup("INITIATIVES_API_URL").unwrap_or_else(|| {
                info!("INITIATIVES_API_URL not set, using default: {DEFAULT_API_URL}");
                defaults.api_url
            }),
            request_timeout: Duration::from_millis(try_load(
                &lookup,
                "INITIATIVES_REQUEST_TIMEOUT_MS",
                defaults.request_timeout.as_millis() as u64,
            )?),
            debounce: Duration::from_millis(try_load(
                &lookup,
                "INITIATIVES_DEBOUNCE_MS",
                defaults.debounce.as_millis() as u64,
            )?),
            page_size,
        })
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} value: {raw}")),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("vn", "initiatives", "initiatives")
        .ok_or_else(|| anyhow!("failed to resolve project directories"))
}

pub fn default_session_path() -> Result<PathBuf> {
    let dirs = project_dirs()?;
    Ok(dirs.data_local_dir().join("session.json"))
}

pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

pub fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}
