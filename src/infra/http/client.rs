use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::usecase::ports::http::{HttpClient, HttpResponse};
use crate::usecase::ports::session::SessionStore;

pub struct ReqwestClient {
    base_url: String,
    client: reqwest::Client,
    session: Arc<dyn SessionStore>,
}

impl ReqwestClient {
    pub fn new(config: &AppConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            base_url: config.api_url.clone(),
            client,
            session,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, path: &str) -> Result<HttpResponse, FetchError> {
        let mut request = self
            .client
            .get(self.url_for(path))
            .header(ACCEPT, "application/json");
        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}
