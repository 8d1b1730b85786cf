//! REST collection adapter
//!
//! Lists table rows through a PostgREST-style endpoint
//! (`GET {base}/rest/v1/{table}?select=*`).

use anyhow::Context;
use futures::future::BoxFuture;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::backend::CollectionSource;
use crate::config::Config;

#[derive(Debug, Clone)]
pub struct RestSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestSource {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.backend_url.clone(), config.backend_api_key.clone())
    }

    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    fn request(&self, collection: &str) -> RequestBuilder {
        let mut request = self
            .client
            .get(self.collection_url(collection))
            .query(&[("select", "*")]);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }
        request
    }
}

impl CollectionSource for RestSource {
    fn list(&self, collection: &str) -> BoxFuture<'static, anyhow::Result<Value>> {
        let request = self.request(collection);
        let collection = collection.to_string();

        Box::pin(async move {
            debug!(collection = %collection, "listing collection");
            let response = request
                .send()
                .await
                .with_context(|| format!("request for '{}' failed", collection))?
                .error_for_status()
                .with_context(|| format!("backend rejected '{}'", collection))?;

            response
                .json::<Value>()
                .await
                .with_context(|| format!("invalid JSON for '{}'", collection))
        })
    }
}
