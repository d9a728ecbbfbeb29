//! HTTP implementations of the remote source traits.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use shared::domain::{FactPayload, ImagePayload};

use crate::outcome::{classify_json, Outcome};
use crate::{FactSource, ImageSource};

/// Cat-fact endpoint client (`GET {base}/fact`).
pub struct HttpFactSource {
    http: Client,
    base_url: Url,
}

impl HttpFactSource {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        join_path(&self.base_url, "fact")
    }
}

#[async_trait]
impl FactSource for HttpFactSource {
    async fn fetch_fact(&self) -> Outcome<FactPayload> {
        let result = self.http.get(self.endpoint()).send().await;
        classify_json(result).await
    }
}

/// Random-image endpoint client (`GET {base}/v1/images/search`).
pub struct HttpImageSource {
    http: Client,
    base_url: Url,
}

impl HttpImageSource {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        join_path(&self.base_url, "v1/images/search")
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch_random_images(&self) -> Outcome<Vec<ImagePayload>> {
        let result = self.http.get(self.endpoint()).send().await;
        classify_json(result).await
    }
}

fn join_path(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
