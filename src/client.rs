use std::time::Duration;

use log::debug;
use reqwest::Response;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::api::*;
use crate::error::ClientError;
use crate::settings::Settings;

type Result<T> = std::result::Result<T, ClientError>;

/// Async twin of the blocking client, used by the web UI.
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    client: reqwest::Client,
    predict_timeout: Duration,
    info_timeout: Duration,
    categories_timeout: Duration,
}
impl Client {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(ClientError::Request)?;
        Ok(Self {
            url: settings.api_url.clone(),
            client,
            predict_timeout: settings.predict_timeout(),
            info_timeout: settings.info_timeout(),
            categories_timeout: settings.categories_timeout(),
        })
    }
    pub fn url(&self) -> &str {
        &self.url
    }
    async fn post(
        &self,
        path: &'static str,
        request: impl Serialize,
        timeout: Duration,
    ) -> Result<Response> {
        let url = endpoint(&self.url, path);
        debug!("POST {} (timeout {:?})", url, timeout);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, &self.url))?;
        bail_if_err(response).await
    }
    async fn get(&self, path: &'static str, timeout: Duration) -> Result<Response> {
        let url = endpoint(&self.url, path);
        debug!("GET {} (timeout {:?})", url, timeout);
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, &self.url))?;
        bail_if_err(response).await
    }
    async fn json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::from_reqwest(e, &self.url))
    }
    pub async fn submit(&self, form: &TransactionForm) -> Result<PredictionResponse> {
        let request = form.validate()?;
        self.predict(&request).await
    }
    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let response = self.post("/predict", request, self.predict_timeout).await?;
        self.json(response).await
    }
    pub async fn model_info(&self) -> Result<ModelInfoResponse> {
        let response = self.get("/model-info", self.info_timeout).await?;
        self.json(response).await
    }
    pub async fn log_summary(&self) -> Result<LogSummaryResponse> {
        let response = self.get("/logs/summary", self.info_timeout).await?;
        self.json(response).await
    }
    pub async fn categories(&self) -> Vec<String> {
        let info = match self.get("/model-info", self.categories_timeout).await {
            Ok(response) => self.json::<Value>(response).await,
            Err(e) => Err(e),
        };
        categories_or_fallback(info)
    }
}

pub async fn bail_if_err(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let detail = response
            .text()
            .await
            .ok()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        Err(ClientError::Remote { status, detail })
    }
}
