use std::time::Duration;

use log::debug;
use reqwest::blocking::Response;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::api::*;
use crate::error::ClientError;
use crate::settings::Settings;

type Result<T> = std::result::Result<T, ClientError>;

/// Blocking client for the prediction service. Every call sends exactly one
/// request and holds no connection once it returns.
#[derive(Debug)]
pub struct Client {
    url: String,
    client: reqwest::blocking::Client,
    predict_timeout: Duration,
    info_timeout: Duration,
    categories_timeout: Duration,
}
impl Client {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
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
    fn post(&self, path: &'static str, request: impl Serialize, timeout: Duration) -> Result<Response> {
        let url = endpoint(&self.url, path);
        debug!("POST {} (timeout {:?})", url, timeout);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .map_err(|e| ClientError::from_reqwest(e, &self.url))?;
        bail_if_err(response)
    }
    fn get(&self, path: &'static str, timeout: Duration) -> Result<Response> {
        let url = endpoint(&self.url, path);
        debug!("GET {} (timeout {:?})", url, timeout);
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .map_err(|e| ClientError::from_reqwest(e, &self.url))?;
        bail_if_err(response)
    }
    fn json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        response
            .json::<T>()
            .map_err(|e| ClientError::from_reqwest(e, &self.url))
    }
    /// Validates the form and asks the service for a verdict.
    pub fn submit(&self, form: &TransactionForm) -> Result<PredictionResponse> {
        let request = form.validate()?;
        self.predict(&request)
    }
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        let response = self.post("/predict", request, self.predict_timeout)?;
        self.json(response)
    }
    pub fn model_info(&self) -> Result<ModelInfoResponse> {
        let response = self.get("/model-info", self.info_timeout)?;
        self.json(response)
    }
    pub fn log_summary(&self) -> Result<LogSummaryResponse> {
        let response = self.get("/logs/summary", self.info_timeout)?;
        self.json(response)
    }
    /// Never fails, see [`categories_or_fallback`].
    pub fn categories(&self) -> Vec<String> {
        let info = self
            .get("/model-info", self.categories_timeout)
            .and_then(|response| self.json::<Value>(response));
        categories_or_fallback(info)
    }
}

fn bail_if_err(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let detail = response
            .text()
            .ok()
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
        Err(ClientError::Remote { status, detail })
    }
}

#[cfg(test)]
mod test {
    use std::time::Instant;

    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::mock::*;

    fn client_for(url: &str) -> Client {
        let settings = Settings {
            api_url: url.to_string(),
            predict_timeout_secs: 1,
            info_timeout_secs: 1,
            categories_timeout_secs: 1,
            ..Default::default()
        };
        Client::new(&settings).unwrap()
    }

    #[test]
    fn submit_sends_one_prediction() {
        let (_runtime, api) = run_mock_blocking(MockBehaviour::predicting(json!({
            "label": "legit",
            "score": 0.92
        })));
        let client = client_for(&api.url);
        let form = TransactionForm {
            amount: 120.50,
            category: "grocery".into(),
            ..Default::default()
        };
        let response = client.submit(&form).unwrap();
        assert_eq!(response.verdict, "legit");
        assert_eq!(response.ensemble_probability, 0.92);
        assert_eq!(api.predictions(), 1);
        let sent = api.last_request().unwrap();
        assert_eq!(sent["category"], "grocery");
        assert_eq!(sent["amount"], 120.5);
        assert_eq!(sent["age_at_transaction"], 35.0);
        assert_eq!(sent["trans_freq"], 3.0);
    }

    #[test]
    fn invalid_form_sends_nothing() {
        let (_runtime, api) = run_mock_blocking(MockBehaviour::default());
        let client = client_for(&api.url);
        let form = TransactionForm {
            amount: 60000.0,
            ..Default::default()
        };
        let err = client.submit(&form).unwrap_err();
        assert!(matches!(err, ClientError::Invalid(_)));
        assert_eq!(api.predictions(), 0);
    }

    #[test]
    fn slow_api_times_out() {
        let (_runtime, api) = run_mock_blocking(MockBehaviour {
            delay: Duration::from_secs(4),
            ..Default::default()
        });
        let client = client_for(&api.url);
        let started = Instant::now();
        let err = client.submit(&TransactionForm::default()).unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(
            err.to_string(),
            "Request timed out. The API may be waking up - try again."
        );
    }

    #[test]
    #[ignore = "waits for the full 30 second timeout"]
    fn cold_start_hits_default_timeout() {
        let (_runtime, api) = run_mock_blocking(MockBehaviour {
            delay: Duration::from_secs(40),
            ..Default::default()
        });
        let settings = Settings {
            api_url: api.url.clone(),
            ..Default::default()
        };
        let client = Client::new(&settings).unwrap();
        let started = Instant::now();
        let err = client.submit(&TransactionForm::default()).unwrap_err();
        let elapsed = started.elapsed();
        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(elapsed >= Duration::from_secs(29) && elapsed < Duration::from_secs(35));
    }

    #[test]
    fn unreachable_api() {
        let url = unreachable_url();
        let client = client_for(&url);
        let err = client.submit(&TransactionForm::default()).unwrap_err();
        assert!(matches!(err, ClientError::Connection { .. }));
        assert_eq!(err.to_string(), format!("Cannot connect to API at {}", url));
        assert!(err.hint().is_some());
    }

    #[test]
    fn remote_error_keeps_detail() {
        let (_runtime, api) = run_mock_blocking(MockBehaviour {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: r#"{"detail":"amount must be positive"}"#.into(),
            ..Default::default()
        });
        let client = client_for(&api.url);
        match client.submit(&TransactionForm::default()).unwrap_err() {
            ClientError::Remote { status, detail } => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert!(detail.contains("amount must be positive"));
            }
            e => panic!("Expected remote error, got {:?}", e),
        }
    }

    #[test]
    fn garbage_body_is_a_decode_error() {
        let (_runtime, api) = run_mock_blocking(MockBehaviour {
            body: "<html>Service waking up</html>".into(),
            ..Default::default()
        });
        let client = client_for(&api.url);
        let err = client.submit(&TransactionForm::default()).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn truncated_body_is_a_decode_error() {
        let client = client_for(&truncated_body_url());
        let err = client.submit(&TransactionForm::default()).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)), "got {:?}", err);
        assert_eq!(err.to_string(), "Unexpected response from API");
        assert!(!err.is_cold_start());
    }

    #[test]
    fn stats_and_categories() {
        let (_runtime, api) = run_mock_blocking(MockBehaviour::default());
        let client = client_for(&api.url);
        assert_eq!(client.categories(), vec!["Electronics", "Grocery"]);
        assert_eq!(client.model_info().unwrap().training_samples, 12000);
        assert_eq!(client.log_summary().unwrap().fraud_predictions, 5);
        assert_eq!(api.predictions(), 0);

        let client = client_for(&unreachable_url());
        assert_eq!(client.categories().len(), FALLBACK_CATEGORIES.len());
    }
}
