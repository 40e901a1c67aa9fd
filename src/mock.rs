use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

/// What the fake prediction service answers with.
#[derive(Debug, Clone)]
pub struct MockBehaviour {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
    pub model_info: Value,
    pub log_summary: Value,
}
impl Default for MockBehaviour {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "transaction_id": "tx-1",
                "verdict": "LEGIT - Low Risk",
                "xgboost_probability": 0.12,
                "random_forest_probability": 0.2,
                "ensemble_probability": 0.16,
                "drift_warnings": []
            })
            .to_string(),
            delay: Duration::ZERO,
            model_info: json!({
                "category_classes": ["Grocery", "Electronics"],
                "metrics": {
                    "xgboost": {"accuracy": 0.99, "f1": 0.81, "precision": 0.86, "recall": 0.77, "roc_auc": 0.98},
                    "random_forest": {"accuracy": 0.98, "f1": 0.74, "precision": 0.9, "recall": 0.63, "roc_auc": 0.96},
                    "ensemble": {"accuracy": 0.99, "f1": 0.8, "precision": 0.88, "recall": 0.73, "roc_auc": 0.98}
                },
                "training_samples": 12000,
                "test_samples": 3000,
                "feature_columns": ["category", "amount", "loc_delta"],
                "categorical_columns": ["category"],
                "numeric_columns": ["amount", "loc_delta"]
            }),
            log_summary: json!({
                "total_predictions": 42,
                "fraud_predictions": 5,
                "fraud_rate": 11.9,
                "predictions_with_drift": 3
            }),
        }
    }
}
impl MockBehaviour {
    pub fn predicting(body: Value) -> Self {
        Self {
            body: body.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
struct MockState {
    behaviour: Arc<MockBehaviour>,
    predictions: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<Value>>>,
}

pub struct MockApi {
    pub url: String,
    predictions: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<Value>>>,
    _handle: JoinHandle<()>,
}
impl MockApi {
    pub fn predictions(&self) -> usize {
        self.predictions.load(Ordering::SeqCst)
    }
    pub fn last_request(&self) -> Option<Value> {
        self.last_request.lock().unwrap().clone()
    }
}

async fn predict(State(state): State<MockState>, Json(request): Json<Value>) -> impl IntoResponse {
    state.predictions.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().unwrap() = Some(request);
    tokio::time::sleep(state.behaviour.delay).await;
    (
        state.behaviour.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.behaviour.body.clone(),
    )
}
async fn model_info(State(state): State<MockState>) -> Json<Value> {
    Json(state.behaviour.model_info.clone())
}
async fn log_summary(State(state): State<MockState>) -> Json<Value> {
    Json(state.behaviour.log_summary.clone())
}

pub async fn run_mock(behaviour: MockBehaviour) -> MockApi {
    let state = MockState {
        behaviour: Arc::new(behaviour),
        predictions: Arc::default(),
        last_request: Arc::default(),
    };
    let app = Router::new()
        .route("/predict", post(predict))
        .route("/model-info", get(model_info))
        .route("/logs/summary", get(log_summary))
        .with_state(state.clone());

    let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap()).serve(app.into_make_service());
    let port = server.local_addr().port();
    let handle = tokio::spawn(async move {
        server.await.unwrap();
    });
    MockApi {
        url: format!("http://127.0.0.1:{}/", port),
        predictions: state.predictions,
        last_request: state.last_request,
        _handle: handle,
    }
}

/// Mock for blocking callers. The runtime has to outlive the returned api.
pub fn run_mock_blocking(behaviour: MockBehaviour) -> (tokio::runtime::Runtime, MockApi) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let api = runtime.block_on(run_mock(behaviour));
    (runtime, api)
}

/// A url nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// A url that answers one request with a 200 whose body stops short of its
/// declared length.
pub fn truncated_body_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"verdict\"")
            .unwrap();
        stream.flush().unwrap();
        let _ = stream.shutdown(Shutdown::Both);
    });
    format!("http://127.0.0.1:{}", port)
}
