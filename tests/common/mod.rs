#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde_json::{json, Value};

use storydesk::config::{Config, SheetsConfig};
use storydesk::email::{Notifier, NotifyError};
use storydesk::models::Submission;
use storydesk::sheets::{RecordStore, SheetsError};

/// Record store that keeps rows in memory.
#[derive(Default)]
pub struct RecordingStore {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SheetsError::Api {
                status: 500,
                body: "backend error".to_string(),
            });
        }
        self.rows.lock().unwrap().push(row);
        Ok(())
    }
}

/// Notifier that records who would have been emailed.
#[derive(Default)]
pub struct RecordingNotifier {
    pub staff: Mutex<Vec<Submission>>,
    pub applicants: Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.staff.lock().unwrap().len() + self.applicants.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_staff(&self, submission: &Submission) -> Result<(), NotifyError> {
        self.staff.lock().unwrap().push(submission.clone());
        if self.fail {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    async fn notify_applicant(&self, email: &str, name: &str) -> Result<(), NotifyError> {
        self.applicants
            .lock()
            .unwrap()
            .push((email.to_string(), name.to_string()));
        if self.fail {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

/// A running test server instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit JSON data, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit multipart form data the way the browser form does.
    pub async fn submit_multipart(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        self.submit_multipart_as("multipart/form-data", data).await
    }

    pub async fn submit_multipart_as(
        &self,
        media_type: &str,
        data: &[(&str, &str)],
    ) -> (Value, StatusCode) {
        let boundary = "storydesk-test-boundary";
        let mut body = String::new();
        for (name, value) in data {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        let resp = self
            .client
            .post(self.url("/api/contact"))
            .header(
                "content-type",
                format!("{media_type}; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .expect("submit multipart failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config(sheets: SheetsConfig) -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 64 * 1024,
        cors_origins: vec![],
        log_level: "warn".to_string(),
        sheets,
        smtp: None,
    }
}

pub fn dummy_sheets_config() -> SheetsConfig {
    SheetsConfig {
        spreadsheet_id: "unused".to_string(),
        service_account_key: "{}".to_string(),
        api_base: "http://127.0.0.1:9".to_string(),
    }
}

/// Spawn the app with the given collaborators on a random port.
pub async fn spawn_app(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> TestApp {
    spawn_app_with_config(test_config(dummy_sheets_config()), store, notifier).await
}

pub async fn spawn_app_with_config(
    config: Config,
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
) -> TestApp {
    let app = storydesk::build_app(config, store, notifier);
    let addr = serve(app).await;

    TestApp {
        addr,
        client: Client::new(),
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    addr
}

pub const SPREADSHEET_ID: &str = "sheet-123";
pub const PRIVATE_KEY: &str = include_str!("../fixtures/service_account_key.pem");

#[derive(Debug, Clone)]
pub struct GoogleRequest {
    pub method: &'static str,
    pub range: String,
    pub authorization: String,
    pub body: Value,
}

/// In-process stand-in for the Google token and Sheets endpoints.
#[derive(Default)]
pub struct MockGoogle {
    pub token_calls: AtomicUsize,
    pub requests: Mutex<Vec<GoogleRequest>>,
    pub sheet_title: Option<String>,
    pub stored: Mutex<Vec<Vec<String>>>,
    pub fail_writes: bool,
}

impl MockGoogle {
    pub fn requests(&self) -> Vec<GoogleRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, range: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        self.requests.lock().unwrap().push(GoogleRequest {
            method,
            range,
            authorization,
            body,
        });
    }
}

/// Start a mock Google server and return a config pointing at it.
pub async fn spawn_google(mock: Arc<MockGoogle>) -> SheetsConfig {
    let app = Router::new()
        .route("/token", post(token))
        .route("/v4/spreadsheets/{id}", get(spreadsheet_info))
        .route(
            "/v4/spreadsheets/{id}/values/{range}",
            get(read_values).post(append_values).put(update_values),
        )
        .with_state(mock);
    let addr = serve(app).await;

    SheetsConfig {
        spreadsheet_id: SPREADSHEET_ID.to_string(),
        service_account_key: json!({
            "client_email": "forms@example.iam.gserviceaccount.com",
            "private_key": PRIVATE_KEY,
            "token_uri": format!("http://{addr}/token"),
        })
        .to_string(),
        api_base: format!("http://{addr}/v4"),
    }
}

async fn token(
    State(mock): State<Arc<MockGoogle>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if form.get("grant_type").map(String::as_str)
        != Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
        || !form.contains_key("assertion")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        );
    }
    mock.token_calls.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({ "access_token": "test-token", "expires_in": 3600, "token_type": "Bearer" })),
    )
}

async fn spreadsheet_info(
    State(mock): State<Arc<MockGoogle>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    mock.record("GET", String::new(), &headers, Value::Null);
    if id != SPREADSHEET_ID {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })));
    }
    let sheets = match &mock.sheet_title {
        Some(title) => json!([{ "properties": { "title": title } }]),
        None => json!([]),
    };
    (StatusCode::OK, Json(json!({ "sheets": sheets })))
}

async fn read_values(
    State(mock): State<Arc<MockGoogle>>,
    Path((_id, range)): Path<(String, String)>,
    headers: HeaderMap,
) -> Json<Value> {
    mock.record("GET", range.clone(), &headers, Value::Null);
    let values = mock.stored.lock().unwrap().clone();
    Json(json!({ "range": range, "values": values }))
}

async fn append_values(
    State(mock): State<Arc<MockGoogle>>,
    Path((_id, range)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.record("POST", range, &headers, body.clone());
    if mock.fail_writes {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "backend unavailable" })),
        );
    }
    if let Some(rows) = body["values"].as_array() {
        for row in rows {
            let row: Vec<String> = row
                .as_array()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|c| c.as_str().unwrap_or_default().to_string())
                        .collect()
                })
                .unwrap_or_default();
            mock.stored.lock().unwrap().push(row);
        }
    }
    (StatusCode::OK, Json(json!({ "updates": { "updatedRows": 1 } })))
}

async fn update_values(
    State(mock): State<Arc<MockGoogle>>,
    Path((_id, range)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    mock.record("PUT", range, &headers, body);
    (StatusCode::OK, Json(json!({ "updatedRows": 1 })))
}
