#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use remark::app::users::UserService;
use remark::config::AppConfig;
use remark::domain::user::{NewUser, User};
use remark::infra::db::Db;
use remark::AppState;

pub const DEFAULT_AUTHOR: &str = "admin";

// ---------------------------------------------------------------------------
// TestApp — one per test, each with its own throwaway SQLite database
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub config: AppConfig,
    // Keeps the database file alive for the duration of the test.
    _data_dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: axum::body::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }

    pub fn error_fields(&self) -> Vec<String> {
        self.json()["fields"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let data_dir = tempfile::tempdir().expect("cannot create temp dir");
        let db_path = data_dir.path().join("remark_test.db");
        let seed_path = data_dir.path().join("Copy of comments.json");

        let config = AppConfig {
            http_addr: "127.0.0.1:0".to_string(),
            app_mode: "api".to_string(),
            database_url: format!("sqlite://{}", db_path.display()),
            db_max_connections: 5,
            db_connect_timeout_seconds: 5,
            default_author: DEFAULT_AUTHOR.to_string(),
            seed_file: seed_path.display().to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            frontend_base_url: "http://localhost:3000".to_string(),
        };

        let db = Db::connect(&config).await.expect("Db::connect failed");
        let state = AppState {
            db,
            default_author: config.default_author.clone(),
        };
        let router = remark::http::router(state.clone());

        TestApp {
            router,
            state,
            config,
            _data_dir: data_dir,
        }
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    /// Provision the default author the create endpoint attributes to.
    pub async fn provision_admin(&self) -> User {
        self.create_user(DEFAULT_AUTHOR, "Admin").await
    }

    pub async fn create_user(&self, username: &str, first_name: &str) -> User {
        let users = UserService::new(self.state.db.clone());
        let (user, _) = users
            .get_or_create(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                first_name: first_name.to_string(),
                is_staff: false,
                is_superuser: false,
                password: "testpassword123".to_string(),
            })
            .await
            .expect("failed to create test user");
        user
    }

    pub fn write_seed_file(&self, contents: &str) {
        std::fs::write(&self.config.seed_file, contents).expect("failed to write seed file");
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------

    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        let request = if let Some(body) = body {
            builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap()
        } else {
            builder.body(Body::empty()).unwrap()
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None).await
    }
}
