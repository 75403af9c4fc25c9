#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::PathBuf;
use tower::ServiceExt;

use neighborhood::config::AppConfig;
use neighborhood::domain::journal::DEFAULT_EPOCH;
use neighborhood::infra::{db::Db, storage::FileStorage};
use neighborhood::AppState;

const BOUNDARY: &str = "neighborhood-test-boundary";

// ---------------------------------------------------------------------------
// TestApp: one per test, backed by its own in-memory database
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub upload_dir: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body_bytes
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

pub struct TestUser {
    pub id: i64,
    pub username: String,
}

pub struct TestImage<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// A fresh application with an empty database and upload directory.
pub async fn app() -> TestApp {
    // A single connection keeps every query on the same in-memory database.
    TestApp::setup("sqlite::memory:".into(), 1).await
}

/// Like [`app`], but backed by a database file so several pooled connections
/// share it and contend for SQLite's write lock.
pub async fn file_backed_app(max_connections: u32) -> TestApp {
    let dir = scratch_dir("db");
    std::fs::create_dir_all(&dir).expect("failed to create database dir");
    let url = format!("sqlite:{}?mode=rwc", dir.join("board.db").display());
    TestApp::setup(url, max_connections).await
}

fn scratch_dir(kind: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "neighborhood-test-{}-{}",
        kind,
        neighborhood::app::media::generate_file_name("")
    ))
}

impl TestApp {
    async fn setup(database_url: String, max_connections: u32) -> Self {
        let upload_dir = scratch_dir("uploads");

        let config = AppConfig {
            http_addr: "127.0.0.1:0".into(),
            database_url,
            db_max_connections: max_connections,
            db_connect_timeout_seconds: 30,
            db_idle_timeout_seconds: 0,
            db_max_lifetime_seconds: 0,
            upload_dir: upload_dir.clone(),
            upload_max_bytes: 1024 * 1024,
            journal_epoch: DEFAULT_EPOCH,
        };

        let db = Db::connect(&config).await.expect("Db::connect failed");
        db.migrate().await.expect("migrations failed");

        let state = AppState {
            db,
            storage: FileStorage::new(config.upload_dir.clone()),
            upload_max_bytes: config.upload_max_bytes,
            journal_epoch: config.journal_epoch,
        };

        let router = neighborhood::http::router(state.clone());

        TestApp {
            router,
            state,
            upload_dir,
        }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        body: Body,
        username: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        if let Some(username) = username {
            builder = builder.header("cookie", format!("username={}", username));
        }

        let request = builder.body(body).unwrap();

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
        self.request(Method::GET, path, None, Body::empty(), None)
            .await
    }

    pub async fn post_json(&self, path: &str, body: Value, username: Option<&str>) -> TestResponse {
        self.request(
            Method::POST,
            path,
            Some("application/json"),
            Body::from(serde_json::to_string(&body).unwrap()),
            username,
        )
        .await
    }

    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        image: Option<TestImage<'_>>,
        username: Option<&str>,
    ) -> TestResponse {
        let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
        self.request(
            Method::POST,
            path,
            Some(&content_type),
            Body::from(multipart_body(fields, image)),
            username,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------
    pub async fn create_user(&self, username: &str) -> TestUser {
        let resp = self
            .post_json("/users", serde_json::json!({ "username": username }), None)
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create_user failed: {:?}", resp.json());
        let body = resp.json();
        TestUser {
            id: body["id"].as_i64().unwrap(),
            username: username.to_string(),
        }
    }

    pub async fn create_post(&self, user: &TestUser, content: &str, tags: &str) -> i64 {
        let resp = self
            .post_form(
                "/posts",
                &[("content", content), ("tags", tags)],
                None,
                Some(&user.username),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create_post failed: {:?}", resp.json());
        resp.json()["id"].as_i64().unwrap()
    }

    pub async fn create_journal_post(&self, user: &TestUser, content: &str) -> i64 {
        let resp = self
            .post_form("/journal", &[("content", content)], None, Some(&user.username))
            .await;
        assert_eq!(resp.status, StatusCode::OK, "create_journal_post failed: {:?}", resp.json());
        resp.json()["id"].as_i64().unwrap()
    }

    pub async fn reply(&self, user: &TestUser, parent_id: i64, content: &str) -> TestResponse {
        let parent = parent_id.to_string();
        self.post_form(
            "/posts",
            &[("content", content), ("parent_id", &parent)],
            None,
            Some(&user.username),
        )
        .await
    }

    pub async fn toggle_like(&self, user: &TestUser, post_id: i64) -> TestResponse {
        self.post_json(
            &format!("/posts/{}/like", post_id),
            serde_json::json!({}),
            Some(&user.username),
        )
        .await
    }

    /// Inserts a post row directly with a chosen `created_at`, bypassing the
    /// server-assigned timestamp.
    pub async fn insert_post_at(&self, author: &str, kind: &str, created_at: &str) -> i64 {
        sqlx::query(
            "INSERT INTO posts (username, content, post_type, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(author)
        .bind(format!("{} at {}", kind, created_at))
        .bind(kind)
        .bind(created_at)
        .execute(self.state.db.pool())
        .await
        .expect("failed to insert post")
        .last_insert_rowid()
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(self.state.db.pool())
            .await
            .expect("count query failed")
    }
}

fn multipart_body(fields: &[(&str, &str)], image: Option<TestImage<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, image.file_name, image.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(image.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
