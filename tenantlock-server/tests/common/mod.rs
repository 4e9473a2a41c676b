#![allow(dead_code)]

use std::sync::Arc;
use tenantlock_server::{build_router, AppState};
use tenantlock_storage::Database;
use tenantlock_tenant::BASE_PLATFORM_DOMAIN;
use tenantlock_types::Tenant;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub struct TestServer {
    pub base: String,
    pub client: reqwest::Client,
    pub state: Arc<AppState>,
    /// Tenant `acme` under base domain `example.com`.
    pub tenant: Tenant,
}

/// Spin up the HTTP server on an OS-assigned port with one seeded tenant.
pub async fn spawn_test_server() -> TestServer {
    let db = Database::open_in_memory().unwrap();
    let state = Arc::new(AppState::new(db, ADMIN_TOKEN));
    state
        .config
        .set(BASE_PLATFORM_DOMAIN, "example.com", None)
        .unwrap();
    let tenant = Tenant::new("Acme").with_subdomain("acme");
    state.tenants.insert(&tenant).unwrap();

    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        state,
        tenant,
    }
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn admin_get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(ADMIN_TOKEN)
    }

    pub fn admin_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(ADMIN_TOKEN)
    }

    pub fn admin_put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(ADMIN_TOKEN)
    }

    pub fn admin_delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(ADMIN_TOKEN)
    }

    pub async fn activate(&self, key: &str, machine_hash: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/licenses/activate"))
            .json(&serde_json::json!({ "key": key, "machine_hash": machine_hash }))
            .send()
            .await
            .unwrap()
    }

    pub async fn validate(&self, key: &str, machine_hash: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/v1/licenses/validate"))
            .json(&serde_json::json!({ "key": key, "machine_hash": machine_hash }))
            .send()
            .await
            .unwrap()
    }
}

/// Reads the `error` field of a JSON error body.
pub async fn error_message(resp: reqwest::Response) -> String {
    let body: serde_json::Value = resp.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}
