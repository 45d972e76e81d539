//! Test helpers
//!
//! Spawns the full application (REST + gateway) on an ephemeral port with the
//! in-memory store, and provides an authenticated HTTP client.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use parley_api::{create_app, create_app_state_with, start_dispatcher, AppState};
use parley_common::{
    AppConfig, AppSettings, AuthConfig, CorsConfig, DatabaseConfig, Environment, JwtService,
    ServerConfig, SnowflakeConfig,
};
use parley_core::{Snowflake, SnowflakeGenerator, User, UserRepository};
use parley_service::ServiceContext;
use reqwest::{Client, Response};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::memory::InMemoryStore;

const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Build a service context backed by the in-memory store
pub fn test_context() -> (ServiceContext, Arc<InMemoryStore>) {
    let store = InMemoryStore::new_shared();
    let context = ServiceContext::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(JwtService::new(TEST_JWT_SECRET, 900)),
        Arc::new(SnowflakeGenerator::new(1)),
    );
    (context, store)
}

fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "parley-test".to_string(),
            env: Environment::Development,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://unused-in-memory".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: 1,
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_expiry_secs: 900,
        },
        cors: CorsConfig::default(),
        snowflake: SnowflakeConfig::default(),
    }
}

/// Test server instance running the full application
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on an ephemeral port with the in-memory store
    pub async fn start() -> Result<Self> {
        let (context, store) = test_context();
        let state = create_app_state_with(context, test_config());
        let _dispatcher = start_dispatcher(&state);
        let app = create_app(state.clone());

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            client: Client::new(),
            state,
            store,
            _handle: handle,
        })
    }

    /// Base URL of the server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// WebSocket URL of the gateway route
    pub fn gateway_url(&self, token: Option<&str>) -> String {
        match token {
            Some(token) => format!("ws://{}/gateway?token={token}", self.addr),
            None => format!("ws://{}/gateway", self.addr),
        }
    }

    /// Seed a user into the store and return a valid token for them
    pub async fn seed_user(&self, id: i64, username: &str) -> (Snowflake, String) {
        let user_id = Snowflake::new(id);
        let user = User::new(user_id, username.to_string(), username.to_string());
        self.state
            .service_context()
            .user_repo()
            .create(&user)
            .await
            .expect("seed user");
        let token = self.token_for(user_id);
        (user_id, token)
    }

    /// Mint a valid bearer token for a user id
    pub fn token_for(&self, user_id: Snowflake) -> String {
        self.state
            .jwt_service()
            .issue_token(user_id)
            .expect("issue token")
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    pub async fn post<B: Serialize>(&self, path: &str, token: &str, body: &B) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn patch<B: Serialize>(&self, path: &str, token: &str, body: &B) -> Result<Response> {
        Ok(self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put<B: Serialize>(&self, path: &str, token: &str, body: &B) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }
}
