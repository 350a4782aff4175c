//! Shared fixtures for the HTTP integration tests: a stub validator
//! speaking the external check protocol, plus builders that wire a
//! mocked repository into a running test server.
#![allow(unused)]

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Json, Router, routing::post};
use axum_test::TestServer;

use horizon_config::{Config, DatabaseConfig, GateConfig, MediaConfig, ServerConfig};
use horizon_core::{CatalogService, gate::ValidatorClient, repository::MockImageRepository};
use horizon_model::ImageRecord;
use horizon_server::{AppState, routes::create_router};

pub const GRANTED: &str = "Access granted!";
pub const DENIED: &str = "Access denied!";
pub const BASE_URL: &str = "http://localhost:8000/";

/// A minimal stand-in for the external validation service. It answers
/// every check with a fixed message and counts how often it was asked.
pub struct StubValidator {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl StubValidator {
    pub async fn spawn(message: &'static str) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(message.to_string())
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub validator");
        let url = format!("http://{}/", listener.local_addr().expect("local addr"));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub validator");
        });

        Self { url, hits }
    }

    /// How many check calls reached the stub so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn test_config(check_url: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: BASE_URL.to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
        },
        gate: GateConfig {
            check_url: check_url.to_string(),
            timeout: Duration::from_secs(2),
            granted_message: GRANTED.to_string(),
            denied_message: DENIED.to_string(),
        },
        media: MediaConfig {
            static_root: PathBuf::from("./static/images"),
            ingest_on_startup: false,
        },
    }
}

/// Stand up the full router against a mocked repository.
pub fn test_server(repo: MockImageRepository, config: Config) -> TestServer {
    let validator = ValidatorClient::new(&config.gate).expect("build validator client");
    let state = AppState::from_parts(
        Arc::new(CatalogService::new(Arc::new(repo))),
        Arc::new(validator),
        Arc::new(config),
    );
    TestServer::new(create_router(state)).expect("build test server")
}

pub fn record(name: &str, usage_count: i32) -> ImageRecord {
    ImageRecord {
        id: 1,
        subgroup_id: 1,
        name: name.to_string(),
        file_path: format!("static/images/Fabrics/Silk/Plain/{name}.jpg"),
        thumb_path: format!("static/images/Fabrics/Silk/Plain/{name}_thumb.jpg"),
        usage_count,
        meta_tags: Vec::new(),
    }
}
