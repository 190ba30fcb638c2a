//! Common test utilities for E2E tests

use std::path::PathBuf;

use amberfeed::{config, AppState};
use tempfile::TempDir;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// State-signing secret shared with the server under test
pub const TEST_STATE_SECRET: &str = "test-state-secret-32-bytes-long!";
/// Provider login configured as the instance owner
pub const TEST_OWNER_LOGIN: &str = "testowner";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
    pub provider: MockServer,
    pub snapshot_path: PathBuf,
    pub content_dir: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestServer {
    /// Create a new test server with the default five-post snapshot
    pub async fn new() -> Self {
        Self::build(sample_snapshot(), true).await
    }

    /// Create a test server serving a specific snapshot document
    pub async fn with_snapshot(snapshot: serde_json::Value) -> Self {
        Self::build(snapshot, true).await
    }

    /// Create a test server with the write path disabled
    pub async fn with_write_disabled() -> Self {
        Self::build(sample_snapshot(), false).await
    }

    async fn build(snapshot: serde_json::Value, write_enabled: bool) -> Self {
        // File-backed stores in a temporary directory
        let temp_dir = TempDir::new().unwrap();
        let snapshot_path = temp_dir.path().join("snapshot.json");
        std::fs::write(
            &snapshot_path,
            serde_json::to_vec_pretty(&snapshot).unwrap(),
        )
        .unwrap();
        let content_dir = temp_dir.path().join("content");
        std::fs::create_dir_all(&content_dir).unwrap();

        // Wiremock stands in for the identity provider
        let provider = MockServer::start().await;

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "feed.example.com".to_string(),
                protocol: "https".to_string(),
            },
            storage: config::StorageConfig {
                snapshot: config::SnapshotStoreConfig {
                    backend: config::StoreBackend::File,
                    path: Some(snapshot_path.clone()),
                    bucket: None,
                    key: "snapshot.json".to_string(),
                },
                content: config::ContentStoreConfig {
                    backend: config::StoreBackend::File,
                    path: Some(content_dir.clone()),
                    bucket: None,
                    prefix: "posts".to_string(),
                },
            },
            cloudflare: None,
            auth: config::AuthConfig {
                owner_login: TEST_OWNER_LOGIN.to_string(),
                state_secret: TEST_STATE_SECRET.to_string(),
                write_enabled,
                provider: config::ProviderConfig {
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                    authorize_url: format!("{}/login/oauth/authorize", provider.uri()),
                    token_url: format!("{}/login/oauth/access_token", provider.uri()),
                    user_url: format!("{}/user", provider.uri()),
                    scope: "read:user".to_string(),
                },
            },
            instance: config::InstanceConfig {
                title: "Test Instance".to_string(),
                description: "Test Amberfeed Instance".to_string(),
                contact_email: "test@example.com".to_string(),
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).unwrap();

        // Create HTTP client; redirects stay unfollowed so tests can
        // inspect Location headers
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = amberfeed::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            client,
            provider,
            snapshot_path,
            content_dir,
            _temp_dir: temp_dir,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// The server's configured public base URL
    pub fn public_base_url(&self) -> String {
        self.state.config.server.base_url()
    }

    /// Stub the provider's code-for-token exchange
    pub async fn mock_provider_exchange(&self, access_token: &str) {
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": access_token,
                "token_type": "bearer",
                "scope": "read:user",
            })))
            .mount(&self.provider)
            .await;
    }

    /// Stub the provider's authenticated-user lookup
    pub async fn mock_provider_login(&self, login: &str) {
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": login,
                "id": 12345,
            })))
            .mount(&self.provider)
            .await;
    }

    /// Stub the provider rejecting the presented token
    pub async fn mock_provider_rejects_token(&self) {
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials",
            })))
            .mount(&self.provider)
            .await;
    }
}

/// Default snapshot: one owner account and five posts, newest first
/// (ids "5".."1", created a day apart)
pub fn sample_snapshot() -> serde_json::Value {
    let posts: Vec<serde_json::Value> = (1..=5)
        .rev()
        .map(|i| {
            serde_json::json!({
                "id": i.to_string(),
                "created_at": format!("2024-01-0{}T00:00:00Z", i),
                "visibility": "public",
                "sensitive": false,
                "content_html": format!("<p>post {}</p>", i),
                "replies_count": 0,
                "reblogs_count": 0,
                "favourites_count": i,
            })
        })
        .collect();

    serde_json::json!({
        "account": {
            "id": "1",
            "username": TEST_OWNER_LOGIN,
            "display_name": "Test Owner",
            "note": "Posts preserved in amber",
            "created_at": "2024-01-01T00:00:00Z",
            "statuses_count": 5,
        },
        "posts": posts,
    })
}

/// A snapshot with `count` posts, ids "1".."count", newest first
pub fn generated_snapshot(count: usize) -> serde_json::Value {
    let posts: Vec<serde_json::Value> = (1..=count)
        .rev()
        .map(|i| {
            serde_json::json!({
                "id": i.to_string(),
                // Seconds offset keeps the list strictly ordered
                "created_at": chrono_rfc3339(i as i64),
                "visibility": "public",
                "sensitive": false,
                "content_html": format!("<p>post {}</p>", i),
            })
        })
        .collect();

    serde_json::json!({
        "account": {
            "id": "1",
            "username": TEST_OWNER_LOGIN,
            "created_at": "2024-01-01T00:00:00Z",
            "statuses_count": count,
        },
        "posts": posts,
    })
}

fn chrono_rfc3339(offset_secs: i64) -> String {
    chrono::DateTime::from_timestamp(1_700_000_000 + offset_secs, 0)
        .unwrap()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
