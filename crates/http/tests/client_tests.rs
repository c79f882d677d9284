//! Integration tests for the Cash-Revolution HTTP client

use cashrev_http::client::{
    ApiClient, Backend, ClientConfig, ClientError, CredentialStore, Endpoint,
    MemoryCredentialStore, Navigator, RedirectToLanding, RequestOptions, ResponseBody,
    SecondaryConfig, SessionConfig, SessionExpired, StoredCredential,
};
use cashrev_http::types::LoginRequest;
use serde_json::json;
use std::io::Read;
use std::net::TcpListener;
use std::sync::{Arc, Mutex, mpsc};
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FakeNavigator {
    path: String,
    visited: Mutex<Vec<String>>,
}

impl FakeNavigator {
    fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            visited: Mutex::new(Vec::new()),
        })
    }

    fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for FakeNavigator {
    fn current_path(&self) -> Option<String> {
        Some(self.path.clone())
    }

    fn navigate(&self, target: &str) {
        self.visited.lock().unwrap().push(target.to_string());
    }
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::with_base_url(server.uri())
}

fn client_with_store(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
    ApiClient::builder()
        .config(config_for(server))
        .credentials(store)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_resolve_url_for_every_endpoint() {
    let mock_server = MockServer::start().await;
    let client = ApiClient::new(config_for(&mock_server)).unwrap();

    for endpoint in Endpoint::ALL {
        assert_eq!(
            client.resolve_url(endpoint.name()).unwrap(),
            format!("{}{}", mock_server.uri(), endpoint.default_path())
        );
    }
}

#[tokio::test]
async fn test_login_returns_token_verbatim() {
    let mock_server = MockServer::start().await;
    let token = json!({"access_token": "abc", "token_type": "bearer"});

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({"email": "trader@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&token))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(config_for(&mock_server)).unwrap();
    let body = client
        .request(
            "login",
            RequestOptions::post().json(json!({"email": "trader@example.com", "password": "pw"})),
        )
        .await
        .unwrap();

    assert_eq!(body, ResponseBody::Json(token));
}

#[tokio::test]
async fn test_stored_token_is_sent_as_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer stored-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 7, "email": "t@example.com"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credential(
        StoredCredential::bearer("stored-token"),
    ));
    let client = client_with_store(&mock_server, store);

    let user = client.me().await.unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.email, "t@example.com");
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/signals/top"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"signals": []})))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(config_for(&mock_server)).unwrap();
    let signals = client.top_signals().await.unwrap();
    assert!(signals.signals.is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/signals"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(config_for(&mock_server)).unwrap();
    client
        .request(
            "userSignals",
            RequestOptions::get()
                .header("Accept", "text/plain")
                .header("X-Client", "tests"),
        )
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    assert_eq!(headers.get("accept").unwrap(), "text/plain");
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert_eq!(headers.get("x-client").unwrap(), "tests");
}

#[tokio::test]
async fn test_401_purges_credentials_and_redirects() {
    let mock_server = MockServer::start().await;

    // Malformed JSON: decoding it would surface a serialization error
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401).set_body_raw("{not json", "application/json"))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credential(
        StoredCredential::bearer("expired"),
    ));
    let navigator = FakeNavigator::at("/dashboard.html");
    let client = ApiClient::builder()
        .config(config_for(&mock_server))
        .credentials(store.clone())
        .on_session_expired(RedirectToLanding::new(
            navigator.clone(),
            SessionConfig::default(),
        ))
        .build()
        .unwrap();

    let err = client
        .request("me", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(&err, ClientError::AuthenticationExpired { endpoint } if endpoint == "me"));
    assert!(store.get().unwrap().is_none());
    assert_eq!(navigator.visited(), vec!["index.html"]);
}

#[tokio::test]
async fn test_401_on_landing_page_does_not_navigate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let navigator = FakeNavigator::at("/index.html");
    let client = ApiClient::builder()
        .config(config_for(&mock_server))
        .credentials(store.clone())
        .on_session_expired(RedirectToLanding::new(
            navigator.clone(),
            SessionConfig::default(),
        ))
        .build()
        .unwrap();

    let err = client.me().await.unwrap_err();
    assert!(err.is_auth_expired());
    assert!(store.get().unwrap().is_none());
    assert!(navigator.visited().is_empty());
}

#[tokio::test]
async fn test_session_handler_receives_event() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mt5/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let client = ApiClient::builder()
        .config(config_for(&mock_server))
        .on_session_expired(move |event: &SessionExpired| {
            sink.lock().unwrap().push(event.clone());
        })
        .build()
        .unwrap();

    assert!(client.mt5_status().await.unwrap_err().is_auth_expired());
    assert_eq!(
        *events.lock().unwrap(),
        vec![SessionExpired {
            endpoint: "mt5Status".into(),
            backend: Backend::Primary,
        }]
    );
}

#[tokio::test]
async fn test_404_with_json_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/signals/top"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(config_for(&mock_server)).unwrap();
    let err = client
        .request("topSignals", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Http {
            backend: Backend::Primary,
            status: 404,
            ..
        }
    ));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server);
    config.request.timeout_ms = 200;
    let client = ApiClient::new(config).unwrap();

    let started = Instant::now();
    let err = client
        .request("me", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(matches!(
        err,
        ClientError::Timeout {
            backend: Backend::Primary,
            after,
        } if after == Duration::from_millis(200)
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timeout_closes_the_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    // Reads the request head, never replies, then reports the next read
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

        let mut head = Vec::new();
        let mut buf = [0u8; 4096];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            assert!(n > 0, "connection closed before the request was sent");
            head.extend_from_slice(&buf[..n]);
        }

        tx.send(stream.read(&mut buf).map_err(|e| e.kind())).unwrap();
    });

    let mut config = ClientConfig::with_base_url(format!("http://{addr}"));
    config.request.timeout_ms = 200;
    let client = ApiClient::new(config).unwrap();

    let err = client
        .request("me", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Timeout { backend: Backend::Primary, .. }),
        "expected timeout, got {err:?}"
    );

    let next_read = tokio::task::spawn_blocking(move || rx.recv().unwrap())
        .await
        .unwrap();
    assert_eq!(next_read, Ok(0));

    drop(client);
}

#[tokio::test]
async fn test_non_json_body_is_returned_as_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mt5/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<b>bridge up</b>", "text/html"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(config_for(&mock_server)).unwrap();
    let body = client
        .request("mt5Status", RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(body, ResponseBody::Text("<b>bridge up</b>".into()));
}

#[tokio::test]
async fn test_json_values_round_trip() {
    let mock_server = MockServer::start().await;
    let payload = json!({
        "nested": {"list": [1, 2.5, "three", null, true]},
        "unicode": "prezzo €",
        "empty": {}
    });

    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(config_for(&mock_server)).unwrap();
    let body = client.request("me", RequestOptions::get()).await.unwrap();
    assert_eq!(body.into_json(), Some(payload));
}

#[tokio::test]
async fn test_transport_error_is_not_timeout() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("cashrev_http=debug")
        .with_test_writer()
        .try_init();

    // Nothing listens on the discard port
    let client = ApiClient::new(ClientConfig::with_base_url("http://127.0.0.1:9")).unwrap();
    let err = client
        .request("me", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Request(_)), "got {err:?}");
}

#[tokio::test]
async fn test_login_and_store_then_authenticated_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "token_type": "bearer"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/signals"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"symbol": "XAUUSD", "signal_type": "SELL"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::new());
    let client = client_with_store(&mock_server, store.clone());

    let token = client
        .login_and_store(&LoginRequest {
            email: "trader@example.com".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();
    assert_eq!(token.access_token, "fresh");
    assert_eq!(store.get().unwrap().unwrap().access_token, "fresh");

    let signals = client.user_signals().await.unwrap();
    assert_eq!(signals.signals[0].symbol, "XAUUSD");

    client.logout().unwrap();
    assert!(!client.is_logged_in().unwrap());
}

#[tokio::test]
async fn test_secondary_is_unauthenticated_by_default() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/signals/latest"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&secondary)
        .await;

    let mut config = config_for(&primary);
    config.secondary = Some(SecondaryConfig {
        base_url: secondary.uri(),
        authenticated: false,
    });
    let store = Arc::new(MemoryCredentialStore::with_credential(
        StoredCredential::bearer("keep-me"),
    ));
    let client = ApiClient::builder()
        .config(config)
        .credentials(store.clone())
        .build()
        .unwrap();

    let err = client
        .request_secondary("/api/signals/latest", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ClientError::Http {
            backend: Backend::Secondary,
            status: 401,
            ..
        }
    ));
    assert!(store.get().unwrap().is_some());

    let requests = secondary.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_authenticated_secondary_shares_401_policy() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("authorization", "Bearer shared"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&secondary)
        .await;

    let mut config = config_for(&primary);
    config.secondary = Some(SecondaryConfig {
        base_url: secondary.uri(),
        authenticated: true,
    });
    let store = Arc::new(MemoryCredentialStore::with_credential(
        StoredCredential::bearer("shared"),
    ));
    let client = ApiClient::builder()
        .config(config)
        .credentials(store.clone())
        .build()
        .unwrap();

    let err = client
        .request_secondary("/health", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(
        matches!(&err, ClientError::AuthenticationExpired { endpoint } if endpoint == "/health")
    );
    assert!(store.get().unwrap().is_none());
}

#[tokio::test]
async fn test_secondary_timeout_is_reported_for_secondary() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&secondary)
        .await;

    let mut config = config_for(&primary);
    config.request.timeout_ms = 150;
    config.secondary = Some(SecondaryConfig {
        base_url: secondary.uri(),
        authenticated: false,
    });
    let client = ApiClient::new(config).unwrap();

    let err = client
        .request_secondary("/slow", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Timeout {
            backend: Backend::Secondary,
            ..
        }
    ));
}
