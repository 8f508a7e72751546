//! Mock Fintrack API server for testing
//!
//! A small blocking HTTP server that answers the endpoints the client uses,
//! so the HTTP adapters can be exercised end to end:
//! - GET  /api/v1/auth/me       returns { user: {...} } for a valid session cookie
//! - POST /api/v1/incomes       echoes the payload back as a created income
//! - GET  /api/v1/expenses      returns one page of expenses
//! - GET  /api/v1/categories    filters categories by ?name=

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value as JsonValue};

use super::demo::{demo_categories, demo_identity};

/// Cookie the mock accepts as a live session
pub const VALID_SESSION: &str = "fintrack.sid=valid";

/// Behaviour switches for the mock
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Answer /auth/me with this status instead of checking the cookie
    pub auth_status: Option<u16>,
    /// Return a user object missing required fields
    pub malformed_identity: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

pub struct MockApiServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockApiServer {
    /// Start on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(AtomicUsize::new(0));
        let (running_clone, requests_clone) = (running.clone(), requests.clone());

        // Non-blocking accept so stop() can end the loop
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        requests_clone.fetch_add(1, Ordering::SeqCst);
                        let cfg = config.clone();
                        thread::spawn(move || handle_connection(stream, &cfg));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Server URL including the API prefix
    pub fn server_url(&self) -> String {
        format!("http://127.0.0.1:{}/api/v1", self.port)
    }

    /// Connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Request {
    method: String,
    path: String,
    query: String,
    headers: String,
    body: String,
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    stream.set_nonblocking(false).ok()?;
    let mut raw = Vec::new();
    let mut buffer = [0; 4096];

    // Read until the header block is complete, then the declared body
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buffer[..n]);
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while raw.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buffer[..n]);
    }

    let first_line = headers.lines().next().unwrap_or("");
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    Some(Request {
        method,
        path: path.to_string(),
        query: query.to_string(),
        headers: headers.to_lowercase(),
        body: String::from_utf8_lossy(&raw[header_end..]).to_string(),
    })
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let has_session = request.headers.contains(&format!("cookie: {}", VALID_SESSION));

    let (status, body) = match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/api/v1/auth/me") => match config.auth_status {
            Some(status) => (status, json!({ "message": "auth failure" })),
            None if !has_session => (401, json!({ "message": "Not authenticated" })),
            None if config.malformed_identity => (200, json!({ "user": { "id": "usr_broken" } })),
            None => (200, json!({ "user": demo_identity() })),
        },
        _ if !has_session => (401, json!({ "message": "Not authenticated" })),
        ("POST", "/api/v1/incomes") => match serde_json::from_str::<JsonValue>(&request.body) {
            Ok(mut income) => {
                // The API stores dates as timestamps and returns them that way
                if let Some(date) = income["date"].as_str().map(String::from) {
                    income["date"] = json!(format!("{}T00:00:00.000Z", date));
                }
                income["id"] = json!("inc_created");
                income["userId"] = json!(demo_identity().id);
                (201, json!({ "status": "success", "data": { "income": income } }))
            }
            Err(_) => (400, json!({ "message": "Invalid JSON" })),
        },
        ("GET", "/api/v1/expenses") => (
            200,
            json!({
                "status": "success",
                "data": {
                    "expenses": [{
                        "id": "exp_1",
                        "name": "Coffee",
                        "amount": 4.75,
                        "description": "Flat white",
                        "date": "2024-05-02T00:00:00.000Z",
                        "userId": demo_identity().id,
                        "categoryId": "cat-food"
                    }],
                    "total": 1,
                    "page": 1,
                    "limit": 50,
                    "totalPages": 1
                }
            }),
        ),
        ("GET", "/api/v1/categories") => {
            let name = url::form_urlencoded::parse(request.query.as_bytes())
                .find(|(k, _)| k == "name")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            let categories: Vec<_> = demo_categories()
                .into_iter()
                .filter(|c| c.matches(&name))
                .collect();
            (
                200,
                json!({
                    "status": "success",
                    "results": categories.len(),
                    "data": { "categories": categories }
                }),
            )
        }
        _ => (404, json!({ "message": "Endpoint not found" })),
    };

    send_response(&mut stream, status, &body.to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let status_text = match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::adapters::api_client::{ApiClient, ApiClientOptions};
    use crate::adapters::http_identity::HttpIdentityProvider;
    use crate::adapters::http_ledger::HttpLedgerClient;
    use crate::domain::result::Error;
    use crate::domain::{GuardDecision, NewIncome};
    use crate::ports::{CategoryApi, IdentityProvider, LedgerApi, PageRequest};
    use crate::services::{RouteGuard, SessionStore};

    fn api(server: &MockApiServer, cookie: Option<&str>) -> Arc<ApiClient> {
        let options = ApiClientOptions {
            session_cookie: cookie.map(String::from),
            timeout: Some(std::time::Duration::from_secs(5)),
        };
        Arc::new(ApiClient::new(&server.server_url(), options).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_identity_with_session() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let provider = HttpIdentityProvider::new(api(&server, Some(VALID_SESSION)));

        let identity = provider.fetch_current_identity().await.unwrap();
        assert_eq!(identity, demo_identity());
    }

    #[tokio::test]
    async fn test_fetch_identity_without_session_is_unauthorized() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let provider = HttpIdentityProvider::new(api(&server, None));

        let err = provider.fetch_current_identity().await.unwrap_err();
        assert!(err.is_unauthorized(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockApiServer::start(MockConfig {
            auth_status: Some(503),
            ..Default::default()
        })
        .unwrap();
        let provider = HttpIdentityProvider::new(api(&server, Some(VALID_SESSION)));

        let err = provider.fetch_current_identity().await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 503 }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_malformed_identity_is_decode_error() {
        let server = MockApiServer::start(MockConfig {
            malformed_identity: true,
            ..Default::default()
        })
        .unwrap();
        let provider = HttpIdentityProvider::new(api(&server, Some(VALID_SESSION)));

        let err = provider.fetch_current_identity().await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let mut server = MockApiServer::start(MockConfig::default()).unwrap();
        let url = server.server_url();
        server.stop();
        drop(server);

        let api = ApiClient::new(&url, ApiClientOptions::default()).unwrap();
        let provider = HttpIdentityProvider::new(Arc::new(api));
        let err = provider.fetch_current_identity().await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_guard_redirects_on_401_preserving_query() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let provider: Arc<dyn IdentityProvider> =
            Arc::new(HttpIdentityProvider::new(api(&server, None)));
        let guard = RouteGuard::new(Arc::new(SessionStore::new()), provider, "/signin");

        let decision = guard.evaluate("/dashboard?month=5").await;
        assert_eq!(
            decision.redirect_location().as_deref(),
            Some("/signin?redirect=%2Fdashboard%3Fmonth%3D5")
        );
        assert!(!guard.store().is_authenticated());
        assert_eq!(server.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_guard_allows_with_session() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let provider: Arc<dyn IdentityProvider> =
            Arc::new(HttpIdentityProvider::new(api(&server, Some(VALID_SESSION))));
        let guard = RouteGuard::new(Arc::new(SessionStore::new()), provider, "/signin");

        assert_eq!(guard.evaluate("/dashboard").await, GuardDecision::Allow);
        assert_eq!(guard.store().identity(), Some(demo_identity()));
    }

    #[tokio::test]
    async fn test_create_income_round_trip() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let ledger = HttpLedgerClient::new(api(&server, Some(VALID_SESSION)));

        let income = ledger
            .create_income(&NewIncome {
                name: "Salary".into(),
                amount: Decimal::new(350000, 2),
                description: "May salary".into(),
                source: Some("Acme Corp".into()),
                date: NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
                category_ids: vec!["cat-salary".into()],
            })
            .await
            .unwrap();

        assert_eq!(income.id, "inc_created");
        assert_eq!(income.date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        assert_eq!(income.amount, Decimal::new(3500, 0));
        assert_eq!(income.category_ids, vec!["cat-salary".to_string()]);
    }

    #[tokio::test]
    async fn test_list_expenses_and_search_categories() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let ledger = HttpLedgerClient::new(api(&server, Some(VALID_SESSION)));

        let page = ledger.list_expenses(PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(page.total_pages, 1);

        let found = ledger.search_categories("foo").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Food");
    }

    #[tokio::test]
    async fn test_ledger_requires_session() {
        let server = MockApiServer::start(MockConfig::default()).unwrap();
        let ledger = HttpLedgerClient::new(api(&server, None));

        let err = ledger.list_expenses(PageRequest::default()).await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
