use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use insightdesk_sdk::{
    AccessStatus, ApplyOutcome, BackendError, Client, Config, CreditStatus, DirectoryBackend,
    DirectoryEndpoints, FilterLabel, ListQuery, QueryParams, RecordId, UnlockOutcome, ViewStatus,
};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    authorization: Option<String>,
    body: String,
}

impl Seen {
    fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

struct Stub {
    restricted: bool,
    credit: &'static str,
    charged: Mutex<HashSet<u64>>,
    seen: Mutex<Vec<Seen>>,
}

impl Stub {
    fn new() -> Self {
        Self {
            restricted: false,
            credit: "CREDITS_ARE_AVAILABLE",
            charged: Mutex::new(HashSet::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn last(&self, path: &str) -> Seen {
        self.seen()
            .into_iter()
            .rev()
            .find(|seen| seen.path == path)
            .unwrap_or_else(|| panic!("no request to {}", path))
    }

    fn record(&self, id: u64) -> Value {
        let email = if self.charged.lock().unwrap().contains(&id) {
            json!({"value": format!("person{}@acme.test", id), "visibility_status": "visible"})
        } else {
            json!({"value": null, "visibility_status": "hidden"})
        };
        json!({
            "id": id,
            "name": {"value": format!("Person {}", id), "visibility_status": "visible"},
            "email": email,
        })
    }
}

async fn handle(
    State(stub): State<Arc<Stub>>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let seen = Seen {
        method: method.clone(),
        path: uri.path().to_string(),
        query,
        authorization: headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    };
    stub.seen.lock().unwrap().push(seen.clone());

    match (method, seen.path.as_str()) {
        (Method::GET, "/api/directory") if stub.restricted => (
            StatusCode::FORBIDDEN,
            axum::Json(json!({"status": "PIXEL_INSTALLATION_NEEDED"})),
        )
            .into_response(),
        (Method::GET, "/api/directory") => {
            let records: Vec<Value> = (1..=3).map(|id| stub.record(id)).collect();
            axum::Json(json!([records, 3])).into_response()
        }
        (Method::GET, "/api/directory/record") => {
            let id = seen
                .param("id")
                .and_then(|id| id.parse::<u64>().ok())
                .unwrap_or_default();
            axum::Json(stub.record(id)).into_response()
        }
        (Method::GET, "/api/directory/export") => "id,name\n1,Person 1\n".into_response(),
        (Method::GET, "/api/credit-status") => {
            axum::Json(json!({"status": stub.credit})).into_response()
        }
        (Method::PUT, "/api/credit-charge") => {
            let body: Value = serde_json::from_str(&seen.body).unwrap_or_default();
            match body.get("target_id").and_then(Value::as_u64) {
                Some(id) => {
                    stub.charged.lock().unwrap().insert(id);
                    axum::Json(json!({})).into_response()
                }
                None => StatusCode::UNPROCESSABLE_ENTITY.into_response(),
            }
        }
        (Method::GET, "/api/broken") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn serve(stub: Arc<Stub>) -> Result<SocketAddr> {
    let app = Router::new().fallback(handle).with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(addr)
}

fn client(addr: SocketAddr) -> Result<Client> {
    Ok(Client::builder()
        .config(Config::default())
        .base_url(format!("http://{}/api", addr))
        .token("tok")
        .domain("acme.test")
        .build()?)
}

#[tokio::test]
async fn test_list_request_carries_session_scope_and_paging() -> Result<()> {
    let stub = Arc::new(Stub::new());
    let addr = serve(stub.clone()).await?;
    let directory = client(addr)?.default_directory();

    let mut params = QueryParams::new();
    params.push("department", "Sales,Engineering");
    let page = directory
        .backend()
        .fetch_list(&ListQuery {
            params,
            page: 2,
            per_page: 15,
        })
        .await?;

    assert_eq!(page.total_count, 3);
    assert_eq!(page.records.len(), 3);
    assert!(page.records[0].field("email").unwrap().is_hidden());

    let seen = stub.last("/api/directory");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer tok"));
    assert_eq!(seen.param("domain"), Some("acme.test"));
    assert_eq!(seen.param("department"), Some("Sales,Engineering"));
    assert_eq!(seen.param("page"), Some("2"));
    assert_eq!(seen.param("per_page"), Some("15"));
    Ok(())
}

#[tokio::test]
async fn test_directory_view_over_http() -> Result<()> {
    let stub = Arc::new(Stub::new());
    let addr = serve(stub.clone()).await?;
    let directory = client(addr)?.default_directory();

    assert_eq!(directory.load().await?, ApplyOutcome::Applied);
    directory.set_filter(FilterLabel::Search, "Person").await?;

    let snapshot = directory.snapshot();
    assert_eq!(snapshot.records.len(), 3);
    assert_eq!(snapshot.page.total_count, 3);
    assert_eq!(snapshot.page.size_options, vec![15]);
    assert_eq!(stub.last("/api/directory").param("search_query"), Some("person"));
    Ok(())
}

#[tokio::test]
async fn test_forbidden_with_known_status_restricts_view() -> Result<()> {
    let stub = Arc::new(Stub {
        restricted: true,
        ..Stub::new()
    });
    let addr = serve(stub).await?;
    let directory = client(addr)?.default_directory();

    directory.load().await?;
    let snapshot = directory.snapshot();
    assert_eq!(
        snapshot.status,
        ViewStatus::AccessRestricted(AccessStatus::PixelInstallationNeeded)
    );
    assert!(snapshot.records.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_confirmed_unlock_charges_and_refetches() -> Result<()> {
    let stub = Arc::new(Stub::new());
    let addr = serve(stub.clone()).await?;
    let directory = client(addr)?.default_directory();
    directory.load().await?;

    let UnlockOutcome::NeedsConfirmation(pending) = directory.request_unlock(RecordId(3)).await?
    else {
        panic!("expected a confirmation prompt");
    };
    let outcome = directory.confirm_unlock(pending).await?;
    assert!(matches!(outcome, UnlockOutcome::Unlocked { auto_charged: false, .. }));

    let charge = stub.last("/api/credit-charge");
    assert_eq!(charge.method, Method::PUT);
    assert_eq!(serde_json::from_str::<Value>(&charge.body)?, json!({"target_id": 3}));
    assert_eq!(stub.last("/api/directory/record").param("id"), Some("3"));

    let snapshot = directory.snapshot();
    let email = snapshot.records[2].field("email").unwrap();
    assert!(!email.is_hidden());

    // The list was not refetched after the unlock
    let list_requests = stub
        .seen()
        .iter()
        .filter(|seen| seen.path == "/api/directory")
        .count();
    assert_eq!(list_requests, 1);
    Ok(())
}

#[tokio::test]
async fn test_credit_status_and_charge_endpoints() -> Result<()> {
    let stub = Arc::new(Stub {
        credit: "UNLIMITED_CREDITS",
        ..Stub::new()
    });
    let addr = serve(stub.clone()).await?;
    let client = client(addr)?;

    assert_eq!(client.credit_status().await?, CreditStatus::UnlimitedCredits);
    assert_eq!(
        stub.last("/api/credit-status").param("domain"),
        Some("acme.test")
    );
    Ok(())
}

#[tokio::test]
async fn test_server_error_maps_to_status() -> Result<()> {
    let stub = Arc::new(Stub::new());
    let addr = serve(stub).await?;
    let directory = client(addr)?.directory(DirectoryEndpoints::under("/broken"));

    let err = directory
        .backend()
        .fetch_list(&ListQuery {
            params: QueryParams::new(),
            page: 1,
            per_page: 15,
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            code: 500,
            message: "database unavailable".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_export_returns_csv_bytes() -> Result<()> {
    let stub = Arc::new(Stub::new());
    let addr = serve(stub.clone()).await?;
    let directory = client(addr)?.default_directory();
    directory
        .set_filter(FilterLabel::Department, "Sales")
        .await?;

    let csv = directory.export_csv().await?;
    assert_eq!(String::from_utf8(csv)?, "id,name\n1,Person 1\n");
    assert_eq!(stub.last("/api/directory/export").param("department"), Some("Sales"));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() -> Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let err = client(addr)?.credit_status().await.unwrap_err();
    assert!(matches!(
        err,
        insightdesk_sdk::Error::Runtime(insightdesk_runtime::Error::Backend(BackendError::Transport(_)))
    ));
    Ok(())
}
