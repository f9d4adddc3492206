//! Shared fixtures for CLI integration tests: an HTTP stub of the directory
//! API and a temp config pointing at it.
#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tempfile::TempDir;

pub const DEPARTMENTS: [&str; 2] = ["Sales", "Engineering"];

#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: String,
}

impl Seen {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

struct StubState {
    credit: &'static str,
    people: usize,
    charged: Mutex<HashSet<u64>>,
    seen: Mutex<Vec<Seen>>,
}

impl StubState {
    fn person(&self, id: u64) -> Value {
        let email = if self.charged.lock().unwrap().contains(&id) {
            json!({"value": format!("person{}@acme.test", id), "visibility_status": "visible"})
        } else {
            json!({"value": null, "visibility_status": "hidden"})
        };
        json!({
            "id": id,
            "name": {"value": format!("Person {}", id), "visibility_status": "visible"},
            "department": {
                "value": DEPARTMENTS[id as usize % DEPARTMENTS.len()],
                "visibility_status": "visible"
            },
            "email": email,
        })
    }

    fn matching(&self, seen: &Seen) -> Vec<u64> {
        (1..=self.people as u64)
            .filter(|id| {
                seen.param("department").is_none_or(|wanted| {
                    wanted
                        .split(',')
                        .any(|dept| dept == DEPARTMENTS[*id as usize % DEPARTMENTS.len()])
                })
            })
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    body: String,
) -> Response {
    let seen = Seen {
        method: method.clone(),
        path: uri.path().to_string(),
        query,
        body,
    };
    state.seen.lock().unwrap().push(seen.clone());

    match (method, seen.path.as_str()) {
        (Method::GET, "/api/directory") => {
            let ids = state.matching(&seen);
            let page: usize = seen.param("page").and_then(|p| p.parse().ok()).unwrap_or(1);
            let per_page: usize = seen
                .param("per_page")
                .and_then(|p| p.parse().ok())
                .unwrap_or(15);
            let records: Vec<Value> = ids
                .iter()
                .skip((page - 1) * per_page)
                .take(per_page)
                .map(|id| state.person(*id))
                .collect();
            axum::Json(json!([records, ids.len()])).into_response()
        }
        (Method::GET, "/api/directory/record") => {
            let id = seen.param("id").and_then(|id| id.parse().ok()).unwrap_or(0);
            axum::Json(state.person(id)).into_response()
        }
        (Method::GET, "/api/directory/export") => {
            let mut csv = String::from("id,department\n");
            for id in state.matching(&seen) {
                csv.push_str(&format!(
                    "{},{}\n",
                    id,
                    DEPARTMENTS[id as usize % DEPARTMENTS.len()]
                ));
            }
            csv.into_response()
        }
        (Method::GET, "/api/credit-status") => {
            axum::Json(json!({"status": state.credit})).into_response()
        }
        (Method::PUT, "/api/credit-charge") => {
            let body: Value = serde_json::from_str(&seen.body).unwrap_or_default();
            let Some(id) = body.get("target_id").and_then(Value::as_u64) else {
                return StatusCode::UNPROCESSABLE_ENTITY.into_response();
            };
            state.charged.lock().unwrap().insert(id);
            axum::Json(json!({})).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// The directory API on a loopback port, served from its own runtime so
/// blocking CLI invocations can run against it.
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    _runtime: tokio::runtime::Runtime,
}

impl StubServer {
    pub fn start(credit: &'static str, people: usize) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("Failed to build runtime");
        let state = Arc::new(StubState {
            credit,
            people,
            charged: Mutex::new(HashSet::new()),
            seen: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Failed to read local addr");
        runtime.spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            state,
            _runtime: runtime,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self, path: &str) -> Vec<Seen> {
        self.state
            .seen
            .lock()
            .unwrap()
            .iter()
            .filter(|seen| seen.path == path)
            .cloned()
            .collect()
    }

    pub fn charged(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.state.charged.lock().unwrap().iter().copied().collect();
        ids.sort();
        ids
    }
}

/// A temp dir holding a config file; commands run with `--config` pointing at it.
pub struct TestEnv {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        Self {
            temp_dir,
            config_path,
        }
    }

    pub fn with_server(server: &StubServer) -> Self {
        let env = Self::new();
        let config = format!(
            "[api]\nbase_url = \"{}\"\n\n[session]\ntoken = \"test-token\"\ndomain = \"acme.test\"\n",
            server.base_url()
        );
        std::fs::write(&env.config_path, config).expect("Failed to write config");
        env
    }

    pub fn dir(&self) -> &std::path::Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("insightdesk");
        cmd.arg("--config")
            .arg(&self.config_path)
            .env_remove("INSIGHTDESK_TOKEN")
            .env_remove("INSIGHTDESK_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}
