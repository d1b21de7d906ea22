use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const CONTRACT_TOTAL: f64 = 1_000_000.0;

#[derive(Debug, Deserialize)]
struct Entry {
    entry_date: String,
    cumulative_physical_pct: f64,
    cumulative_financial_amount: f64,
    daily_physical_pct: f64,
    daily_financial_amount: f64,
    remaining_balance: f64,
    evidence_count: u32,
    #[serde(default)]
    work_orders: String,
    #[serde(default)]
    quantity_control: String,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    entry: Entry,
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Violation {
    field: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    violations: Vec<Violation>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// One project per test so that tests sharing the server never see each
/// other's entries.
fn write_config() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("rdo_ledger_http_{}_{}.json", std::process::id(), nanos));

    let projects: Vec<Value> = [
        "append",
        "duplicate",
        "validation",
        "undated",
        "correct",
        "dashboard",
    ]
    .iter()
    .map(|id| {
        json!({
            "id": id,
            "name": format!("Test zone {id}"),
            "contract_total_amount": CONTRACT_TOTAL,
            "contract_start": "2025-01-01"
        })
    })
    .collect();
    std::fs::write(&path, json!({ "projects": projects }).to_string()).expect("write config");
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/projects")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let config_path = write_config();
    let child = Command::new(env!("CARGO_BIN_EXE_rdo_ledger"))
        .env("PORT", port.to_string())
        .env("RDO_CONFIG_PATH", config_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

fn rdo(date: &str, physical: f64, financial: f64) -> Value {
    json!({
        "sequence_label": format!("Day {date}"),
        "entry_date": date,
        "weather": "Sunny",
        "incidents": "No incidents",
        "cumulative_physical_pct": physical,
        "cumulative_financial_amount": financial,
        "narrative": "50 kVA transformer installed on pole P-45",
        "personnel_equipment": "Crew A: 1 foreman, 3 linemen",
        "quantity_control": "Yes - verified on site",
        "work_orders": "WO-2025-001 (approved)",
        "evidence_count": 2,
        "supervisor_signature": "SUPERVISOR"
    })
}

async fn append(
    client: &Client,
    server: &TestServer,
    project: &str,
    body: &Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/projects/{project}/entries", server.base_url))
        .json(body)
        .send()
        .await
        .unwrap()
}

async fn entries(client: &Client, server: &TestServer, project: &str) -> Vec<Entry> {
    client
        .get(format!("{}/api/projects/{project}/entries", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_append_derives_daily_figures() {
    let server = shared_server().await;
    let client = Client::new();

    let response = append(&client, &server, "append", &rdo("2025-01-05", 10.0, 1000.0)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first: AppendResponse = response.json().await.unwrap();
    assert_eq!(first.entry.daily_physical_pct, 10.0);
    assert_eq!(first.entry.daily_financial_amount, 1000.0);
    assert_eq!(first.entry.remaining_balance, CONTRACT_TOTAL - 1000.0);
    assert_eq!(first.entry.work_orders, "WO-2025-001 (approved)");
    assert_eq!(first.entry.quantity_control, "Yes - verified on site");
    assert_eq!(first.entries.len(), 1);

    let response = append(&client, &server, "append", &rdo("2025-01-10", 8.0, 1000.0)).await;
    let second: AppendResponse = response.json().await.unwrap();
    assert_eq!(second.entry.daily_physical_pct, 0.0);
    assert_eq!(second.entry.cumulative_physical_pct, 8.0);
    assert_eq!(second.entries.len(), 2);
    assert_eq!(second.entries[0].entry_date, "2025-01-05");
    assert_eq!(second.entries[1].entry_date, "2025-01-10");
}

#[tokio::test]
async fn http_duplicate_date_is_conflict() {
    let server = shared_server().await;
    let client = Client::new();

    let response = append(&client, &server, "duplicate", &rdo("2025-01-05", 10.0, 1000.0)).await;
    assert!(response.status().is_success());

    let response = append(&client, &server, "duplicate", &rdo("2025-01-05", 20.0, 2000.0)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error.contains("correction"));

    let stored = entries(&client, &server, "duplicate").await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].cumulative_financial_amount, 1000.0);
}

#[tokio::test]
async fn http_validation_lists_every_missing_field() {
    let server = shared_server().await;
    let client = Client::new();

    let body = json!({
        "entry_date": "2025-01-05",
        "cumulative_physical_pct": 5.0,
        "cumulative_financial_amount": 10.0
    });
    let response = append(&client, &server, "validation", &body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    let fields: Vec<&str> = body.violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "Execution day",
            "Weather conditions",
            "Activities performed",
            "Photographic evidence",
            "Supervisor signature",
        ]
    );

    assert!(entries(&client, &server, "validation").await.is_empty());
}

#[tokio::test]
async fn http_missing_date_is_reported_with_other_fields() {
    let server = shared_server().await;
    let client = Client::new();

    let body = json!({
        "cumulative_physical_pct": 5.0,
        "cumulative_financial_amount": 10.0
    });
    let response = append(&client, &server, "undated", &body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    assert_eq!(body.error, "entry rejected");
    let fields: Vec<&str> = body.violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "Execution day",
            "Execution date",
            "Weather conditions",
            "Activities performed",
            "Photographic evidence",
            "Supervisor signature",
        ]
    );

    assert!(entries(&client, &server, "undated").await.is_empty());
}

#[tokio::test]
async fn http_correction_recomputes_only_target() {
    let server = shared_server().await;
    let client = Client::new();

    append(&client, &server, "correct", &rdo("2025-01-05", 10.0, 1000.0)).await;
    append(&client, &server, "correct", &rdo("2025-01-10", 8.0, 1500.0)).await;

    let mut correction = rdo("2025-01-05", 10.0, 1200.0);
    if let Some(fields) = correction.as_object_mut() {
        fields.remove("entry_date");
        fields.remove("evidence_count");
    }
    let response = client
        .put(format!("{}/api/projects/correct/entries/2025-01-05", server.base_url))
        .json(&correction)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let corrected: Entry = response.json().await.unwrap();
    assert_eq!(corrected.daily_financial_amount, 1200.0);
    assert_eq!(corrected.remaining_balance, CONTRACT_TOTAL - 1200.0);
    assert_eq!(corrected.evidence_count, 2);

    let stored = entries(&client, &server, "correct").await;
    assert_eq!(stored[1].daily_financial_amount, 500.0);

    let missing = client
        .put(format!("{}/api/projects/correct/entries/2025-02-01", server.base_url))
        .json(&correction)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(entries(&client, &server, "correct").await.len(), 2);
}

#[tokio::test]
async fn http_dashboard_and_unknown_project() {
    let server = shared_server().await;
    let client = Client::new();

    append(&client, &server, "dashboard", &rdo("2025-01-05", 10.0, 250_000.0)).await;

    let dashboard: Value = client
        .get(format!("{}/api/projects/dashboard/dashboard", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["summary"]["entry_count"], 1);
    assert_eq!(dashboard["summary"]["financial_progress_pct"], 25.0);
    assert_eq!(dashboard["summary"]["remaining_balance"], 750_000.0);
    assert_eq!(dashboard["series"]["daily_financial_amount"][0]["value"], 250_000.0);
    assert_eq!(dashboard["project"]["id"], "dashboard");

    let unknown = client
        .get(format!("{}/api/projects/nowhere/entries", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Test zone dashboard"));
}
