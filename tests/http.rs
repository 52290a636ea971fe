use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct UserRecord {
    #[serde(rename = "votesCast")]
    votes_cast: u64,
    #[serde(rename = "tasksCompleted")]
    tasks_completed: u64,
}

#[derive(Debug, Deserialize)]
struct Task {
    id: u32,
    done: bool,
}

#[derive(Debug, Deserialize)]
struct StateResponse {
    votes: BTreeMap<String, u64>,
    user: UserRecord,
    tasks: Vec<Task>,
    can_vote: bool,
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

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied().filter(|pid| *pid > 0) {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
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

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("anime_vote_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/state")).send().await {
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
    spawn_server_with(&unique_data_path()).await
}

async fn spawn_server_with(data_path: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_anime_vote"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
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

async fn fetch_state(client: &Client, base_url: &str) -> StateResponse {
    client
        .get(format!("{base_url}/api/state"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_vote_updates_tally_when_allowed() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_state(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/vote", server.base_url))
        .json(&serde_json::json!({ "anime_id": "2" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();

    let after = fetch_state(&client, &server.base_url).await;
    let count = |state: &StateResponse| state.votes.get("2").copied().unwrap_or(0);

    if before.can_vote {
        assert_eq!(body["accepted"], true);
        assert_eq!(count(&after), count(&before) + 1);
        assert_eq!(after.user.votes_cast, before.user.votes_cast + 1);
    } else {
        assert_eq!(body["accepted"], false);
        assert_eq!(count(&after), count(&before));
        assert_eq!(after.user.votes_cast, before.user.votes_cast);
    }
}

#[tokio::test]
async fn http_complete_task_counts_each_click() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = fetch_state(&client, &server.base_url).await;

    let response = client
        .post(format!("{}/api/tasks/complete", server.base_url))
        .json(&serde_json::json!({ "id": 2, "url": "https://example.com/offer2" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["command"]["open_url"], "https://example.com/offer2");

    let after = fetch_state(&client, &server.base_url).await;
    assert_eq!(after.user.tasks_completed, before.user.tasks_completed + 1);
    let task = after.tasks.iter().find(|task| task.id == 2).unwrap();
    assert!(task.done);
    assert!(after.can_vote);
}

#[tokio::test]
async fn http_state_survives_restart() {
    let data_path = unique_data_path();
    let client = Client::new();

    {
        let server = spawn_server_with(&data_path).await;
        for _ in 0..3 {
            client
                .post(format!("{}/api/vote", server.base_url))
                .json(&serde_json::json!({ "anime_id": "6" }))
                .send()
                .await
                .unwrap();
        }
        let state = fetch_state(&client, &server.base_url).await;
        assert_eq!(state.votes.get("6"), Some(&2));
        assert!(!state.can_vote);
    }

    let server = spawn_server_with(&data_path).await;
    let state = fetch_state(&client, &server.base_url).await;
    assert_eq!(state.votes.get("6"), Some(&2));
    assert_eq!(state.user.votes_cast, 2);
    assert_eq!(state.user.tasks_completed, 0);
    assert!(!state.can_vote);

    let _ = std::fs::remove_file(&data_path);
}
