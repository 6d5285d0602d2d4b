#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::TempDir;

pub const API_KEY: &str = "tskey-api-test";
pub const OAUTH_TOKEN: &str = "oauth-token";

/// Canned Tailscale API on a local port. Every request is recorded verbatim.
pub struct MockApi {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockApi {
    pub fn start(devices: Value) -> Self {
        Self::start_with_status(200, devices)
    }

    pub fn start_with_status(status: u16, devices: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock api");
        let url = format!("http://{}", listener.local_addr().expect("mock api addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        let body = json!({ "devices": devices }).to_string();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let request = read_request(&mut stream);
                let (status_line, payload) = route(&request, status, &body);
                log.lock().expect("request log").push(request);
                let _ = write!(
                    stream,
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    payload.len(),
                    payload
                );
            }
        });

        Self { url, requests }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }
}

fn route(request: &str, status: u16, devices: &str) -> (String, String) {
    let first = request.lines().next().unwrap_or_default();
    if first.starts_with("POST /api/v2/oauth/token ") {
        let token = json!({
            "access_token": OAUTH_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600,
        });
        ("200 OK".to_string(), token.to_string())
    } else if first.starts_with("GET /api/v2/tailnet/") && first.contains("/devices ") {
        if status == 200 {
            ("200 OK".to_string(), devices.to_string())
        } else {
            (
                format!("{} Error", status),
                json!({"message": "API token invalid"}).to_string(),
            )
        }
    } else {
        ("404 Not Found".to_string(), "{}".to_string())
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn device(name: &str, addresses: &[&str]) -> Value {
    json!({
        "name": name,
        "addresses": addresses,
        "os": "linux",
        "authorized": true,
    })
}

pub struct TestEnv {
    _tmp: TempDir,
    pub dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let dir = tmp.path().to_path_buf();
        Self { _tmp: tmp, dir }
    }

    pub fn policy(&self, contents: Option<&str>) -> PathBuf {
        let path = self.dir.join("policy.hujson");
        if let Some(contents) = contents {
            std::fs::write(&path, contents).expect("write policy");
        }
        path
    }

    /// The binary with no credentials or API settings leaking in from the
    /// developer's environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("ts-acl-hosts-gen");
        for var in [
            "TS_API_KEY",
            "TS_OAUTH_ID",
            "TS_OAUTH_SECRET",
            "TS_TAILNET",
            "TS_API_URL",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// `cmd()` pointed at `api` with an API key.
    pub fn sync(&self, api: &MockApi, policy: &Path) -> Command {
        let mut cmd = self.cmd();
        cmd.args(["--api-url", api.url.as_str(), "--api-key", API_KEY])
            .arg(policy);
        cmd
    }

    pub fn run_json(&self, api: &MockApi, policy: &Path) -> Value {
        let out = self
            .sync(api, policy)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}
