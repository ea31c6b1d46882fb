//! Mock Shelly device for integration tests.
//!
//! Serves the handful of RPC endpoints the crate uses over plain HTTP/1.1 on
//! an ephemeral localhost port, one request per connection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Observable and configurable state of the mock device.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub id: String,
    pub name: Option<String>,
    pub model: String,
    pub output: bool,
    pub brightness: u8,
    /// Answer every request with this status instead of routing it.
    pub fail_status: Option<u16>,
    /// Answer every request with a body that is not JSON.
    pub malformed: bool,
    /// Request targets received, e.g. `/rpc/Light.Set?id=0&on=true`.
    pub requests: Vec<String>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            id: "shellywalldimmer-b8d61a8a1234".to_string(),
            name: Some("Hallway".to_string()),
            model: shelly_dimmer::MODEL.to_string(),
            output: false,
            brightness: 20,
            fail_status: None,
            malformed: false,
            requests: Vec::new(),
        }
    }
}

/// A running mock device.
pub struct MockDevice {
    address: SocketAddr,
    state: Arc<Mutex<DeviceState>>,
    task: JoinHandle<()>,
}

impl MockDevice {
    pub async fn start(state: DeviceState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(state));

        let shared = state.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let shared = shared.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, shared).await;
                });
            }
        });

        Self {
            address,
            state,
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }

    pub fn authority(&self) -> String {
        self.address.to_string()
    }

    pub fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap()
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// An address nothing listens on.
pub async fn unused_authority() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    address.to_string()
}

async fn handle_connection(
    mut stream: TcpStream,
    state: Arc<Mutex<DeviceState>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buffer);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let (status, body) = route(&target, &mut state.lock().unwrap());

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn route(target: &str, state: &mut DeviceState) -> (u16, String) {
    state.requests.push(target.to_string());

    if let Some(status) = state.fail_status {
        return (status, json!({"code": -1, "message": "mock failure"}).to_string());
    }
    if state.malformed {
        return (200, "<html>not json</html>".to_string());
    }

    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let params: HashMap<&str, &str> = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();

    match path {
        "/rpc/Shelly.GetDeviceInfo" => (
            200,
            json!({
                "name": state.name,
                "id": state.id,
                "mac": "B8D61A8A1234",
                "model": state.model,
                "gen": 2,
                "fw_id": "20231107-164738/1.0.8-g",
                "ver": "1.0.8",
                "app": "WallDimmer",
                "auth_en": false,
                "auth_domain": null
            })
            .to_string(),
        ),
        "/rpc/Light.GetStatus" => (
            200,
            json!({
                "id": 0,
                "source": "http",
                "output": state.output,
                "brightness": state.brightness,
                "temperature": {"tC": 41.2, "tF": 106.2}
            })
            .to_string(),
        ),
        "/rpc/Light.Set" => {
            let was_on = state.output;
            if let Some(on) = params.get("on") {
                state.output = *on == "true";
            }
            if let Some(brightness) = params.get("brightness").and_then(|b| b.parse().ok()) {
                state.brightness = brightness;
            }
            (200, json!({"was_on": was_on}).to_string())
        }
        _ => (404, json!({"code": 404, "message": "No handler"}).to_string()),
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    }
}
