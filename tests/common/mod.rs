//! Shared utilities for integration tests.

#![allow(dead_code)]

use serde_json::json;
use std::cell::Cell;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use build_report_server::report::{JsonAppendix, MemoryReport, MemoryReportStore, TreeNode};
use build_report_server::{
    BuildReport, OwnerPump, ReportHandle, ReportServer, ReportStore, ServiceConfig,
};

/// Two reports; `R1` is the latest.
pub fn sample_store() -> MemoryReportStore {
    let mut older = MemoryReport::new("R0", json!({"result": "Failed", "platform": "iOS"}));
    older.steps = vec![json!({"name": "Compile scripts", "durationMs": 900})];

    let mut latest = MemoryReport::new(
        "R1",
        json!({"result": "Succeeded", "platform": "Android", "totalSize": 300}),
    );
    latest.steps = vec![
        json!({"name": "Compile scripts", "durationMs": 1200}),
        json!({"name": "Write asset files", "durationMs": 3400}),
    ];
    latest.assets = vec![TreeNode::branch(
        "Textures",
        vec![
            TreeNode::branch("UI", vec![TreeNode::leaf("button.png", 20)]),
            TreeNode::leaf("sky.png", 280),
        ],
    )];
    latest.files = vec![TreeNode::leaf("data.unity3d", 300)];
    latest.appendices.insert(
        "Foo".into(),
        vec![
            JsonAppendix(json!({"name": "first"})),
            JsonAppendix(json!({"name": "second"})),
            JsonAppendix(json!({"name": "third", "Bar": {"X": "bar-of-x"}})),
        ],
    );

    let mut store = MemoryReportStore::new();
    store.insert(older);
    store.insert(latest);
    store
}

/// Counts how often the report data is touched.
pub struct CountingStore {
    pub inner: MemoryReportStore,
    pub resolves: Cell<usize>,
}

impl CountingStore {
    pub fn new(inner: MemoryReportStore) -> Self {
        Self {
            inner,
            resolves: Cell::new(0),
        }
    }
}

impl ReportStore for CountingStore {
    fn resolve(&self, handle: &ReportHandle) -> Option<&dyn BuildReport> {
        self.resolves.set(self.resolves.get() + 1);
        self.inner.resolve(handle)
    }
}

/// A fast-retrying config on a test-specific port.
pub fn test_config(port: u16) -> ServiceConfig {
    let mut config = ServiceConfig::default().with_port(port);
    config.bind.retry_delay_ms = 20;
    config.limits.read_timeout_secs = 5;
    config
}

/// Start a server and wait until it accepts connections.
pub fn start_server(config: ServiceConfig) -> (ReportServer, OwnerPump) {
    let mut server = ReportServer::new(config);
    let pump = server.start().expect("server starts");
    let state = server.wait_until_settled(Duration::from_secs(10));
    assert!(state.is_running(), "server not running: {state:?}");
    (server, pump)
}

/// Drain the pump on the current (owner) thread until `client` finishes.
pub fn pump_until<S, T>(pump: &mut OwnerPump, store: &S, client: JoinHandle<T>) -> T
where
    S: ReportStore,
{
    while !client.is_finished() {
        pump.drain(store);
        thread::sleep(Duration::from_millis(2));
    }
    client.join().expect("client thread panicked")
}

/// Run `f` on a client thread while the current thread owns the store.
pub fn with_client<S, T, F>(pump: &mut OwnerPump, store: &S, f: F) -> T
where
    S: ReportStore,
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    pump_until(pump, store, thread::spawn(f))
}

pub fn http_client() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// GET `path` on 127.0.0.1 and return the body text.
pub fn get(port: u16, path: &str) -> String {
    http_client()
        .get(format!("http://127.0.0.1:{port}{path}"))
        .send()
        .expect("request succeeds")
        .text()
        .unwrap()
}

/// Send raw bytes and return everything the server wrote back, or `None`
/// if the connection closed without a response.
pub fn raw_request(port: u16, request: &str) -> Option<String> {
    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();
    stream.write_all(request.as_bytes()).unwrap();

    let mut response = Vec::new();
    // Reset or close both count as "no response".
    let _ = stream.read_to_end(&mut response);
    if response.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&response).into_owned())
    }
}

/// A GET request with an explicit Host header.
pub fn get_with_host(path: &str, host: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n")
}

/// Body part of a raw HTTP response.
pub fn body_of(response: &str) -> &str {
    response
        .split_once("\r\n\r\n")
        .map(|(_, body)| body)
        .unwrap_or_default()
}
