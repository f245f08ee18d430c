//! Shared utilities for integration testing.

use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use listener_bootstrap::lifecycle::{BootstrapState, ServerInstance, StatusPublisher};
use listener_bootstrap::net::AxumBinder;
use tokio::sync::mpsc;

/// Occupy a free port on all interfaces. The port stays taken until the listener drops.
pub fn occupy_port() -> (TcpListener, u16) {
    let listener = TcpListener::bind("0.0.0.0:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// A port that was free a moment ago.
pub fn free_port() -> u16 {
    occupy_port().1
}

/// A port `p` where both `p` and `p + 1` were free a moment ago.
#[allow(dead_code)]
pub fn free_port_pair() -> u16 {
    for _ in 0..100 {
        let (first, port) = occupy_port();
        if port == u16::MAX {
            continue;
        }
        if TcpListener::bind(("0.0.0.0", port + 1)).is_ok() {
            drop(first);
            return port;
        }
    }
    panic!("no adjacent free ports found");
}

/// Binder serving a plain HTTP route so tests can check reachability.
pub fn test_binder() -> AxumBinder {
    let app = Router::new().route("/", get(|| async { "ok" }));
    AxumBinder::new(app, Duration::from_millis(200))
}

/// GET `/` over plaintext HTTP on the loopback address.
pub async fn http_get(port: u16) -> reqwest::Response {
    try_http_get(port).await.expect("server unreachable")
}

#[allow(dead_code)]
pub async fn try_http_get(port: u16) -> reqwest::Result<reqwest::Response> {
    client(false)
        .get(format!("http://127.0.0.1:{port}/"))
        .send()
        .await
}

/// GET `/` over TLS on the loopback address, trusting the self-signed fixture.
#[allow(dead_code)]
pub async fn https_get(port: u16) -> reqwest::Result<reqwest::Response> {
    client(true)
        .get(format!("https://127.0.0.1:{port}/"))
        .send()
        .await
}

fn client(accept_fixture_cert: bool) -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .danger_accept_invalid_certs(accept_fixture_cert)
        .build()
        .unwrap()
}

/// Write a credentials file pointing at the PEM fixture.
#[allow(dead_code)]
pub fn write_credentials(dir: &Path) -> PathBuf {
    let keystore = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/keystore.pem");
    let path = dir.join("listener-bootstrap.properties");
    std::fs::write(
        &path,
        format!("wss.keystore={}\nwss.storepass=changeit\n", keystore.display()),
    )
    .unwrap();
    path
}

/// Forwards each bound instance to the test.
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<Arc<ServerInstance>>,
}

impl ChannelPublisher {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Arc<ServerInstance>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl StatusPublisher for ChannelPublisher {
    fn on_bound(&self, instance: Arc<ServerInstance>, _state: Arc<BootstrapState>) {
        let _ = self.tx.send(instance);
    }
}

pub async fn next_bound(rx: &mut mpsc::UnboundedReceiver<Arc<ServerInstance>>) -> Arc<ServerInstance> {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("no server bound")
        .expect("publisher dropped")
}
