//! Shared helpers for integration tests.
//!
//! wiremock always answers with well-formed HTTP, so malformed and stalled
//! responses come from these raw TCP servers instead.

#![allow(dead_code)]

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A local TCP server that lives until dropped.
pub struct RawServer {
    base_url: String,
    handle: JoinHandle<()>,
}

impl RawServer {
    /// `http://127.0.0.1:<port>`, without a trailing slash.
    pub fn uri(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path` (which must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for RawServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no address");
    (listener, format!("http://{addr}"))
}

async fn read_request(stream: &mut TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0_u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
}

/// Answers every connection with `reply` verbatim, then closes it.
pub async fn spawn_raw_server(reply: &'static [u8]) -> RawServer {
    let (listener, base_url) = bind().await;
    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                read_request(&mut stream).await;
                let _ = stream.write_all(reply).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    RawServer { base_url, handle }
}

/// Accepts connections and never answers, holding them open.
pub async fn spawn_silent_server() -> RawServer {
    let (listener, base_url) = bind().await;
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    RawServer { base_url, handle }
}

/// Answers every connection with `reply` only after `delay`, then closes it.
pub async fn spawn_delayed_server(reply: &'static [u8], delay: Duration) -> RawServer {
    let (listener, base_url) = bind().await;
    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                read_request(&mut stream).await;
                tokio::time::sleep(delay).await;
                let _ = stream.write_all(reply).await;
                let _ = stream.shutdown().await;
            });
        }
    });
    RawServer { base_url, handle }
}
