//! Raw HTTP/1.1 transport over TCP or TLS.
//!
//! One call to [`Transport::fetch`] dials the peer, writes a single
//! `Connection: close` GET frame and reads until the peer closes. There is no
//! connection reuse; the stream is dropped (and the socket closed) on every
//! exit path.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;
use tokio_rustls::TlsConnector;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{self, ClientConfig, RootCertStore};
use tracing::{debug, instrument, trace};

use super::constants::READ_CHUNK_SIZE;
use super::error::DownloadError;
use crate::parser::ParsedUrl;

/// Builds the request frame for a resolved target.
///
/// ```text
/// GET <path> HTTP/1.1\r\n
/// Host: <hostname>\r\n
/// Connection: close\r\n
/// \r\n
/// ```
#[must_use]
pub fn request_frame(target: &ParsedUrl) -> Vec<u8> {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target.path, target.hostname
    )
    .into_bytes()
}

/// Dials peers and performs single request/response exchanges.
///
/// Cheap to clone; the TLS configuration is shared.
#[derive(Clone)]
pub struct Transport {
    tls: TlsConnector,
    timeout: Duration,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Creates a transport verifying TLS peers against the bundled Mozilla roots.
    ///
    /// `timeout` bounds the TCP connect, the TLS handshake, the request write
    /// and each individual read.
    ///
    /// # Errors
    ///
    /// Returns a [`rustls::Error`] if the TLS client configuration cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, rustls::Error> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();

        Ok(Self {
            tls: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }

    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one GET request and returns the raw response bytes.
    ///
    /// # Errors
    ///
    /// Returns a connection-class [`DownloadError`] on connect, TLS, write,
    /// read or timeout failure.
    #[instrument(level = "debug", skip(self, target), fields(authority = %target.authority(), scheme = %target.scheme))]
    pub async fn fetch(&self, target: &ParsedUrl) -> Result<Vec<u8>, DownloadError> {
        let authority = target.authority();

        let tcp = match time::timeout(
            self.timeout,
            TcpStream::connect((target.hostname.as_str(), target.port)),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(DownloadError::connect(authority, e)),
            Err(_) => return Err(DownloadError::timeout(authority, "connect")),
        };
        debug!("connected");

        let request = request_frame(target);

        if target.scheme.is_tls() {
            let server_name = ServerName::try_from(target.hostname.clone()).map_err(|_| {
                DownloadError::InvalidServerName {
                    host: target.hostname.clone(),
                }
            })?;
            let stream = match time::timeout(self.timeout, self.tls.connect(server_name, tcp)).await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(DownloadError::tls(&target.hostname, e)),
                Err(_) => return Err(DownloadError::timeout(authority, "TLS handshake")),
            };
            debug!("TLS handshake complete");
            exchange(stream, &request, self.timeout, &authority, true).await
        } else {
            exchange(tcp, &request, self.timeout, &authority, false).await
        }
    }
}

/// Writes `request` and reads until the peer closes the stream.
///
/// With `tolerate_unclean_close`, a TLS peer that drops the TCP connection
/// without `close_notify` after sending data ends the response normally.
async fn exchange<S>(
    mut stream: S,
    request: &[u8],
    timeout: Duration,
    authority: &str,
    tolerate_unclean_close: bool,
) -> Result<Vec<u8>, DownloadError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match time::timeout(timeout, async {
        stream.write_all(request).await?;
        stream.flush().await
    })
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(DownloadError::network(authority, e)),
        Err(_) => return Err(DownloadError::timeout(authority, "write")),
    }

    let mut response = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let read = match time::timeout(timeout, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
            Ok(Err(e))
                if tolerate_unclean_close
                    && e.kind() == std::io::ErrorKind::UnexpectedEof
                    && !response.is_empty() =>
            {
                trace!("peer closed without close_notify");
                break;
            }
            Ok(Err(e)) => return Err(DownloadError::network(authority, e)),
            Err(_) => return Err(DownloadError::timeout(authority, "read")),
        };
        response.extend_from_slice(&chunk[..read]);
    }

    debug!(bytes = response.len(), "response received");
    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;
    use crate::download::FailureKind;
    use crate::parser::resolve_url;

    /// Accepts one connection, captures the request head, replies with `reply`
    /// and closes.
    async fn one_shot_server(reply: &'static [u8]) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 512];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(reply).await.unwrap();
            head
        });
        (format!("http://{addr}"), handle)
    }

    fn transport() -> Transport {
        Transport::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_frame_layout() {
        let target = resolve_url("http://example.com/a/b.html?x=1").unwrap();
        let frame = String::from_utf8(request_frame(&target)).unwrap();
        assert_eq!(
            frame,
            "GET /a/b.html?x=1 HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_request_frame_has_no_accept_encoding() {
        let target = resolve_url("https://example.com/").unwrap();
        let frame = String::from_utf8(request_frame(&target)).unwrap();
        assert!(!frame.to_ascii_lowercase().contains("accept-encoding"));
    }

    #[tokio::test]
    async fn test_fetch_reads_until_close() {
        let (base, server) = one_shot_server(b"HTTP/1.1 200 OK\r\n\r\nhello").await;
        let target = resolve_url(&format!("{base}/hello.txt")).unwrap();

        let raw = transport().fetch(&target).await.unwrap();
        assert_eq!(raw, b"HTTP/1.1 200 OK\r\n\r\nhello");

        let head = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(head.starts_with("GET /hello.txt HTTP/1.1\r\n"), "{head}");
        assert!(head.contains("Connection: close\r\n"), "{head}");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = resolve_url(&format!("http://{addr}/")).unwrap();
        let err = transport().fetch(&target).await.unwrap_err();
        assert!(matches!(err, DownloadError::Connect { .. }), "{err}");
        assert_eq!(err.kind(), FailureKind::Connection);
    }

    #[tokio::test]
    async fn test_fetch_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            // Hold the connection open without replying
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let target = resolve_url(&format!("http://{addr}/slow")).unwrap();
        let transport = Transport::new(Duration::from_millis(200)).unwrap();
        let err = transport.fetch(&target).await.unwrap_err();
        assert!(
            matches!(err, DownloadError::Timeout { phase: "read", .. }),
            "{err}"
        );
    }

    #[tokio::test]
    async fn test_fetch_tls_against_plain_server_fails_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let _ = socket.write_all(b"HTTP/1.1 200 OK\r\n\r\nnot tls").await;
        });
        let target = resolve_url(&format!("https://{addr}/")).unwrap();

        let err = transport().fetch(&target).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Connection, "{err}");
    }
}
