//! Banner grabbing on established TCP connections.
//!
//! Many services announce themselves unprompted (SSH, FTP, SMTP). For the
//! ones that wait for the client, HTTP-family ports get a minimal request
//! after the passive read comes back empty.

use crate::types::Port;
use std::collections::HashSet;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Request sent to request-first ports.
const HTTP_PROBE: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";

/// Longest banner kept after sanitizing.
const MAX_BANNER_CHARS: usize = 512;

/// Plaintext ports that only speak after the client does.
const REQUEST_FIRST_PORTS: &[u16] = &[
    80, 81, 591, 3000, 5000, 8000, 8008, 8080, 8081, 8082, 8083, 8888, 9000, 9090,
];

/// Banner grabbing parameters.
#[derive(Debug, Clone)]
pub struct BannerConfig {
    /// Bound on each read (the passive one and the post-probe one).
    pub read_timeout: Duration,
    /// Read buffer size.
    pub max_bytes: usize,
    /// Ports that receive [`HTTP_PROBE`] when the passive read is empty.
    pub request_first_ports: HashSet<u16>,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(2),
            max_bytes: 1024,
            request_first_ports: REQUEST_FIRST_PORTS.iter().copied().collect(),
        }
    }
}

impl BannerConfig {
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Treat an extra port as request-first.
    pub fn with_request_first_port(mut self, port: u16) -> Self {
        self.request_first_ports.insert(port);
        self
    }

    pub fn is_request_first(&self, port: Port) -> bool {
        self.request_first_ports.contains(&port.as_u16())
    }
}

/// Grab a banner from an open connection, consuming it.
///
/// Timeouts, resets and empty reads all yield `None`. The stream is shut down
/// and dropped before returning, whatever the outcome. Every step, including
/// the probe write and the shutdown, is bounded by `read_timeout`.
pub async fn extract(mut stream: TcpStream, port: Port, config: &BannerConfig) -> Option<String> {
    let mut buffer = vec![0u8; config.max_bytes.max(1)];

    let mut banner = read_once(&mut stream, &mut buffer, config.read_timeout).await;

    if banner.is_none() && config.is_request_first(port) {
        debug!(%port, "no passive banner, sending HTTP probe");
        if let Ok(Ok(())) = timeout(config.read_timeout, stream.write_all(HTTP_PROBE)).await {
            banner = read_once(&mut stream, &mut buffer, config.read_timeout).await;
        }
    }

    let _ = timeout(config.read_timeout, stream.shutdown()).await;
    drop(stream);

    banner
}

async fn read_once(stream: &mut TcpStream, buffer: &mut [u8], limit: Duration) -> Option<String> {
    match timeout(limit, stream.read(buffer)).await {
        Ok(Ok(n)) if n > 0 => sanitize_banner(&buffer[..n]),
        _ => None,
    }
}

/// Reduce raw bytes to a single line of printable ASCII.
///
/// Line breaks and tabs become spaces, other non-printable bytes become `.`,
/// runs of spaces collapse. Returns `None` if nothing printable is left.
pub fn sanitize_banner(data: &[u8]) -> Option<String> {
    let mut result = String::with_capacity(data.len().min(MAX_BANNER_CHARS));
    let mut prev_space = true;

    for &b in data {
        let c = if b.is_ascii_graphic() {
            b as char
        } else if matches!(b, b' ' | b'\r' | b'\n' | b'\t') {
            ' '
        } else {
            '.'
        };

        if c == ' ' {
            if !prev_space {
                result.push(c);
            }
            prev_space = true;
        } else {
            result.push(c);
            prev_space = false;
        }

        if result.len() >= MAX_BANNER_CHARS {
            break;
        }
    }

    let trimmed = result.trim_end();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_sanitize_banner() {
        let data = b"SSH-2.0-OpenSSH_8.9\r\n";
        assert_eq!(sanitize_banner(data).as_deref(), Some("SSH-2.0-OpenSSH_8.9"));
    }

    #[test]
    fn test_sanitize_binary_data() {
        let data = b"\x00\x01Hello\x02World\x03";
        assert_eq!(sanitize_banner(data).as_deref(), Some("..Hello.World."));
    }

    #[test]
    fn test_sanitize_collapses_lines() {
        let data = b"HTTP/1.1 200 OK\r\nServer: nginx\r\n\r\n";
        assert_eq!(
            sanitize_banner(data).as_deref(),
            Some("HTTP/1.1 200 OK Server: nginx")
        );
    }

    #[test]
    fn test_sanitize_whitespace_only() {
        assert_eq!(sanitize_banner(b"\r\n\t  \n"), None);
        assert_eq!(sanitize_banner(b""), None);
    }

    #[test]
    fn test_sanitize_caps_length() {
        let data = vec![b'A'; 4096];
        assert_eq!(sanitize_banner(&data).map(|s| s.len()), Some(MAX_BANNER_CHARS));
    }

    #[test]
    fn test_request_first_ports() {
        let config = BannerConfig::default();
        assert!(config.is_request_first(Port::new(80).unwrap()));
        assert!(config.is_request_first(Port::new(8080).unwrap()));
        assert!(!config.is_request_first(Port::new(22).unwrap()));
    }

    #[tokio::test]
    async fn test_passive_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"220 (vsFTPd 3.0.5)\r\n").await.unwrap();
            let _ = sock.read(&mut [0u8; 16]).await;
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let port = Port::new(addr.port()).unwrap();
        let banner = extract(stream, port, &BannerConfig::default()).await;
        assert_eq!(banner.as_deref(), Some("220 (vsFTPd 3.0.5)"));
    }

    #[tokio::test]
    async fn test_http_probe_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 64];
            let n = sock.read(&mut request).await.unwrap();
            assert!(request[..n].starts_with(b"HEAD / HTTP/1.0"));
            sock.write_all(b"HTTP/1.0 200 OK\r\nServer: Apache/2.4.58\r\n\r\n")
                .await
                .unwrap();
        });

        let config = BannerConfig::default()
            .with_read_timeout(Duration::from_millis(200))
            .with_request_first_port(addr.port());
        let stream = TcpStream::connect(addr).await.unwrap();
        let banner = extract(stream, Port::new(addr.port()).unwrap(), &config).await;
        assert_eq!(
            banner.as_deref(),
            Some("HTTP/1.0 200 OK Server: Apache/2.4.58")
        );
    }

    #[tokio::test]
    async fn test_request_first_port_is_time_bounded() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection without ever reading or replying.
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let read_timeout = Duration::from_millis(100);
        let config = BannerConfig::default()
            .with_read_timeout(read_timeout)
            .with_request_first_port(addr.port());
        let stream = TcpStream::connect(addr).await.unwrap();

        let grabbed = timeout(
            read_timeout * 6,
            extract(stream, Port::new(addr.port()).unwrap(), &config),
        )
        .await;
        assert!(matches!(grabbed, Ok(None)), "{grabbed:?}");
    }

    #[tokio::test]
    async fn test_silent_service_yields_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let _ = sock.read(&mut [0u8; 16]).await;
        });

        let config = BannerConfig::default().with_read_timeout(Duration::from_millis(100));
        let stream = TcpStream::connect(addr).await.unwrap();
        let banner = extract(stream, Port::new(addr.port()).unwrap(), &config).await;
        assert_eq!(banner, None);
    }
}
