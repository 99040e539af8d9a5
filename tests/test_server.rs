//! End-to-end tests over a real TCP connection.

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tickerd::auth::AllowAll;
use tickerd::config::Config;
use tickerd::data::MemoryDataSource;
use tickerd::server::{self, AppContext};

fn test_ctx() -> Arc<AppContext> {
    let config = Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        doc_root: "/nonexistent-doc-root".to_string(),
        threads: 1,
        data_dir: "/nonexistent-data-dir".to_string(),
        jwt_secret: "server-test-secret".to_string(),
        jwt_issuer: "tickerd-tests".to_string(),
        jwt_expiration: 3600,
        protected_routes: vec!["/api".to_string(), "/db".to_string()],
    };
    let data = Arc::new(MemoryDataSource::new(vec![json!({"id": 1})]));
    Arc::new(AppContext::new(config, data, Arc::new(AllowAll)))
}

async fn spawn_server() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::listener::serve(listener, test_ctx()));
    addr
}

/// Reads one full HTTP response: head up to the blank line, then exactly
/// Content-Length body bytes.
async fn read_response(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before response head");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let content_length: usize = head
        .lines()
        .find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| v.trim().parse().unwrap())
        })
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before response body");
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    (head, body)
}

#[tokio::test]
async fn test_keep_alive_serves_multiple_requests_on_one_connection() {
    let addr = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    for _ in 0..2 {
        stream
            .write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        let (head, body) = read_response(&mut stream).await;
        assert!(head.starts_with("HTTP/1.1 200 OK"));
        assert_eq!(
            body,
            br#"{"ok":true,"status_code":200,"data":{"message":"Hello world why"}}"#.to_vec()
        );
    }
}

#[tokio::test]
async fn test_connection_close_ends_the_transport() {
    let addr = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream
        .write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let (head, _) = read_response(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));

    // Server half-closes after the response is fully written
    let mut rest = Vec::new();
    let n = stream.read_to_end(&mut rest).await.unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_protected_route_over_the_wire() {
    let addr = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream
        .write_all(b"GET /db HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();

    let (head, body) = read_response(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 401 Unauthorized"));

    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["ok"], false);
    assert_eq!(parsed["status_code"], 401);
    assert_eq!(parsed["error"], "Missing or malformed Authorization header.");

    // The connection survives the auth failure
    stream
        .write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let (head, _) = read_response(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 200 OK"));
}

#[tokio::test]
async fn test_header_flood_gets_400_then_close() {
    let addr = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    // Headers that never terminate, well past the accepted header size
    let mut flood = b"GET /hello HTTP/1.1\r\n".to_vec();
    while flood.len() < 16 * 1024 {
        flood.extend_from_slice(b"X-Filler: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\r\n");
    }
    stream.write_all(&flood).await.unwrap();

    let (head, _) = read_response(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 400 Bad Request"));

    // Part of the flood may be unread on the server side, so the close can
    // surface as a reset instead of a clean EOF.
    let mut rest = Vec::new();
    let closed = match stream.read_to_end(&mut rest).await {
        Ok(n) => n == 0,
        Err(_) => true,
    };
    assert!(closed);
}

#[tokio::test]
async fn test_oversized_body_declaration_gets_400_then_close() {
    let addr = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream
        .write_all(
            b"POST /login HTTP/1.1\r\nHost: localhost\r\nContent-Length: 999999999\r\n\r\n",
        )
        .await
        .unwrap();

    let (head, _) = read_response(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 400 Bad Request"));

    let mut rest = Vec::new();
    let n = stream.read_to_end(&mut rest).await.unwrap();
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_malformed_request_gets_400_then_close() {
    let addr = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream
        .write_all(b"BOGUS / HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let (head, _) = read_response(&mut stream).await;
    assert!(head.starts_with("HTTP/1.1 400 Bad Request"));

    let mut rest = Vec::new();
    let n = stream.read_to_end(&mut rest).await.unwrap();
    assert_eq!(n, 0);
}
