//! Sessions without a configured proxy go through HTTP_PROXY.
//!
//! Lives in its own test binary: reqwest reads the proxy variables once per
//! process.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use web_translator::{HttpClient, TranslatorConfig};

#[tokio::test]
async fn test_environment_proxy_is_used() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    std::env::set_var("HTTP_PROXY", format!("http://{}", addr));
    std::env::set_var("http_proxy", format!("http://{}", addr));
    std::env::remove_var("NO_PROXY");
    std::env::remove_var("no_proxy");

    let proxy = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
            .await
            .unwrap();
        String::from_utf8_lossy(&head).into_owned()
    });

    let config = TranslatorConfig {
        timeout: Some(5.0),
        ..Default::default()
    };
    let client = HttpClient::new(&config).unwrap();
    let response = client
        .get("http://translate.invalid/lookup", Some(&[("q", "a b")][..]), None)
        .await
        .unwrap();

    assert_eq!(response.body, "ok");
    let head = proxy.await.unwrap();
    assert!(
        head.starts_with("GET http://translate.invalid/lookup?q=a+b "),
        "{}",
        head
    );
}
