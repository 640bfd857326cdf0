//! HTTP round-trips against a real listener.

use std::time::Duration;

use tessera::{App, Params, Request, Server};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn send(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("response timed out")
        .unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn serves_routes_and_shuts_down() {
    let app = App::new()
        .get("/hello/<name>", |req: &Request, p: &Params| {
            format!("hello {} {}", p.get("name").unwrap_or_default(), req.arg("n").unwrap_or("-"))
        })
        .unwrap()
        .error_handler(404, || "custom missing".to_owned());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(Server::bind(addr.to_string()).serve_with_shutdown(
        listener,
        app,
        async {
            let _ = stopped.await;
        },
    ));

    let resp = send(addr, "GET /hello/kim?n=2 HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 200 OK"), "{resp}");
    assert!(resp.to_ascii_lowercase().contains("content-type: text/html; charset=utf-8"), "{resp}");
    assert!(resp.ends_with("hello kim 2"), "{resp}");

    let resp = send(addr, "GET /nope HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 404 Not Found"), "{resp}");
    assert!(resp.ends_with("custom missing"), "{resp}");

    let resp = send(addr, "BREW /pot HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 405"), "{resp}");

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn debug_mode_serves_requests() {
    let app = App::new().get("/", |_: &Request, _: &Params| "home").unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let server = tokio::spawn(Server::bind(addr.to_string()).debug(true).serve_with_shutdown(
        listener,
        app,
        async {
            let _ = stopped.await;
        },
    ));

    let resp = send(addr, "GET /?x=1 HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 200 OK"), "{resp}");
    assert!(resp.ends_with("home"), "{resp}");

    let resp = send(addr, "GET /missing HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").await;
    assert!(resp.starts_with("HTTP/1.1 404 Not Found"), "{resp}");

    stop.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}
