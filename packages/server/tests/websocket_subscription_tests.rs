//! GraphQL over WebSocket at /api/subscriptions against a real listener.
//!
//! The identity is taken from the upgrade request (session cookie) and stays
//! fixed for the life of the socket.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use common::*;
use futures::{SinkExt, StreamExt};
use gateway_core::domains::announcements::ANNOUNCEMENT_SENT;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve(app: &TestApp) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr, protocol: &str, cookie: Option<&str>) -> Socket {
    let mut request = format!("ws://{}/api/subscriptions", addr)
        .into_client_request()
        .unwrap();
    request
        .headers_mut()
        .insert("sec-websocket-protocol", HeaderValue::from_str(protocol).unwrap());
    if let Some(cookie) = cookie {
        request
            .headers_mut()
            .insert("cookie", HeaderValue::from_str(cookie).unwrap());
    }

    let (socket, response) = tokio_tungstenite::connect_async(request).await.unwrap();
    assert_eq!(
        response.headers().get("sec-websocket-protocol").unwrap(),
        protocol
    );
    socket
}

async fn send(socket: &mut Socket, message: Value) {
    socket.send(Message::Text(message.to_string())).await.unwrap();
}

/// Next protocol message, skipping keep-alives
async fn recv(socket: &mut Socket) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("Timed out waiting for a message")
            .expect("Socket closed")
            .unwrap();
        let text = match message {
            Message::Text(text) => text,
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected frame: {:?}", other),
        };
        let value: Value = serde_json::from_str(&text).unwrap();
        match value["type"].as_str() {
            Some("ping") | Some("pong") | Some("ka") => continue,
            _ => return value,
        }
    }
}

async fn wait_for_subscribers(app: &TestApp, count: usize) {
    for _ in 0..100 {
        if app.deps.stream_hub.subscriber_count(ANNOUNCEMENT_SENT).await == count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Subscribers never reached {}", count);
}

async fn announce(app: &TestApp, text: &str) {
    let query = format!(r#"mutation {{ announce(announcement: "{}") }}"#, text);
    let (_, body) = app.graphql(&query, &[]).await;
    assert_eq!(body["data"]["announce"], "Sent!");
}

async fn me_over_socket(socket: &mut Socket, id: &str) -> Value {
    send(
        socket,
        json!({ "id": id, "type": "subscribe", "payload": { "query": "{ me { email } }" } }),
    )
    .await;
    let next = recv(socket).await;
    assert_eq!(next["type"], "next");
    assert_eq!(next["id"], id);
    assert_eq!(recv(socket).await, json!({ "id": id, "type": "complete" }));
    next["payload"]["data"]["me"].clone()
}

#[tokio::test]
async fn test_transport_ws_delivers_announcements() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;
    let cookie = app.admin_session().await;

    let mut socket = connect(addr, "graphql-transport-ws", Some(&cookie)).await;
    send(&mut socket, json!({ "type": "connection_init", "payload": {} })).await;
    assert_eq!(recv(&mut socket).await["type"], "connection_ack");

    send(
        &mut socket,
        json!({
            "id": "ann",
            "type": "subscribe",
            "payload": { "query": "subscription { announcementSent }" }
        }),
    )
    .await;
    wait_for_subscribers(&app, 1).await;

    announce(&app, "Doors open at 9").await;
    announce(&app, "Lunch at noon").await;

    for expected in ["Doors open at 9", "Lunch at noon"] {
        let next = recv(&mut socket).await;
        assert_eq!(next["type"], "next");
        assert_eq!(next["id"], "ann");
        assert_eq!(next["payload"]["data"]["announcementSent"], expected);
    }
}

#[tokio::test]
async fn test_socket_identity_comes_from_session_cookie() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;
    let cookie = app.admin_session().await;

    let mut socket = connect(addr, "graphql-transport-ws", Some(&cookie)).await;
    send(&mut socket, json!({ "type": "connection_init", "payload": {} })).await;
    assert_eq!(recv(&mut socket).await["type"], "connection_ack");

    assert_eq!(me_over_socket(&mut socket, "1").await["email"], ADMIN_EMAIL);

    // Logging out does not touch an open socket's identity
    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(me_over_socket(&mut socket, "2").await["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_socket_without_cookie_is_anonymous() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;

    let mut socket = connect(addr, "graphql-transport-ws", None).await;
    send(&mut socket, json!({ "type": "connection_init", "payload": {} })).await;
    assert_eq!(recv(&mut socket).await["type"], "connection_ack");

    assert!(me_over_socket(&mut socket, "1").await.is_null());
}

#[tokio::test]
async fn test_legacy_graphql_ws_protocol() {
    let app = TestApp::new().await;
    let addr = serve(&app).await;

    let mut socket = connect(addr, "graphql-ws", None).await;
    send(&mut socket, json!({ "type": "connection_init", "payload": {} })).await;
    assert_eq!(recv(&mut socket).await["type"], "connection_ack");

    send(
        &mut socket,
        json!({
            "id": "1",
            "type": "start",
            "payload": { "query": "subscription { announcementSent }" }
        }),
    )
    .await;
    wait_for_subscribers(&app, 1).await;

    announce(&app, "hello").await;

    let data = recv(&mut socket).await;
    assert_eq!(data["type"], "data");
    assert_eq!(data["id"], "1");
    assert_eq!(data["payload"]["data"]["announcementSent"], "hello");
}
