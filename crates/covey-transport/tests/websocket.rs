//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and connect a
//! `tokio-tungstenite` client to it.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use covey_transport::{
        Connection, PendingConnection, Transport, TransportError,
        WebSocketConnection, WebSocketTransport,
    };
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Opens `path_and_query` against a fresh listener and returns both ends.
    async fn open(path_and_query: &str) -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr");

        let accepting = tokio::spawn(async move {
            transport.accept().await.expect("should accept").upgrade().await
        });
        let (client, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}{path_and_query}"))
                .await
                .expect("client should connect");
        let server = accepting
            .await
            .expect("accept task should not panic")
            .expect("should upgrade");
        (server, client)
    }

    #[tokio::test]
    async fn test_websocket_frames_flow_both_ways() {
        let (server, mut client) = open("/").await;
        assert!(server.id().into_inner() > 0);

        server.send(br#"{"event":"ping"}"#).await.expect("send");
        let frame = client.next().await.unwrap().unwrap();
        assert!(frame.is_text(), "utf-8 payloads go out as text frames");
        assert_eq!(frame.into_data().as_ref(), br#"{"event":"ping"}"#);

        client.send(Message::text("pong")).await.unwrap();
        let received = server.recv().await.expect("recv").expect("a frame");
        assert_eq!(received, b"pong");
    }

    #[tokio::test]
    async fn test_websocket_captures_handshake_params() {
        let (server, _client) = open("/town?token=s3cret&coveyTownID=T1").await;

        let hs = server.handshake();
        assert_eq!(hs.path(), "/town");
        assert_eq!(hs.param("token"), Some("s3cret"));
        assert_eq!(hs.param("coveyTownID"), Some("T1"));
        assert_eq!(hs.param("userID"), None);
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_distinct() {
        let (first, _a) = open("/").await;
        let (second, _b) = open("/").await;

        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (server, mut client) = open("/").await;

        client.send(Message::Close(None)).await.unwrap();

        let result = server.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_server_close_ends_client_stream() {
        let (server, mut client) = open("/user").await;

        server.close().await.expect("close should succeed");

        // The client sees a Close frame (or the end of the stream) and no data.
        match client.next().await {
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {}
            Some(Ok(other)) => panic!("expected close, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_websocket_idle_peer_does_not_block_next_accept() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr");

        // Connects at the TCP level and never sends an upgrade request.
        let _idle = tokio::net::TcpStream::connect(addr).await.unwrap();
        let stalled = transport.accept().await.expect("idle peer accepted");
        let stalled = tokio::spawn(stalled.upgrade());

        let accepting = tokio::spawn(async move {
            transport.accept().await.expect("should accept").upgrade().await
        });
        let client = tokio::time::timeout(
            Duration::from_secs(2),
            tokio_tungstenite::connect_async(format!("ws://{addr}/town")),
        )
        .await
        .expect("second client should not wait on the idle one")
        .expect("client should connect");
        let server = accepting.await.unwrap().expect("should upgrade");

        assert_eq!(server.handshake().path(), "/town");
        assert!(!stalled.is_finished());
        stalled.abort();
        drop(client);
    }

    #[tokio::test]
    async fn test_websocket_upgrade_times_out_on_silent_peer() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind")
            .with_handshake_timeout(Duration::from_millis(100));
        let addr = transport.local_addr().expect("local addr");

        let _idle = tokio::net::TcpStream::connect(addr).await.unwrap();
        let pending = transport.accept().await.expect("should accept");

        let result = pending.upgrade().await;
        assert!(
            matches!(result, Err(TransportError::UpgradeTimeout(t)) if t == Duration::from_millis(100)),
            "silent peer should time out"
        );
    }
}
