//! Tests for the UDP lookup exchange

use std::time::Duration;

use keyhttpd::proxy::{QueryOutcome, QueryProxy};
use tokio::net::UdpSocket;

/// Binds a fake backend that answers the first query with `chunks`.
async fn fake_backend(chunks: Vec<Vec<u8>>) -> (String, tokio::task::JoinHandle<Vec<u8>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap().to_string();

    let handle = tokio::spawn(async move {
        let mut buf = vec![0u8; 2048];
        let (n, from) = socket.recv_from(&mut buf).await.unwrap();
        for chunk in chunks {
            socket.send_to(&chunk, from).await.unwrap();
        }
        buf.truncate(n);
        buf
    });

    (addr, handle)
}

#[tokio::test]
async fn test_query_reassembles_datagrams() {
    let (addr, backend) = fake_backend(vec![b"AB".to_vec(), b"CD".to_vec(), Vec::new()]).await;
    let proxy = QueryProxy::new(addr, Duration::from_secs(5), 1024);

    let outcome = proxy.query(b"needle").await;

    assert_eq!(backend.await.unwrap(), b"needle".to_vec());
    match outcome {
        QueryOutcome::Reply(body) => assert_eq!(&body[..], b"ABCD"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_query_sends_decoded_term_verbatim() {
    let (addr, backend) = fake_backend(vec![Vec::new()]).await;
    let proxy = QueryProxy::new(addr, Duration::from_secs(5), 1024);

    let outcome = proxy.query(b"a b").await;

    assert_eq!(backend.await.unwrap(), b"a b".to_vec());
    assert!(matches!(outcome, QueryOutcome::Reply(body) if body.is_empty()));
}

#[tokio::test]
async fn test_query_times_out_without_reply() {
    let (addr, _backend) = fake_backend(vec![]).await;
    let proxy = QueryProxy::new(addr, Duration::from_millis(200), 1024);

    let outcome = proxy.query(b"silence").await;

    assert!(matches!(outcome, QueryOutcome::TimedOut));
}

#[tokio::test]
async fn test_query_times_out_without_done_signal() {
    let (addr, _backend) = fake_backend(vec![b"partial".to_vec()]).await;
    let proxy = QueryProxy::new(addr, Duration::from_millis(200), 1024);

    let outcome = proxy.query(b"k").await;

    assert!(matches!(outcome, QueryOutcome::TimedOut));
}

#[tokio::test]
async fn test_query_truncates_oversized_reply() {
    let (addr, _backend) = fake_backend(vec![b"0123456789".to_vec(), b"abcdef".to_vec(), Vec::new()]).await;
    let proxy = QueryProxy::new(addr, Duration::from_secs(5), 12);

    match proxy.query(b"big").await {
        QueryOutcome::Reply(body) => assert_eq!(&body[..], b"0123456789ab"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_query_binary_payload() {
    let (addr, _backend) = fake_backend(vec![b"\x00\xff".to_vec(), b"\x80".to_vec(), Vec::new()]).await;
    let proxy = QueryProxy::new(addr, Duration::from_secs(5), 1024);

    match proxy.query(b"bin").await {
        QueryOutcome::Reply(body) => assert_eq!(&body[..], b"\x00\xff\x80"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_query_deadline_ignores_foreign_datagrams() {
    let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = backend.local_addr().unwrap().to_string();

    // The backend never answers; another host keeps poking the query socket.
    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let (_, query_addr) = backend.recv_from(&mut buf).await.unwrap();
        let stranger = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        for _ in 0..20 {
            let _ = stranger.send_to(b"x", query_addr).await;
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
    });

    let proxy = QueryProxy::new(addr, Duration::from_millis(300), 1024);
    let started = std::time::Instant::now();

    let outcome = proxy.query(b"k").await;

    assert!(matches!(outcome, QueryOutcome::TimedOut));
    assert!(
        started.elapsed() < Duration::from_millis(1000),
        "lookup ran {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_query_deadline_extends_on_backend_data() {
    let backend = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = backend.local_addr().unwrap().to_string();

    // Each datagram arrives inside its own wait, but the whole reply takes
    // longer than a single timeout.
    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let (_, from) = backend.recv_from(&mut buf).await.unwrap();
        for chunk in [&b"A"[..], &b"B"[..], &b"C"[..], &b""[..]] {
            tokio::time::sleep(Duration::from_millis(150)).await;
            backend.send_to(chunk, from).await.unwrap();
        }
    });

    let proxy = QueryProxy::new(addr, Duration::from_millis(400), 1024);

    match proxy.query(b"slow").await {
        QueryOutcome::Reply(body) => assert_eq!(&body[..], b"ABC"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}
