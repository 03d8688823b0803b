//! End-to-end tests over a loopback listener
//!
//! Each test binds an ephemeral port, runs the accept loop in a background
//! task and talks to the server with a plain `TcpStream`, the same way a
//! browser would.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use mjpeg_relay::{Frame, FrameBroadcaster, ServerConfig, StreamServer};

const WAIT: Duration = Duration::from_secs(5);

async fn start_server() -> (std::net::SocketAddr, Arc<FrameBroadcaster>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = StreamServer::new(ServerConfig::default());
    let broadcaster = Arc::clone(server.broadcaster());

    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    (addr, broadcaster)
}

async fn get(addr: std::net::SocketAddr, path: &str) -> TcpStream {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {} HTTP/1.1\r\nHost: test\r\n\r\n", path);
    socket.write_all(request.as_bytes()).await.unwrap();
    socket
}

/// Read one CRLF-terminated line.
async fn read_line<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> String {
    let mut line = String::new();
    timeout(WAIT, reader.read_line(&mut line))
        .await
        .expect("timed out reading line")
        .unwrap();
    line.trim_end().to_string()
}

/// Read header lines up to the blank line, returning them lowercased.
async fn read_head<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        let line = read_line(reader).await;
        if line.is_empty() {
            return lines;
        }
        lines.push(line.to_ascii_lowercase());
    }
}

/// Read one multipart part, asserting its layout, and return the body.
async fn read_part<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> Vec<u8> {
    let boundary = read_line(reader).await;
    assert_eq!(boundary, "--FRAME");

    let head = read_head(reader).await;
    assert!(head.contains(&"content-type: image/jpeg".to_string()));

    let length: usize = head
        .iter()
        .find_map(|h| h.strip_prefix("content-length: "))
        .expect("part content-length")
        .parse()
        .unwrap();

    let mut body = vec![0u8; length];
    timeout(WAIT, reader.read_exact(&mut body))
        .await
        .expect("timed out reading part body")
        .unwrap();

    let mut crlf = [0u8; 2];
    timeout(WAIT, reader.read_exact(&mut crlf)).await.unwrap().unwrap();
    assert_eq!(&crlf, b"\r\n");

    body
}

fn jpeg(tag: u8, len: usize) -> Frame {
    let mut data = vec![0xFF, 0xD8, tag];
    data.extend(std::iter::repeat(tag).take(len));
    data.extend([0xFF, 0xD9]);
    Frame::new(Bytes::from(data))
}

#[tokio::test]
async fn test_root_redirects() {
    let (addr, _) = start_server().await;

    let socket = get(addr, "/").await;
    let mut reader = BufReader::new(socket);

    let status = read_line(&mut reader).await;
    assert_eq!(status, "HTTP/1.1 301 Moved Permanently");

    let head = read_head(&mut reader).await;
    assert!(head.contains(&"location: /index.html".to_string()));
    assert!(head.contains(&"content-length: 0".to_string()));
}

#[tokio::test]
async fn test_index_page_embeds_stream() {
    let (addr, _) = start_server().await;

    let socket = get(addr, "/index.html").await;
    let mut reader = BufReader::new(socket);

    let status = read_line(&mut reader).await;
    assert_eq!(status, "HTTP/1.1 200 OK");

    let head = read_head(&mut reader).await;
    let length: usize = head
        .iter()
        .find_map(|h| h.strip_prefix("content-length: "))
        .expect("content-length")
        .parse()
        .unwrap();

    let mut body = vec![0u8; length];
    timeout(WAIT, reader.read_exact(&mut body)).await.unwrap().unwrap();
    let body = String::from_utf8(body).unwrap();
    assert!(body.contains("stream.mjpg"));
}

#[tokio::test]
async fn test_unknown_path_404() {
    let (addr, _) = start_server().await;

    let socket = get(addr, "/nope").await;
    let mut reader = BufReader::new(socket);

    let status = read_line(&mut reader).await;
    assert_eq!(status, "HTTP/1.1 404 Not Found");
}

#[tokio::test]
async fn test_stream_headers_before_first_frame() {
    let (addr, _) = start_server().await;

    // No frame has ever been published; headers must still arrive.
    let socket = get(addr, "/stream.mjpg").await;
    let mut reader = BufReader::new(socket);

    let status = read_line(&mut reader).await;
    assert_eq!(status, "HTTP/1.1 200 OK");

    let head = read_head(&mut reader).await;
    assert!(head.contains(&"age: 0".to_string()));
    assert!(head.contains(&"cache-control: no-cache, private".to_string()));
    assert!(head.contains(&"pragma: no-cache".to_string()));
    assert!(head
        .contains(&"content-type: multipart/x-mixed-replace; boundary=frame".to_string()));
}

#[tokio::test]
async fn test_stream_delivers_published_frames_in_order() {
    let (addr, broadcaster) = start_server().await;

    let socket = get(addr, "/stream.mjpg").await;
    let mut reader = BufReader::new(socket);
    read_line(&mut reader).await;
    read_head(&mut reader).await;

    let first = jpeg(0x01, 100);
    broadcaster.publish(first.clone()).await;
    assert_eq!(read_part(&mut reader).await, first.as_ref());

    let second = jpeg(0x02, 900);
    broadcaster.publish(second.clone()).await;
    assert_eq!(read_part(&mut reader).await, second.as_ref());
}

#[tokio::test]
async fn test_late_joiner_gets_current_frame_immediately() {
    let (addr, broadcaster) = start_server().await;

    broadcaster.publish(jpeg(0x07, 50)).await;
    broadcaster.publish(jpeg(0x08, 60)).await;

    // Latest-wins: a client arriving now sees only the second frame.
    let socket = get(addr, "/stream.mjpg").await;
    let mut reader = BufReader::new(socket);
    read_line(&mut reader).await;
    read_head(&mut reader).await;

    assert_eq!(read_part(&mut reader).await, jpeg(0x08, 60).as_ref());
}

#[tokio::test]
async fn test_disconnected_client_does_not_affect_others() {
    let (addr, broadcaster) = start_server().await;

    let doomed = get(addr, "/stream.mjpg").await;
    let survivor = get(addr, "/stream.mjpg").await;
    let mut survivor = BufReader::new(survivor);
    read_line(&mut survivor).await;
    read_head(&mut survivor).await;

    broadcaster.publish(jpeg(0x01, 10)).await;

    // Drop one client mid-stream; its handler dies on the next write.
    drop(doomed);
    assert_eq!(read_part(&mut survivor).await, jpeg(0x01, 10).as_ref());

    broadcaster.publish(jpeg(0x02, 20)).await;
    assert_eq!(read_part(&mut survivor).await, jpeg(0x02, 20).as_ref());
}

#[tokio::test]
async fn test_many_clients_all_observe_each_publish() {
    let (addr, broadcaster) = start_server().await;

    let mut clients = Vec::new();
    for _ in 0..4 {
        let socket = get(addr, "/stream.mjpg").await;
        let mut reader = BufReader::new(socket);
        read_line(&mut reader).await;
        read_head(&mut reader).await;
        clients.push(reader);
    }

    let frame = jpeg(0x0A, 300);
    broadcaster.publish(frame.clone()).await;

    for reader in &mut clients {
        assert_eq!(read_part(reader).await, frame.as_ref());
    }
}
