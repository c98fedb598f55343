use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::{
    HandwritingSample, HttpRemoteClient, RemoteClient, RemoteError, StrokePoint, SynthesisParams,
};
use crate::capture::ImagePayload;
use crate::config::RemoteConfig;

/// What the one-shot server saw.
struct Recorded {
    head: String,
    body: Vec<u8>,
}

impl Recorded {
    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Accepts a single request and answers it with `status` and `body`.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Recorded>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let read = socket.read(&mut chunk).await.unwrap();
            assert!(read > 0, "connection closed before headers were complete");
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buffer.len() < header_end + content_length {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        Recorded {
            head,
            body: buffer[header_end..].to_vec(),
        }
    });

    (base_url, server)
}

fn client_for(base_url: String) -> HttpRemoteClient {
    HttpRemoteClient::new(&RemoteConfig {
        base_url,
        username: Some("booth".to_string()),
        ..RemoteConfig::default()
    })
    .unwrap()
}

fn payload() -> ImagePayload {
    ImagePayload::png(vec![137, 80, 78, 71, 1, 2, 3])
}

#[tokio::test]
async fn text_to_art_posts_json_with_rendering_params() {
    let (base_url, server) = serve_once("200 OK", r#"{"svg":"<svg></svg>"}"#).await;
    let client = client_for(base_url);

    let svg = client
        .text_to_art("abcd", client.synthesis_params())
        .await
        .unwrap();

    assert_eq!(svg, "<svg></svg>");
    let recorded = server.await.unwrap();
    assert!(recorded.head.starts_with("POST /synthesize "));
    assert_eq!(
        recorded.body_json(),
        serde_json::json!({"text": "abcd", "bias": 1.0, "style": 0, "line_width": 70})
    );
}

#[tokio::test]
async fn image_to_art_sends_multipart_snapshot() {
    let (base_url, server) = serve_once("200 OK", r#"{"svg":"<svg/>"}"#).await;

    let svg = client_for(base_url).image_to_art(&payload()).await.unwrap();

    assert_eq!(svg, "<svg/>");
    let recorded = server.await.unwrap();
    assert!(recorded.head.starts_with("POST /one-and-done "));
    assert!(recorded.head.to_lowercase().contains("multipart/form-data"));
    let body = recorded.body_text();
    assert!(body.contains(r#"name="image"; filename="snapshot.png""#));
    assert!(body.contains("image/png"));
    assert!(body.contains("name=\"username\"\r\n\r\nbooth"));
    assert!(body.contains("name=\"line_width\"\r\n\r\n52"));
}

#[tokio::test]
async fn image_to_text_returns_result_field() {
    let (base_url, server) = serve_once("200 OK", r#"{"result":"abc"}"#).await;

    let text = client_for(base_url).image_to_text(&payload()).await.unwrap();

    assert_eq!(text, "abc");
    let recorded = server.await.unwrap();
    assert!(recorded.head.starts_with("POST /solve "));
    assert!(!recorded.body_text().contains("name=\"username\""));
}

#[tokio::test]
async fn upload_sample_serializes_strokes() {
    let (base_url, server) = serve_once("204 No Content", "").await;
    let sample = HandwritingSample {
        username: "booth".into(),
        transcription: "hi".into(),
        strokes: vec![vec![
            StrokePoint { x: 1.0, y: 2.0, t: 0 },
            StrokePoint { x: 3.0, y: 4.0, t: 16 },
        ]],
    };

    client_for(base_url).upload_sample(&sample).await.unwrap();

    let recorded = server.await.unwrap();
    assert!(recorded.head.starts_with("POST /save-handwriting-sample "));
    assert_eq!(
        recorded.body_json(),
        serde_json::json!({
            "username": "booth",
            "transcription": "hi",
            "strokes": [[{"x": 1.0, "y": 2.0, "t": 0}, {"x": 3.0, "y": 4.0, "t": 16}]]
        })
    );
}

#[tokio::test]
async fn error_status_is_request_failure() {
    let (base_url, _server) = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;

    let err = client_for(base_url)
        .text_to_art("x", SynthesisParams::default())
        .await
        .unwrap_err();

    match err {
        RemoteError::RequestFailed(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("boom"));
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_body_is_malformed() {
    let (base_url, _server) = serve_once("200 OK", r#"{"svgs":[]}"#).await;

    let err = client_for(base_url)
        .image_to_art(&payload())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::MalformedResponse(_)));
}

#[tokio::test]
async fn unreachable_backend_is_request_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client_for(base_url)
        .image_to_text(&payload())
        .await
        .unwrap_err();

    assert!(matches!(err, RemoteError::RequestFailed(_)));
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = HttpRemoteClient::new(&RemoteConfig {
        base_url: "::not a url::".into(),
        ..RemoteConfig::default()
    });
    assert!(matches!(result, Err(RemoteError::RequestFailed(_))));
}
