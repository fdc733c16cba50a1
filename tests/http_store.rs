//! HTTP blob store against a local endpoint

use snapcanvas::{Access, BlobStore, CanvasConfig, CanvasController, Error, HttpBlobStore, PointerState, Point};
use std::sync::mpsc;
use std::sync::Arc;
use tiny_http::{Header, Response, Server};

#[derive(Debug)]
struct Received {
    method: String,
    url: String,
    access: Option<String>,
    auth: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

fn header(req: &tiny_http::Request, name: &'static str) -> Option<String> {
    req.headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str().to_string())
}

/// Serve `count` requests, answering with `status`, and report what arrived.
fn start_blob_server(count: usize, status: u16) -> (String, mpsc::Receiver<Received>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let base = format!("http://{}", server.server_addr());
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        for _ in 0..count {
            let Ok(mut request) = server.recv() else { return };
            let mut body = Vec::new();
            let _ = request.as_reader().read_to_end(&mut body);
            let url = request.url().to_string();
            let received = Received {
                method: request.method().to_string(),
                url: url.clone(),
                access: header(&request, "x-access"),
                auth: header(&request, "Authorization"),
                content_type: header(&request, "Content-Type"),
                body,
            };
            let _ = tx.send(received);

            let response = if status == 200 {
                Response::from_string(format!("{{\"url\":\"https://cdn.example.com{}\"}}", url))
                    .with_header("Content-Type: application/json".parse::<Header>().unwrap())
            } else {
                Response::from_string("storage unavailable").with_status_code(status)
            };
            let _ = request.respond(response);
        }
    });

    (base, rx)
}

#[tokio::test]
async fn put_sends_object_and_returns_public_url() {
    let (base, rx) = start_blob_server(1, 200);
    let store = HttpBlobStore::new(&format!("{}/blobs", base), Some("secret".into())).unwrap();

    let obj = store.put("canvas_42.png", b"png-bytes".to_vec(), Access::Public).await.unwrap();
    assert_eq!(obj.url, "https://cdn.example.com/blobs/canvas_42.png");
    assert_eq!(obj.size, 9);

    let got = rx.recv().unwrap();
    assert_eq!(got.method, "PUT");
    assert_eq!(got.url, "/blobs/canvas_42.png");
    assert_eq!(got.access.as_deref(), Some("public"));
    assert_eq!(got.auth.as_deref(), Some("Bearer secret"));
    assert_eq!(got.content_type.as_deref(), Some("image/png"));
    assert_eq!(got.body, b"png-bytes");
}

#[tokio::test]
async fn rejected_put_is_a_storage_error() {
    let (base, _rx) = start_blob_server(1, 503);
    let store = HttpBlobStore::new(&base, None).unwrap();
    let err = store.put("canvas_1.png", vec![1], Access::Public).await.unwrap_err();
    assert!(matches!(err, Error::StorageError(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let store = HttpBlobStore::with_timeout("http://127.0.0.1:9/", None, 2_000).unwrap();
    let err = store.put("canvas_1.png", vec![1], Access::Public).await.unwrap_err();
    assert!(matches!(err, Error::NetworkError(_)), "got {:?}", err);
}

#[tokio::test]
async fn controller_uploads_png_over_http() {
    let (base, rx) = start_blob_server(1, 200);
    let store = Arc::new(HttpBlobStore::new(&base, None).unwrap());
    let mut canvas = CanvasController::new(CanvasConfig::default(), store, tokio::runtime::Handle::current(), 0).unwrap();
    let stats = canvas.stats();

    canvas.on_tick(&PointerState::mouse_down(Point::new(20.0, 20.0)), 0);
    canvas.on_tick(&PointerState::mouse_down(Point::new(80.0, 60.0)), 16);
    canvas.on_teardown();
    stats.wait_idle().await;

    assert_eq!(stats.succeeded(), 1);
    let got = rx.recv().unwrap();
    assert!(got.url.starts_with("/canvas_"));
    assert!(got.auth.is_none());
    assert_eq!(&got.body[..8], b"\x89PNG\r\n\x1a\n");
}
