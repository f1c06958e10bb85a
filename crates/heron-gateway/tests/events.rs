//! Gateway events through `GatewayHandler`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use heron_core::{Args, Reply, RuntimeApp, RuntimeController, RuntimeInput, RuntimeRoute, SetCookie};
use heron_extract::GatewayEvent;
use heron_gateway::{GatewayError, GatewayHandler};
use heron_runtime::{ConstructorArgs, ControllerDef, ControllerRegistry, Dispatcher, MapEnvironment};
use http::Method;
use serde_json::{json, Value};

struct Files {
    bucket: String,
}

fn handler(constructed: &Arc<AtomicUsize>) -> GatewayHandler {
    let counter = Arc::clone(constructed);
    let registry = ControllerRegistry::new().with(
        "files",
        ControllerDef::builder(move |args: ConstructorArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Files {
                bucket: args.require("BUCKET")?.to_string(),
            })
        })
        .method("get", |this: Arc<Files>, args: Args| async move {
            Ok(Reply::json(json!({
                "bucket": this.bucket,
                "key": args.str(0),
                "session": args.str(1),
            }))
            .with_cookie(SetCookie::new("seen", "1")))
        })
        .method("upload", |_this: Arc<Files>, args: Args| async move {
            let size = args.bytes(0).map_or(0, Bytes::len);
            Ok(Reply::json(json!({ "size": size })))
        })
        .method("download", |_this: Arc<Files>, _args: Args| async move {
            Ok(Reply::binary(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef])))
        })
        .build(),
    );

    let app = RuntimeApp::new([RuntimeController::new("files")
        .ctor_arg("BUCKET")
        .route(
            RuntimeRoute::new(Method::GET, "/files/:key", "get")
                .input(RuntimeInput::path("key", "string"))
                .input(RuntimeInput::cookie("session", "string")),
        )
        .route(RuntimeRoute::new(Method::PUT, "/files", "upload").input(RuntimeInput::body("binary")))
        .route(RuntimeRoute::new(Method::GET, "/download", "download"))]);

    let dispatcher = Dispatcher::builder(app)
        .registry(registry)
        .environment(MapEnvironment::new().with("BUCKET", "media"))
        .build()
        .unwrap();
    GatewayHandler::new(Arc::new(dispatcher)).with_max_body_bytes(8)
}

fn event(value: Value) -> GatewayEvent {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_path_and_cookie_inputs() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let handler = handler(&constructed);

    let response = handler
        .handle(event(json!({
            "version": "2.0",
            "routeKey": "GET /files/{key}",
            "rawPath": "/files/report.pdf",
            "cookies": ["theme=dark", "session=s-42"],
            "pathParameters": { "key": "report.pdf" },
            "requestContext": { "requestId": "abc", "http": { "method": "GET", "path": "/files/report.pdf" } }
        })))
        .await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.cookies, vec!["seen=1".to_string()]);
    let body: Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body, json!({ "bucket": "media", "key": "report.pdf", "session": "s-42" }));
}

#[tokio::test]
async fn test_instance_is_shared_across_events() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let handler = handler(&constructed);

    for key in ["a", "b", "c"] {
        let mut event = GatewayEvent::default();
        event.route_key = "GET /files/{key}".to_string();
        event.raw_path = format!("/files/{key}");
        assert_eq!(handler.handle(event).await.status_code, 200);
    }
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_binary_upload_requires_base64_flag() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let handler = handler(&constructed);

    let mut upload = GatewayEvent::default();
    upload.route_key = "PUT /files".to_string();
    upload.raw_path = "/files".to_string();
    upload.body = Some("AQID".to_string());

    let rejected = handler.handle(upload.clone()).await;
    assert_eq!(rejected.status_code, 400);
    assert_eq!(rejected.body, "Bad Request");

    upload.is_base64_encoded = true;
    let accepted = handler.handle(upload).await;
    assert_eq!(accepted.status_code, 200);
    assert_eq!(accepted.body, r#"{"size":3}"#);
}

#[tokio::test]
async fn test_oversize_body_is_rejected() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let handler = handler(&constructed);

    let mut upload = GatewayEvent::default();
    upload.route_key = "PUT /files".to_string();
    upload.raw_path = "/files".to_string();
    upload.body = Some("AAAAAAAAAAAAAAAA".to_string());
    upload.is_base64_encoded = true;

    let response = handler.handle(upload).await;
    assert_eq!(response.status_code, 413);
    assert_eq!(response.body, "Payload Too Large");
    assert_eq!(constructed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_binary_reply_is_base64_encoded() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let handler = handler(&constructed);

    let mut download = GatewayEvent::default();
    download.route_key = "GET /download".to_string();
    download.raw_path = "/download".to_string();

    let response = handler.handle(download).await;
    assert!(response.is_base64_encoded);
    assert_eq!(response.body, "3q2+7w==");
    assert_eq!(response.body_bytes().unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
}

#[tokio::test]
async fn test_invalid_method_is_bad_request() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let handler = handler(&constructed);

    let response = handler.handle(GatewayEvent::default()).await;
    assert_eq!(response.status_code, 400);
}

#[tokio::test]
async fn test_handle_json() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let handler = handler(&constructed);

    let payload = json!({
        "routeKey": "GET /nowhere",
        "rawPath": "/nowhere",
        "requestContext": { "http": { "method": "GET" } }
    })
    .to_string();
    let out: Value = serde_json::from_str(&handler.handle_json(&payload).await.unwrap()).unwrap();
    assert_eq!(out["statusCode"], 404);
    assert_eq!(out["body"], "Not Found");
    assert_eq!(out["headers"]["content-type"], "text/plain; charset=utf-8");

    let err = handler.handle_json("not json").await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidEvent(_)));
}
