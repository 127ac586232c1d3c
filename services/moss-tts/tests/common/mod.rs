//! A stand-in MOSS TTS Gradio app shared by the integration tests.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const AUDIO: &[u8] = b"RIFF....WAVEfmt moss";

#[derive(Clone)]
pub struct FakeMoss {
    pub base_url: String,
    pub produce_audio: bool,
    pub calls: Arc<Mutex<Vec<Value>>>,
    pub uploads: Arc<Mutex<usize>>,
}

async fn config() -> Json<Value> {
    Json(json!({"api_prefix": "/gradio_api"}))
}

async fn upload(State(app): State<FakeMoss>, _body: Bytes) -> Json<Vec<String>> {
    *app.uploads.lock().unwrap() += 1;
    Json(vec!["/tmp/gradio/ref/voice.wav".to_string()])
}

async fn call(State(app): State<FakeMoss>, Json(body): Json<Value>) -> Json<Value> {
    app.calls.lock().unwrap().push(body);
    Json(json!({"event_id": "moss-1"}))
}

async fn result(State(app): State<FakeMoss>) -> String {
    let output = if app.produce_audio {
        json!([
            {
                "path": "/tmp/gradio/out/audio.wav",
                "url": format!("{}/gradio_api/file=out.wav", app.base_url),
                "orig_name": "audio.wav",
                "meta": {"_type": "gradio.FileData"}
            },
            "Done in 3.2s"
        ])
    } else {
        json!([null, "Error: reference audio too short"])
    };
    format!("event: complete\ndata: {output}\n\n")
}

async fn audio() -> Bytes {
    Bytes::from_static(AUDIO)
}

pub async fn spawn_moss(produce_audio: bool) -> FakeMoss {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let app = FakeMoss {
        base_url: format!("http://{}", listener.local_addr().unwrap()),
        produce_audio,
        calls: Arc::default(),
        uploads: Arc::default(),
    };

    let router = Router::new()
        .route("/config", get(config))
        .route("/gradio_api/upload", post(upload))
        .route("/gradio_api/call/lambda", post(call))
        .route("/gradio_api/call/lambda/{event_id}", get(result))
        .route("/gradio_api/file=out.wav", get(audio))
        .with_state(app.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    app
}

/// An address nothing is listening on.
pub fn unused_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
