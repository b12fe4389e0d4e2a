use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use haven_match::config::ModelConfig;
use haven_match::gemini::{create_model, GeminiClient};
use haven_match_core::model::{GenerativeModel, ModelError};

/// In-process stand-in for the Gemini REST API.
#[derive(Default)]
struct FakeGemini {
    hits: AtomicUsize,
    /// The first `fail_first` requests answer with `fail_status`.
    fail_first: usize,
    fail_status: u16,
    last_key: Mutex<Option<String>>,
    last_path: Mutex<Option<String>>,
    last_body: Mutex<Option<Value>>,
}

async fn handle(
    State(fake): State<Arc<FakeGemini>>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let hit = fake.hits.fetch_add(1, Ordering::SeqCst) + 1;
    *fake.last_key.lock().unwrap() = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *fake.last_path.lock().unwrap() = Some(call.clone());
    *fake.last_body.lock().unwrap() = Some(body);

    if hit <= fake.fail_first {
        let status = StatusCode::from_u16(fake.fail_status).unwrap();
        return (status, "try again later").into_response();
    }

    if call.ends_with(":embedContent") {
        Json(json!({ "embedding": { "values": [0.25, -0.5, 1.0] } })).into_response()
    } else if call.ends_with(":generateContent") {
        Json(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": "[{\"id\":" }, { "text": "\"m1\"}]" } ] } }
            ]
        }))
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn spawn_fake(fake: FakeGemini) -> (SocketAddr, Arc<FakeGemini>) {
    let fake = Arc::new(fake);
    let app = Router::new()
        .route("/models/{call}", post(handle))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, fake)
}

fn model_config(addr: SocketAddr) -> ModelConfig {
    ModelConfig {
        api_base: format!("http://{}/", addr),
        api_key_env: "HAVEN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        timeout_secs: 5,
        ..ModelConfig::default()
    }
}

fn client(config: &ModelConfig) -> GeminiClient {
    GeminiClient::new(config).unwrap().with_api_key("test-key")
}

#[tokio::test]
async fn test_embed_sends_content_and_reads_values() {
    let (addr, fake) = spawn_fake(FakeGemini::default()).await;
    let client = client(&model_config(addr));

    let values = client.embed("Name: Priya Bio: N/A").await.unwrap();
    assert_eq!(values, vec![0.25, -0.5, 1.0]);

    assert_eq!(
        fake.last_path.lock().unwrap().as_deref(),
        Some("embedding-001:embedContent")
    );
    assert_eq!(fake.last_key.lock().unwrap().as_deref(), Some("test-key"));
    let body = fake.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "models/embedding-001");
    assert_eq!(body["content"]["parts"][0]["text"], "Name: Priya Bio: N/A");
}

#[tokio::test]
async fn test_generate_sends_instruction_and_joins_parts() {
    let (addr, fake) = spawn_fake(FakeGemini::default()).await;
    let client = client(&model_config(addr));

    let text = client
        .generate(Some("Return JSON only."), "USER QUERY: \"resume\"")
        .await
        .unwrap();
    assert_eq!(text, "[{\"id\":\"m1\"}]");

    assert_eq!(
        fake.last_path.lock().unwrap().as_deref(),
        Some("gemini-2.5-pro:generateContent")
    );
    let body = fake.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Return JSON only.");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "USER QUERY: \"resume\"");
}

#[tokio::test]
async fn test_generate_without_instruction_omits_field() {
    let (addr, fake) = spawn_fake(FakeGemini::default()).await;
    let client = client(&model_config(addr));

    client.generate(None, "Summarize this bio").await.unwrap();
    let body = fake.last_body.lock().unwrap().clone().unwrap();
    assert!(body.get("systemInstruction").is_none());
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let (addr, fake) = spawn_fake(FakeGemini {
        fail_first: 1,
        fail_status: 429,
        ..FakeGemini::default()
    })
    .await;
    let config = ModelConfig {
        max_retries: 1,
        ..model_config(addr)
    };

    let values = client(&config).embed("retry me").await.unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(fake.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_retries_by_default() {
    let (addr, fake) = spawn_fake(FakeGemini {
        fail_first: 1,
        fail_status: 503,
        ..FakeGemini::default()
    })
    .await;

    let err = client(&model_config(addr)).embed("once").await.unwrap_err();
    assert!(matches!(err, ModelError::Http { status: 503, .. }));
    assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let (addr, fake) = spawn_fake(FakeGemini {
        fail_first: 5,
        fail_status: 400,
        ..FakeGemini::default()
    })
    .await;
    let config = ModelConfig {
        max_retries: 3,
        ..model_config(addr)
    };

    let err = client(&config).generate(None, "bad").await.unwrap_err();
    match err {
        ModelError::Http { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "try again later");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
    assert_eq!(fake.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let (addr, fake) = spawn_fake(FakeGemini::default()).await;
    let model = create_model(&model_config(addr)).unwrap();
    assert_eq!(model.generation_model(), model_config(addr).generation_model);

    let err = model.embed("anything").await.unwrap_err();
    match err {
        ModelError::MissingConfig(msg) => {
            assert!(msg.contains("HAVEN_TEST_KEY_THAT_IS_NEVER_SET"))
        }
        other => panic!("expected missing config, got {:?}", other),
    }
    assert_eq!(fake.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unexpected_dimensions_are_rejected() {
    let (addr, _) = spawn_fake(FakeGemini::default()).await;
    let config = ModelConfig {
        dims: Some(768),
        ..model_config(addr)
    };

    let err = client(&config).embed("text").await.unwrap_err();
    assert!(matches!(err, ModelError::Malformed(_)));
}

#[tokio::test]
async fn test_disabled_provider_refuses_calls() {
    let config = ModelConfig {
        provider: "disabled".to_string(),
        ..ModelConfig::default()
    };
    let model = create_model(&config).unwrap();

    assert_eq!(model.generation_model(), "disabled");
    assert!(matches!(model.embed("x").await, Err(ModelError::Disabled)));
    assert!(matches!(
        model.generate(None, "x").await,
        Err(ModelError::Disabled)
    ));
}
