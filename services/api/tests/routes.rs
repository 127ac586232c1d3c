//! Router tests for the bridge endpoints.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use mockall::mock;
use openclaw_bridge_core::{AgentError, AgentOutcome, AgentRunner};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

mock! {
    Agent {}

    #[async_trait]
    impl AgentRunner for Agent {
        async fn run(&self, message: &str) -> Result<AgentOutcome, AgentError>;
    }
}

fn completed(stdout: &str) -> AgentOutcome {
    AgentOutcome::Completed {
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(agent: impl AgentRunner + 'static, request: Request<Body>) -> (StatusCode, Value) {
    let app = openclaw_bridge::router(Arc::new(agent));
    let resp = ServiceExt::<Request<Body>>::oneshot(app, request)
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 100_000)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn conversation_returns_home_assistant_envelope() {
    let mut agent = MockAgent::new();
    agent
        .expect_run()
        .withf(|message| message == "turn on the kitchen lights")
        .returning(|_| {
            Ok(completed(
                r#"{"payloads": [{"text": "**Done.** Kitchen lights are on.\\nAnything else?"}]}"#,
            ))
        })
        .once();

    let (status, body) = send(
        agent,
        post("/conversation/process", r#"{"text": "turn on the kitchen lights"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "response": {
                "speech": {
                    "plain": {
                        "speech": "Done. Kitchen lights are on.\nAnything else?",
                        "extra_data": null
                    }
                },
                "response_type": "action_done"
            }
        })
    );
}

#[tokio::test]
async fn missing_text_is_rejected_without_running_the_agent() {
    for body in [r#"{}"#, r#"{"message": "hi"}"#, "not json", ""] {
        let mut agent = MockAgent::new();
        agent.expect_run().never();

        let (status, json) = send(agent, post("/conversation/process", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "Missing 'text' field"}));
    }
}

#[tokio::test]
async fn agent_failure_reports_stderr() {
    let mut agent = MockAgent::new();
    agent.expect_run().returning(|_| {
        Ok(AgentOutcome::Failed {
            code: Some(2),
            stdout: String::new(),
            stderr: "gateway unreachable".to_string(),
        })
    });

    let (status, body) = send(agent, post("/conversation/process", r#"{"text": "hi"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "OpenClaw failed", "details": "gateway unreachable"})
    );
}

#[tokio::test]
async fn agent_timeout_maps_to_gateway_timeout() {
    let mut agent = MockAgent::new();
    agent.expect_run().returning(|_| {
        Ok(AgentOutcome::TimedOut {
            after: Duration::from_secs(120),
        })
    });

    let (status, body) = send(agent, post("/conversation/process", r#"{"text": "hi"}"#)).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, json!({"error": "OpenClaw agent timeout"}));
}

#[tokio::test]
async fn other_errors_report_their_message() {
    let mut agent = MockAgent::new();
    agent.expect_run().returning(|_| {
        Err(AgentError::Spawn {
            binary: "/usr/bin/openclaw".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        })
    });

    let (status, body) = send(agent, post("/conversation/process", r#"{"text": "hi"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "failed to start /usr/bin/openclaw: No such file or directory"})
    );
}

#[tokio::test]
async fn agent_stdout_is_trimmed_before_extraction() {
    let mut agent = MockAgent::new();
    agent
        .expect_run()
        .returning(|_| Ok(completed("\n  {\"response\": {\"speech\": {\"plain\": {\"speech\": \"hello\"}}}}\n")));

    let (_, body) = send(agent, post("/conversation/process", r#"{"text": "hi"}"#)).await;

    assert_eq!(body["response"]["speech"]["plain"]["speech"], "hello");
}

#[tokio::test]
async fn health_reports_service_id() {
    let (status, body) = send(MockAgent::new(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "service": "openclaw-http-bridge"})
    );
}

#[tokio::test]
async fn index_lists_endpoints() {
    let (status, body) = send(MockAgent::new(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "OpenClaw HTTP Bridge");
    assert_eq!(body["version"], "1.0.0");
    assert_eq!(
        body["endpoints"]["conversation/process"],
        "POST - Process conversation"
    );
    assert_eq!(body["endpoints"]["health"], "GET - Health check");
}

#[cfg(unix)]
#[tokio::test]
async fn real_process_output_flows_through() {
    use openclaw_bridge_core::OpenClawAgent;
    use secrecy::SecretString;

    // `echo` repeats the agent arguments back as non-JSON output.
    let agent = OpenClawAgent::new(
        "echo",
        SecretString::from("token".to_string()),
        Duration::from_secs(10),
    );

    let (status, body) = send(agent, post("/conversation/process", r#"{"text": "ping"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["response"]["speech"]["plain"]["speech"],
        "agent --agent main --message ping --local --json"
    );
}
