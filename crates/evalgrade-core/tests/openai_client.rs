use evalgrade_core::config::{JudgeConfig, JudgeProvider, ResolvedJudge};
use evalgrade_core::judge::{JudgeGateway, JudgeUnavailable};
use evalgrade_core::providers::openai::OpenAiClient;
use evalgrade_core::providers::{ChatMessage, LlmClient};
use evalgrade_core::rubric::PromptSequence;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn judge(base_url: &str) -> ResolvedJudge {
    ResolvedJudge {
        provider: JudgeProvider::OpenAi,
        base_url: base_url.to_string(),
        model: "gpt-4o-mini".to_string(),
        api_key: "sk-test".to_string(),
        temperature: 0.1,
        max_tokens: Some(256),
        timeout_secs: 5,
        model_forced: false,
    }
}

fn completion(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

#[tokio::test]
async fn sends_ordered_messages_and_reads_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 256,
            "messages": [
                {"role": "system", "content": "grade"},
                {"role": "user", "content": "response text"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("['Yes']")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&judge(&format!("{}/v1/", server.uri()))).unwrap();
    let resp = client
        .complete(
            &[ChatMessage::system("grade"), ChatMessage::user("response text")],
            0.1,
        )
        .await
        .unwrap();
    assert_eq!(resp.text, "['Yes']");
    assert_eq!(resp.model, "gpt-4o-mini");
}

#[tokio::test]
async fn http_error_surfaces_as_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&judge(&format!("{}/v1", server.uri()))).unwrap();
    let gateway = JudgeGateway::new(Arc::new(client), 0.1);
    let err = gateway
        .grade(&PromptSequence::new("s", "u"))
        .await
        .unwrap_err();
    match err {
        JudgeUnavailable::Transport { turn, message } => {
            assert_eq!(turn, 1);
            assert!(message.contains("429"), "{message}");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn missing_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&judge(&server.uri())).unwrap();
    let err = client.complete(&[ChatMessage::user("u")], 0.1).await.unwrap_err();
    assert!(err.to_string().contains("missing content"));
}

#[tokio::test]
async fn resolved_config_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer from-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Score: 1/1")))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let resolved = JudgeConfig::default().resolve_with(None, |key| match key {
        "EVALGRADE_JUDGE_BASE_URL" => Some(uri.clone()),
        "EVALGRADE_JUDGE_API_KEY" => Some("from-env".to_string()),
        _ => None,
    });
    let client = OpenAiClient::new(&resolved).unwrap();
    let resp = client.complete(&[ChatMessage::user("u")], 0.1).await.unwrap();
    assert_eq!(resp.text, "Score: 1/1");
}

#[tokio::test]
async fn served_model_is_reported() {
    let server = MockServer::start().await;
    let mut body = completion("['No']");
    body["model"] = json!("gpt-4o-mini-2024-07-18");
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&judge(&server.uri())).unwrap();
    let resp = client.complete(&[ChatMessage::user("u")], 0.1).await.unwrap();
    assert_eq!(resp.provider, "openai");
    assert_eq!(resp.model, "gpt-4o-mini-2024-07-18");
}
