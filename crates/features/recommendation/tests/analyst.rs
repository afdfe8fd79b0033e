use lvai_domain::config::AiConfig;
use lvai_domain::lottery::LotteryType;
use lvai_domain::strategy::Strategy;
use lvai_recommendation::{AnalysisRequest, Analyst, template};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NUMBERS: [u8; 6] = [3, 11, 19, 24, 33, 40];

fn analyst(server: &MockServer, api_key: Option<&str>) -> Analyst {
    Analyst::new(&AiConfig {
        api_key: api_key.map(str::to_owned),
        base_url: format!("{}/v1/", server.uri()),
        model: "test-model".to_owned(),
        max_tokens: 64,
        timeout_seconds: 2,
    })
    .unwrap()
}

fn request() -> AnalysisRequest<'static> {
    AnalysisRequest {
        lottery_type: LotteryType::BigLottery,
        strategy: Strategy::Balanced,
        numbers: &NUMBERS,
        special_number: None,
        stats: &[],
    }
}

fn fallback() -> String {
    template(LotteryType::BigLottery, Strategy::Balanced, NUMBERS.len())
}

#[tokio::test]
async fn uses_the_first_completion_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "test-model", "max_tokens": 64 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Balanced mix of hot and cold.  " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = analyst(&server, Some("sk-test")).explain(&request()).await;
    assert_eq!(text, "Balanced mix of hot and cold.");
}

#[tokio::test]
async fn server_errors_fall_back_to_the_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(analyst(&server, Some("sk-test")).explain(&request()).await, fallback());
}

#[tokio::test]
async fn malformed_bodies_fall_back_to_the_template() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    assert_eq!(analyst(&server, Some("sk-test")).explain(&request()).await, fallback());

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;
    assert_eq!(analyst(&server, Some("sk-test")).explain(&request()).await, fallback());
}

#[tokio::test]
async fn missing_key_never_calls_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let analyst = analyst(&server, None);
    assert!(!analyst.is_enabled());
    assert_eq!(analyst.explain(&request()).await, fallback());
}
