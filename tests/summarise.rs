//! End-to-end runs against a mocked Gemini endpoint.

use policy_summa::extract::{DocumentText, ExtractError};
use policy_summa::gemini::{GenerateContentRequest, SummarizeError};
use policy_summa::{prompt, Failure, GeminiClient, Pipeline, Session, Upload};
use reqwest::Client;
use serde_json::{json, Value};
use std::io::Write;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.0-flash";
const API_KEY: &str = "test-key";
const ENDPOINT: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(Client::new(), &server.uri(), MODEL, API_KEY).unwrap()
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": { "promptTokenCount": 310, "candidatesTokenCount": 85 }
    })
}

fn text_upload(content: &str) -> Upload {
    Upload::new("policy.txt", "text/plain", content.as_bytes().to_vec())
}

#[tokio::test]
async fn summarises_a_text_policy() {
    let server = MockServer::start().await;
    let reply = json!({
        "summary": "Annual auto insurance policy.",
        "coverages": ["Third-party liability"],
        "exclusions": [],
        "policyDetails": {
            "policyNumber": "123",
            "policyHolder": "N/A",
            "effectiveDate": "N/A",
            "expirationDate": "N/A",
            "premium": "500 USD/yr",
            "otherDetails": []
        }
    });
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", API_KEY))
        .and(header("content-type", "application/json"))
        .and(body_string_contains("Auto policy #123, premium 500 USD/yr"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate(&format!("```json\n{reply}\n```"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    file.write_all(b"Auto policy #123, premium 500 USD/yr").unwrap();
    let upload = Upload::from_path(file.path(), None).unwrap();
    assert_eq!(upload.mime, "text/plain");

    let session = Session::new();
    let pipeline = Pipeline::new(client_for(&server));
    let outcome = session.summarize(&pipeline, &upload).await;

    let result = match &*outcome {
        Ok(result) => result,
        Err(failure) => panic!("expected a summary, got {failure:?}"),
    };
    assert_eq!(result.summary, "Annual auto insurance policy.");
    assert_eq!(result.coverages, vec!["Third-party liability"]);
    assert_eq!(result.policy_details.policy_number, "123");
    assert_eq!(result.policy_details.premium, "500 USD/yr");
    assert_eq!(session.last_result().as_ref(), Some(result));
}

#[tokio::test]
async fn sends_the_exact_request_body() {
    let server = MockServer::start().await;
    let document = DocumentText::new("Home policy HP-9");
    let request = prompt::build(&document);
    let expected = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(r#"{"summary":"ok"}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(client_for(&server));
    let result = pipeline.run(&text_upload("Home policy HP-9")).await.unwrap();
    assert_eq!(result.summary, "ok");
    assert_eq!(result.policy_details.policy_number, "N/A");
}

#[tokio::test]
async fn server_error_is_an_api_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new();
    let pipeline = Pipeline::new(client_for(&server));
    let outcome = session.summarize(&pipeline, &text_upload("Auto policy")).await;

    match &*outcome {
        Err(Failure::Summarize(SummarizeError::Api { status, body })) => {
            assert_eq!(*status, 500);
            assert_eq!(body, "backend exploded");
        }
        other => panic!("expected Api failure, got {other:?}"),
    }
    assert!(session.last_result().is_none());
}

#[tokio::test]
async fn unparsable_candidate_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(candidate("{\"summary\": \"cut off")),
        )
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(client_for(&server));
    let failure = pipeline.run(&text_upload("Auto policy")).await.unwrap_err();

    assert!(matches!(
        failure,
        Failure::Summarize(SummarizeError::Decode { .. })
    ));
    assert_eq!(failure.diagnostic(), Some("{\"summary\": \"cut off"));
}

#[tokio::test]
async fn missing_candidates_keep_the_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "OTHER" }
        })))
        .mount(&server)
        .await;

    let pipeline = Pipeline::new(client_for(&server));
    let failure = pipeline.run(&text_upload("Auto policy")).await.unwrap_err();

    assert!(matches!(
        failure,
        Failure::Summarize(SummarizeError::EmptyResponse { .. })
    ));
    assert!(failure.diagnostic().unwrap().contains("blockReason"));
}

#[tokio::test]
async fn unsupported_upload_never_reaches_the_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
    file.write_all(b"PK\x03\x04 word document").unwrap();
    let upload = Upload::from_path(file.path(), None).unwrap();

    let pipeline = Pipeline::new(client_for(&server));
    let failure = pipeline.run(&upload).await.unwrap_err();

    assert!(matches!(
        failure,
        Failure::Extract(ExtractError::UnsupportedType(_))
    ));
    assert!(failure.is_local());
}

#[tokio::test]
async fn unreachable_host_is_a_network_failure() {
    // Bind and release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base_url = format!("http://127.0.0.1:{port}");
    let client = GeminiClient::new(Client::new(), &base_url, MODEL, API_KEY).unwrap();

    let pipeline = Pipeline::new(client);
    let failure = pipeline.run(&text_upload("Auto policy")).await.unwrap_err();

    match failure {
        Failure::Summarize(SummarizeError::Network(err)) => {
            assert!(!err.to_string().contains(API_KEY));
        }
        other => panic!("expected Network failure, got {other:?}"),
    }
}
