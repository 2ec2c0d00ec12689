use super::*;
use libhubcat::client::Client;
use libhubcat::config::RegistryEndpoints;
use mockito::{Matcher, Server};

#[test]
fn test_parse_reference_with_tag() {
    assert_eq!(
        parse_reference("bluerobotics/cockpit:1.2").unwrap(),
        ("bluerobotics/cockpit", "1.2")
    );
}

#[test]
fn test_parse_reference_defaults_to_latest() {
    assert_eq!(
        parse_reference("bluerobotics/cockpit").unwrap(),
        ("bluerobotics/cockpit", "latest")
    );
}

#[test]
fn test_parse_reference_rejects_empty_parts() {
    assert!(parse_reference("").is_err());
    assert!(parse_reference("bluerobotics/cockpit:").is_err());
    assert!(parse_reference(":1.0").is_err());
}

#[tokio::test]
async fn test_sorted_labels() {
    let digest = "sha256:cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";
    let mut server = Server::new_async().await;
    let _token = server
        .mock("GET", "/token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"token": "t"}"#)
        .create_async()
        .await;
    let _manifest = server
        .mock("GET", "/v2/org/app/manifests/1.0")
        .match_header("authorization", "Bearer t")
        .with_status(200)
        .with_body(serde_json::json!({ "config": { "digest": digest } }).to_string())
        .create_async()
        .await;
    let _blob = server
        .mock("GET", format!("/v2/org/app/blobs/{}", digest).as_str())
        .with_status(200)
        .with_body(r#"{"config": {"Labels": {"website": "w", "authors": "[]", "docs": "d"}}}"#)
        .create_async()
        .await;

    let client = Client::new(RegistryEndpoints::single_host(&server.url())).unwrap();
    let registry = Registry::new(client).with_machine("aarch64");
    let labels = sorted_labels(&registry, "org/app", "1.0").await.unwrap();

    let keys: Vec<&str> = labels.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["authors", "docs", "website"]);
}
