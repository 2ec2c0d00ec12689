use super::*;
use crate::config::RegistryEndpoints;
use mockito::{Matcher, Mock, Server};
use std::str::FromStr;

const D1: &str = "sha256:1111111111111111111111111111111111111111111111111111111111111111";
const D2: &str = "sha256:2222222222222222222222222222222222222222222222222222222222222222";
const D3: &str = "sha256:3333333333333333333333333333333333333333333333333333333333333333";
const CONFIG_DIGEST: &str =
    "sha256:b5b2b2c507a0944348e0303114d8d93aaaa081732b86451d9bce1f432a537bc7";

fn registry_for(server: &Server, machine: &str) -> Registry {
    let client = Client::new(RegistryEndpoints::single_host(&server.url())).unwrap();
    Registry::new(client).with_machine(machine)
}

fn token() -> AccessToken {
    AccessToken::new("flow-token")
}

fn three_platform_index() -> String {
    serde_json::json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.oci.image.index.v1+json",
        "manifests": [
            { "digest": D1, "platform": { "os": "linux", "architecture": "amd64" } },
            { "digest": D2, "platform": { "os": "linux", "architecture": "arm" } },
            { "digest": D3, "platform": { "os": "darwin", "architecture": "amd64" } }
        ]
    })
    .to_string()
}

async fn mock_manifest(server: &mut Server, tag: &str, body: String) -> Mock {
    server
        .mock("GET", format!("/v2/org/image/manifests/{}", tag).as_str())
        .match_header("authorization", "Bearer flow-token")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

#[test]
fn test_registry_new_uses_host_machine() {
    let client = Client::new(RegistryEndpoints::default()).unwrap();
    let registry = Registry::new(client);
    assert_eq!(registry.machine(), std::env::consts::ARCH);
}

#[test]
fn test_registry_from_config_with_machine_override() {
    let config = Config::from_yaml_str("platform:\n  machine: armv7l\n").unwrap();
    let registry = Registry::from_config(&config).unwrap();
    assert_eq!(registry.machine(), "armv7l");
    assert_eq!(
        registry.client().endpoints().index_url,
        "https://registry-1.docker.io"
    );
}

#[tokio::test]
async fn test_get_token_rejects_empty_repository() {
    let server = Server::new_async().await;
    let registry = registry_for(&server, "x86_64");

    let err = registry.get_token("").await.unwrap_err();
    assert!(matches!(err, HubcatError::Validation { .. }));
}

#[tokio::test]
async fn test_list_tags_preserves_registry_order_and_returns_token() {
    let mut server = Server::new_async().await;
    let token_mock = server
        .mock("GET", "/token")
        .match_query(Matcher::UrlEncoded(
            "scope".into(),
            "repository:org/image:pull".into(),
        ))
        .with_status(200)
        .with_body(r#"{"token": "listing-token"}"#)
        .create_async()
        .await;
    let tags_mock = server
        .mock("GET", "/v2/repositories/org/image/tags/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"results": [{"name": "v3"}, {"name": "v1"}, {"name": "v2"}]}"#)
        .create_async()
        .await;

    let listing = registry_for(&server, "x86_64")
        .list_tags("org/image")
        .await
        .unwrap();

    token_mock.assert_async().await;
    tags_mock.assert_async().await;
    assert_eq!(listing.tags, vec!["v3", "v1", "v2"]);
    assert_eq!(listing.token.as_str(), "listing-token");
}

#[tokio::test]
async fn test_list_tags_stops_when_token_is_refused() {
    let mut server = Server::new_async().await;
    let _token_mock = server
        .mock("GET", "/token")
        .match_query(Matcher::Any)
        .with_status(403)
        .create_async()
        .await;
    let tags_mock = server
        .mock("GET", "/v2/repositories/org/image/tags/")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = registry_for(&server, "x86_64")
        .list_tags("org/image")
        .await
        .unwrap_err();

    tags_mock.assert_async().await;
    assert!(matches!(
        err,
        HubcatError::Authentication {
            status_code: Some(403),
            ..
        }
    ));
}

#[tokio::test]
async fn test_resolve_single_manifest() {
    let mut server = Server::new_async().await;
    let body = serde_json::json!({
        "schemaVersion": 2,
        "config": { "mediaType": "application/vnd.docker.container.image.v1+json", "digest": CONFIG_DIGEST }
    })
    .to_string();
    let mock = mock_manifest(&mut server, "1.0", body).await;

    let digest = registry_for(&server, "x86_64")
        .resolve_config_digest("org/image", "1.0", &token())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(digest.as_str(), CONFIG_DIGEST);
}

#[tokio::test]
async fn test_resolve_index_on_amd64_host() {
    let mut server = Server::new_async().await;
    let _mock = mock_manifest(&mut server, "1.0", three_platform_index()).await;

    let digest = registry_for(&server, "x86_64")
        .resolve_config_digest("org/image", "1.0", &token())
        .await
        .unwrap();
    assert_eq!(digest.as_str(), D1);
}

#[tokio::test]
async fn test_resolve_index_on_arm_hosts() {
    let mut server = Server::new_async().await;
    let _mock = mock_manifest(&mut server, "1.0", three_platform_index()).await;

    for machine in ["aarch64", "armv7l"] {
        let digest = registry_for(&server, machine)
            .resolve_config_digest("org/image", "1.0", &token())
            .await
            .unwrap();
        assert_eq!(digest.as_str(), D2, "machine {}", machine);
    }
}

#[tokio::test]
async fn test_resolve_unsupported_architecture_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v2/org/image/manifests/1.0")
        .expect(0)
        .create_async()
        .await;

    let err = registry_for(&server, "riscv64")
        .resolve_config_digest("org/image", "1.0", &token())
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        HubcatError::UnsupportedArchitecture { machine } => assert_eq!(machine, "riscv64"),
        other => panic!("Expected UnsupportedArchitecture, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_index_with_two_matches_is_ambiguous() {
    let mut server = Server::new_async().await;
    let body = serde_json::json!({
        "manifests": [
            { "digest": D1, "platform": { "os": "linux", "architecture": "amd64" } },
            { "digest": D2, "platform": { "os": "linux", "architecture": "amd64" } }
        ]
    })
    .to_string();
    let _mock = mock_manifest(&mut server, "dup", body).await;

    let err = registry_for(&server, "x86_64")
        .resolve_config_digest("org/image", "dup", &token())
        .await
        .unwrap_err();

    match err {
        HubcatError::AmbiguousManifest {
            repository,
            tag,
            candidates,
        } => {
            assert_eq!(repository, "org/image");
            assert_eq!(tag, "dup");
            assert_eq!(candidates, 2);
        }
        other => panic!("Expected AmbiguousManifest, got {:?}", other),
    }
}

#[tokio::test]
async fn test_resolve_index_without_matches_is_ambiguous() {
    let mut server = Server::new_async().await;
    let body = serde_json::json!({
        "manifests": [
            { "digest": D3, "platform": { "os": "darwin", "architecture": "amd64" } }
        ]
    })
    .to_string();
    let _mock = mock_manifest(&mut server, "mac", body).await;

    let err = registry_for(&server, "x86_64")
        .resolve_config_digest("org/image", "mac", &token())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HubcatError::AmbiguousManifest { candidates: 0, .. }
    ));
}

#[tokio::test]
async fn test_resolve_deleted_tag_is_manifest_fetch_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/org/image/manifests/gone")
        .with_status(404)
        .with_body("manifest unknown")
        .create_async()
        .await;

    let err = registry_for(&server, "x86_64")
        .resolve_config_digest("org/image", "gone", &token())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HubcatError::ManifestFetch {
            status_code: 404,
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_labels_returns_label_set() {
    let mut server = Server::new_async().await;
    let path = format!("/v2/org/image/blobs/{}", CONFIG_DIGEST);
    let _mock = server
        .mock("GET", path.as_str())
        .match_header("authorization", "Bearer flow-token")
        .with_status(200)
        .with_body(r#"{"config": {"Labels": {"a": "1", "b": "2"}}}"#)
        .create_async()
        .await;

    let digest = Digest::from_str(CONFIG_DIGEST).unwrap();
    let labels = registry_for(&server, "x86_64")
        .fetch_labels("org/image", &digest, &token())
        .await
        .unwrap();

    assert_eq!(labels.len(), 2);
    assert_eq!(labels["a"], "1");
    assert_eq!(labels["b"], "2");
}

#[tokio::test]
async fn test_fetch_labels_without_labels_is_empty() {
    let mut server = Server::new_async().await;
    let path = format!("/v2/org/image/blobs/{}", CONFIG_DIGEST);
    let _mock = server
        .mock("GET", path.as_str())
        .with_status(200)
        .with_body(r#"{"architecture": "amd64", "config": {"Env": []}}"#)
        .create_async()
        .await;

    let digest = Digest::from_str(CONFIG_DIGEST).unwrap();
    let labels = registry_for(&server, "x86_64")
        .fetch_labels("org/image", &digest, &token())
        .await
        .unwrap();
    assert!(labels.is_empty());
}

#[tokio::test]
async fn test_fetch_tag_labels_follows_index_to_blob() {
    let mut server = Server::new_async().await;
    let manifest_mock = mock_manifest(&mut server, "1.0", three_platform_index()).await;
    let blob_path = format!("/v2/org/image/blobs/{}", D1);
    let blob_mock = server
        .mock("GET", blob_path.as_str())
        .match_header("authorization", "Bearer flow-token")
        .with_status(200)
        .with_body(r#"{"config": {"Labels": {"version": "1.0"}}}"#)
        .create_async()
        .await;

    let labels = registry_for(&server, "x86_64")
        .fetch_tag_labels("org/image", "1.0", &token())
        .await
        .unwrap();

    manifest_mock.assert_async().await;
    blob_mock.assert_async().await;
    assert_eq!(labels["version"], "1.0");
}

#[tokio::test]
async fn test_fetch_tag_labels_blob_failure() {
    let mut server = Server::new_async().await;
    let body = serde_json::json!({ "config": { "digest": CONFIG_DIGEST } }).to_string();
    let _manifest = mock_manifest(&mut server, "1.0", body).await;
    let blob_path = format!("/v2/org/image/blobs/{}", CONFIG_DIGEST);
    let _blob = server
        .mock("GET", blob_path.as_str())
        .with_status(500)
        .create_async()
        .await;

    let err = registry_for(&server, "x86_64")
        .fetch_tag_labels("org/image", "1.0", &token())
        .await
        .unwrap_err();
    assert!(matches!(err, HubcatError::BlobFetch { status_code: 500, .. }));
}

#[tokio::test]
async fn test_concurrent_resolutions_are_independent() {
    let mut server = Server::new_async().await;
    let _a = server
        .mock("GET", "/v2/org/a/manifests/1.0")
        .match_header("authorization", "Bearer token-a")
        .with_status(200)
        .with_body(serde_json::json!({ "config": { "digest": D1 } }).to_string())
        .create_async()
        .await;
    let _b = server
        .mock("GET", "/v2/org/b/manifests/1.0")
        .match_header("authorization", "Bearer token-b")
        .with_status(200)
        .with_body(serde_json::json!({ "config": { "digest": D2 } }).to_string())
        .create_async()
        .await;

    let registry = registry_for(&server, "x86_64");
    let token_a = AccessToken::new("token-a");
    let token_b = AccessToken::new("token-b");

    let (a, b) = tokio::join!(
        registry.resolve_config_digest("org/a", "1.0", &token_a),
        registry.resolve_config_digest("org/b", "1.0", &token_b),
    );

    assert_eq!(a.unwrap().as_str(), D1);
    assert_eq!(b.unwrap().as_str(), D2);
}
