use libhubcat::config::RegistryEndpoints;
use libhubcat::{AccessToken, Config, HubcatError, Platform, Registry};

#[test]
fn test_registry_from_default_config() {
    let registry = Registry::from_config(&Config::default()).unwrap();
    assert_eq!(
        registry.client().endpoints().auth_url,
        "https://auth.docker.io"
    );
}

#[test]
fn test_registry_with_mirror_endpoints() {
    let mut config = Config::default();
    config.registry = RegistryEndpoints::single_host("http://localhost:5000/");

    let registry = Registry::from_config(&config).unwrap();
    assert_eq!(
        registry.client().endpoints().hub_url,
        "http://localhost:5000"
    );
}

#[test]
fn test_host_platform_matches_mapping() {
    // The host either maps to a registry architecture or is rejected
    match Platform::host() {
        Ok(platform) => {
            assert_eq!(platform.os, "linux");
            assert!(platform.architecture == "amd64" || platform.architecture == "arm");
        }
        Err(err) => assert!(matches!(err, HubcatError::UnsupportedArchitecture { .. })),
    }
}

#[tokio::test]
async fn test_unsupported_machine_fails_before_network() {
    // Nothing listens here; an attempted request would be a Network error
    let mut config = Config::default();
    config.registry = RegistryEndpoints::single_host("http://127.0.0.1:9");
    config.platform.machine = Some("sparc64".to_string());

    let registry = Registry::from_config(&config).unwrap();
    let err = registry
        .resolve_config_digest("org/image", "latest", &AccessToken::new("t"))
        .await
        .unwrap_err();

    assert!(matches!(err, HubcatError::UnsupportedArchitecture { .. }));
}

#[test]
fn test_version_is_set() {
    assert!(!libhubcat::version().is_empty());
}
