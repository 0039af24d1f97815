use crate::{expand_path, Config};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_config_values() {
    let config = Config::default();

    assert_eq!(config.cluster.kubectl_bin, "kubectl");
    assert_eq!(config.cluster.namespace, "demo");
    assert_eq!(config.cluster.deployment, "demo-server");
    assert_eq!(config.cluster.selector, "app=demo-server");
    assert_eq!(config.repo.depth, 1);
    assert_eq!(config.coverage.raw_dir, "/tmp/coverage");
    assert_eq!(config.coverage.go_bin, "go");
    assert_eq!(config.timing.poll_interval_secs, 5);
    assert_eq!(config.timing.restart_timeout_secs, 120);
    assert_eq!(config.timing.ready_timeout_secs, 180);
    assert_eq!(config.install.package_manager, "yum");
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kubecov.toml");

    let config_content = r#"
[cluster]
kubectl_bin = "/usr/local/bin/kubectl"
namespace = "staging"
deployment = "gateway"
selector = "app=gateway"
container = "gateway"
process_name = "gateway"

[timing]
poll_interval_secs = 2
restart_timeout_secs = 60
ready_timeout_secs = 90
"#;

    fs::write(&config_path, config_content).unwrap();

    let config = Config::load(Some(config_path.to_str().unwrap())).unwrap();

    assert_eq!(config.cluster.kubectl_bin, "/usr/local/bin/kubectl");
    assert_eq!(config.cluster.namespace, "staging");
    assert_eq!(config.cluster.deployment, "gateway");
    assert_eq!(config.timing.poll_interval_secs, 2);

    // Sections absent from the file keep their defaults
    assert_eq!(config.repo.depth, 1);
    assert_eq!(config.install.package_manager, "yum");
}

#[test]
fn test_save_and_reload_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("saved.toml");

    let mut config = Config::default();
    config.cluster.namespace = "perf".to_string();
    config.timing.poll_interval_secs = 7;

    config.save(config_path.to_str().unwrap()).unwrap();
    let reloaded = Config::load(Some(config_path.to_str().unwrap())).unwrap();

    assert_eq!(reloaded.cluster.namespace, "perf");
    assert_eq!(reloaded.timing.poll_interval_secs, 7);
    assert_eq!(reloaded.cluster.deployment, config.cluster.deployment);
}

#[test]
fn test_validate_rejects_empty_namespace() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.toml");

    let config_content = r#"
[cluster]
kubectl_bin = "kubectl"
namespace = ""
deployment = "gateway"
selector = "app=gateway"
container = "gateway"
process_name = "gateway"
"#;

    fs::write(&config_path, config_content).unwrap();

    let result = Config::load(Some(config_path.to_str().unwrap()));
    assert!(result.is_err());
}

#[test]
fn test_validate_rejects_zero_poll_interval() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bad.toml");

    let config_content = r#"
[timing]
poll_interval_secs = 0
restart_timeout_secs = 60
ready_timeout_secs = 90
"#;

    fs::write(&config_path, config_content).unwrap();

    let result = Config::load(Some(config_path.to_str().unwrap()));
    assert!(result.is_err());
}

#[test]
fn test_duration_accessors() {
    let config = Config::default();
    assert_eq!(config.poll_interval().as_secs(), 5);
    assert_eq!(config.restart_timeout().as_secs(), 120);
    assert_eq!(config.ready_timeout().as_secs(), 180);
}

#[test]
fn test_expand_path_tilde() {
    let expanded = expand_path("~/kubecov/merged");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert!(expanded.to_string_lossy().ends_with("kubecov/merged"));
}

#[test]
fn test_expand_path_absolute_unchanged() {
    let expanded = expand_path("/tmp/coverage");
    assert_eq!(expanded.to_string_lossy(), "/tmp/coverage");
}
