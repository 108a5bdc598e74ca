//! Unit tests for bootstrap configuration and graceful degradation
//!
//! Tests that manipulate TWMOD_ROOT_FOLDER are marked with #[serial]
//! so they never race each other on the process environment.

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use twmod_common::config::{
    default_root_folder, RootFolderResolver, TomlConfig, DEFAULT_PORT, MAX_QUEUE_CAPACITY,
    ROOT_FOLDER_ENV,
};

#[test]
fn test_empty_toml_uses_compiled_defaults() {
    let config = TomlConfig::from_toml_str("").unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.queues.pending_capacity, 10);
    assert_eq!(config.queues.approved_capacity, 50);
    assert_eq!(config.queues.rejected_capacity, 50);
    assert_eq!(config.learning.learning_rate, 0.1);
    assert_eq!(config.learning.save_interval_secs, 60);
    assert_eq!(config.logging.level, "info");
    assert!(config.stream.endpoint.is_none());
}

#[test]
fn test_partial_sections_keep_remaining_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        port = 6000

        [queues]
        pending_capacity = 3

        [stream]
        endpoint = "https://stream.example.com/filter"
        "#,
    )
    .unwrap();

    assert_eq!(config.port, 6000);
    assert_eq!(config.queues.pending_capacity, 3);
    assert_eq!(config.queues.approved_capacity, 50);
    assert_eq!(
        config.stream.endpoint.as_deref(),
        Some("https://stream.example.com/filter")
    );
    assert_eq!(config.stream.connect_timeout_secs, 30);
}

#[test]
fn test_invalid_learning_rate_is_rejected() {
    let result = TomlConfig::from_toml_str(
        r#"
        [learning]
        learning_rate = 0.0
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_oversized_queue_capacity_is_rejected() {
    let result = TomlConfig::from_toml_str(&format!(
        "[queues]\napproved_capacity = {}",
        MAX_QUEUE_CAPACITY + 1
    ));
    assert!(result.is_err());

    let huge = TomlConfig::from_toml_str("[queues]\npending_capacity = 4611686018427387903");
    assert!(huge.is_err());
}

#[test]
fn test_unbounded_and_maximum_capacities_are_accepted() {
    let config = TomlConfig::from_toml_str(&format!(
        "[queues]\npending_capacity = 0\nrejected_capacity = {}",
        MAX_QUEUE_CAPACITY
    ))
    .unwrap();
    assert_eq!(config.queues.pending_capacity, 0);
    assert_eq!(config.queues.rejected_capacity, MAX_QUEUE_CAPACITY);
}

#[test]
fn test_malformed_toml_is_rejected() {
    assert!(TomlConfig::from_toml_str("port = \"not a number\"").is_err());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[learning]\nsave_interval_secs = 5").unwrap();

    let config = TomlConfig::load_or_default(&path).unwrap();
    assert_eq!(config.learning.save_interval_secs, 5);
}

#[test]
fn test_database_path_defaults_under_root() {
    let config = TomlConfig::default();
    let root = PathBuf::from("/tmp/twmod-root");
    assert_eq!(config.database_path(&root), root.join("twmod.db"));

    let explicit = TomlConfig {
        database_path: Some(PathBuf::from("/var/db/weights.db")),
        ..TomlConfig::default()
    };
    assert_eq!(
        explicit.database_path(&root),
        PathBuf::from("/var/db/weights.db")
    );
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, default_root_folder());
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/twmod-env-folder");

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(Some(PathBuf::from("/tmp/twmod-toml-folder")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/twmod-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_has_highest_priority() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/twmod-env-folder");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli(Some(PathBuf::from("/tmp/twmod-cli-folder")))
        .with_toml(Some(PathBuf::from("/tmp/twmod-toml-folder")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/twmod-cli-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_toml_used_when_env_absent() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(Some(PathBuf::from("/tmp/twmod-toml-folder")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/twmod-toml-folder"));
}

#[test]
#[serial]
fn test_resolve_and_create_makes_directory() {
    env::remove_var(ROOT_FOLDER_ENV);
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("root");

    let resolved = RootFolderResolver::new("test-module")
        .with_cli(Some(target.clone()))
        .resolve_and_create()
        .unwrap();
    assert_eq!(resolved, target);
    assert!(target.is_dir());
}

#[test]
fn test_stream_endpoint_is_required() {
    let config = TomlConfig::default();
    assert!(config.stream_endpoint().is_err());

    let config = TomlConfig::from_toml_str("[stream]\nendpoint = \"   \"\n").unwrap();
    assert!(config.stream_endpoint().is_err());

    let config =
        TomlConfig::from_toml_str("[stream]\nendpoint = \" http://localhost:9000/stream \"\n")
            .unwrap();
    assert_eq!(
        config.stream_endpoint().unwrap(),
        "http://localhost:9000/stream"
    );
}
