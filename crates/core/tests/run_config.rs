use relabel_core::config::{
    load_run_config, NamingConfig, RunConfig, ENV_API_BASE, ENV_API_KEY, ENV_MODEL_NAME,
};
use tempfile::tempdir;

#[test]
fn defaults_match_documented_values() {
    let config = RunConfig::default();
    assert_eq!(config.server_url, "http://127.0.0.1:8080/");
    assert_eq!(config.rename.pattern, "FUN_");
    assert_eq!(config.rename.batch_size, 50);
    assert_eq!(config.rename.delay_secs, 1.0);
    assert_eq!(config.rename.failure_threshold, 10);
    assert_eq!(config.export.batch_size, 50);
    assert_eq!(config.export.workers, 10);
    assert_eq!(config.naming.model, "Qwen/Qwen2.5-72B-Instruct");
    assert_eq!(config.naming.max_tokens, 50);
}

#[test]
fn env_overrides_naming_settings_only_when_set() {
    let config = RunConfig::default().with_env_from(|key| match key {
        ENV_API_KEY => Some("sk-test".to_string()),
        ENV_API_BASE => Some("http://localhost:11434/v1".to_string()),
        ENV_MODEL_NAME => Some("  ".to_string()),
        _ => None,
    });
    assert_eq!(config.naming.api_key, "sk-test");
    assert_eq!(config.naming.api_base, "http://localhost:11434/v1");
    assert_eq!(config.naming.model, NamingConfig::default().model);
}

#[test]
fn partial_json_config_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.json");
    std::fs::write(
        &path,
        r#"{"server_url":"http://10.0.0.5:8080","rename":{"pattern":"sub_","delay_secs":0.5}}"#,
    )
    .unwrap();

    let config = load_run_config(&path).unwrap();
    assert_eq!(config.server_url, "http://10.0.0.5:8080");
    assert_eq!(config.rename.pattern, "sub_");
    assert_eq!(config.rename.delay_secs, 0.5);
    assert_eq!(config.rename.batch_size, 50);
    assert_eq!(config.export.workers, 10);
}

#[test]
fn yaml_config_is_supported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    std::fs::write(&path, "export:\n  workers: 4\n  dir_prefix: dump_\nnaming:\n  model: local\n")
        .unwrap();

    let config = load_run_config(&path).unwrap();
    assert_eq!(config.export.workers, 4);
    assert_eq!(config.export.dir_prefix, "dump_");
    assert_eq!(config.naming.model, "local");
}

#[test]
fn unknown_extension_and_missing_file_are_errors() {
    let dir = tempdir().unwrap();
    let toml = dir.path().join("run.toml");
    std::fs::write(&toml, "x = 1").unwrap();
    let err = load_run_config(&toml).unwrap_err();
    assert!(err.to_string().contains("Unsupported run config format"));

    let missing = load_run_config(&dir.path().join("absent.json")).unwrap_err();
    assert!(missing.to_string().contains("Failed to read run config"));
}
