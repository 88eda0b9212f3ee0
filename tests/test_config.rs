use std::io::Write;
use std::time::Duration;

use sdwebdav::config::{Config, WriteStrategy};

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:80");
    assert_eq!(cfg.server.read_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.storage.root.to_str(), Some("/mnt/sd"));
    assert_eq!(cfg.storage.write_strategy, WriteStrategy::Contiguous);
    assert_eq!(cfg.bus.blockout(), Duration::from_secs(20));
    assert!(cfg.bus.settle_on_start);
}

#[test]
fn test_config_from_yaml() {
    let yaml = r#"
server:
  listen_addr: "127.0.0.1:8080"
  read_timeout_ms: 250
storage:
  root: /tmp/card
  write_strategy: incremental
bus:
  blockout_ms: 100
  settle_on_start: false
"#;
    let cfg = Config::from_yaml(yaml).unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server.read_timeout(), Duration::from_millis(250));
    assert_eq!(cfg.storage.root.to_str(), Some("/tmp/card"));
    assert_eq!(cfg.storage.write_strategy, WriteStrategy::Incremental);
    assert_eq!(cfg.bus.blockout(), Duration::from_millis(100));
    assert!(!cfg.bus.settle_on_start);
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml("bus:\n  blockout_ms: 5\n").unwrap();

    assert_eq!(cfg.bus.blockout_ms, 5);
    assert!(cfg.bus.settle_on_start);
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:80");
}

#[test]
fn test_config_rejects_unknown_strategy() {
    assert!(Config::from_yaml("storage:\n  write_strategy: sometimes\n").is_err());
}

#[test]
fn test_config_missing_file_is_error() {
    let err = Config::from_file(std::path::Path::new("/nonexistent/sdwebdav.yaml")).unwrap_err();
    assert!(err.to_string().contains("reading config"));
}

// The only test touching the environment, so nothing races on it.
#[test]
fn test_config_load_with_env_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "server:\n  listen_addr: \"0.0.0.0:8000\"\n  read_timeout_ms: 42").unwrap();

    unsafe {
        std::env::set_var("SDWEBDAV_CONFIG", file.path());
        std::env::set_var("LISTEN", "127.0.0.1:3000");
        std::env::set_var("SD_ROOT", "/media/card");
    }
    let cfg = Config::load().unwrap();
    unsafe {
        std::env::remove_var("SDWEBDAV_CONFIG");
        std::env::remove_var("LISTEN");
        std::env::remove_var("SD_ROOT");
    }

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:3000");
    assert_eq!(cfg.server.read_timeout_ms, 42);
    assert_eq!(cfg.storage.root.to_str(), Some("/media/card"));
}
