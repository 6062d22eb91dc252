use flashgpt_server::config::{Config, ConfigError};
use std::time::Duration;
use tempfile::TempDir;
use validator::Validate;

const SECRET: &str = "config_test_secret_0123456789abcdef";

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("flashgpt.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_default_requires_jwt_secret() {
    let config = Config::default();
    assert!(config.validate().is_err());

    let config = Config {
        jwt_secret: SECRET.to_string(),
        ..Config::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!(
            r#"
server_port = 8081
jwt_secret = "{}"
groq_model = "llama-3.1-8b-instant"
imagekit_folder = "gallery"
"#,
            SECRET
        ),
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.server_port, 8081);
    assert_eq!(config.groq_model, "llama-3.1-8b-instant");
    assert_eq!(config.imagekit_folder, "gallery");
    // Untouched keys keep their defaults
    assert_eq!(config.groq_base_url, "https://api.groq.com/openai/v1");
    assert_eq!(config.jwt_ttl_days, 30);
}

#[test]
fn test_load_from_rejects_short_secret() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "jwt_secret = \"short\"\n");

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_load_from_rejects_privileged_port() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        &format!("server_port = 80\njwt_secret = \"{}\"\n", SECRET),
    );

    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_bind_address_and_timeout() {
    let config = Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 4000,
        http_timeout_secs: 15,
        ..Config::default()
    };

    assert_eq!(config.bind_address(), "127.0.0.1:4000");
    assert_eq!(config.http_timeout(), Duration::from_secs(15));
}
