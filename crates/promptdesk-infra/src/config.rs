//! Global configuration loader for promptdesk.
//!
//! Reads `config.toml` from the data directory (`~/.promptdesk/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::Path;

use promptdesk_types::config::GlobalConfig;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and returns the default.
/// - Otherwise returns the parsed config; absent keys take their defaults.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Apply command-line overrides on top of the loaded file.
pub fn apply_overrides(
    mut config: GlobalConfig,
    model: Option<String>,
    settle_delay_ms: Option<u64>,
) -> GlobalConfig {
    if let Some(model) = model {
        config.provider.model = model;
    }
    if let Some(delay) = settle_delay_ms {
        config.session.settle_delay_ms = delay;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.provider.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.session.settle_delay_ms, 1000);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[provider]
model = "gemini-pro"
api_key_env = "REACT_APP_API_KEY"
base_url = "http://localhost:8089"
request_timeout_secs = 30

[session]
settle_delay_ms = 250
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.provider.model, "gemini-pro");
        assert_eq!(config.provider.api_key_env, "REACT_APP_API_KEY");
        assert_eq!(config.provider.base_url, "http://localhost:8089");
        assert_eq!(config.provider.request_timeout_secs, 30);
        assert_eq!(config.session.settle_delay_ms, 250);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.session.settle_delay_ms, 1000);
    }

    #[tokio::test]
    async fn load_global_config_unreadable_path_returns_default() {
        let tmp = TempDir::new().unwrap();
        // A directory where the file should be cannot be read as a string.
        tokio::fs::create_dir(tmp.path().join("config.toml")).await.unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.session.settle_delay_ms, 1000);
    }

    #[test]
    fn apply_overrides_replaces_only_given_values() {
        let config = apply_overrides(GlobalConfig::default(), Some("gemini-pro".into()), None);
        assert_eq!(config.provider.model, "gemini-pro");
        assert_eq!(config.session.settle_delay_ms, 1000);

        let config = apply_overrides(GlobalConfig::default(), None, Some(0));
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.session.settle_delay_ms, 0);
    }
}
