//! CLI configuration utilities

use anyhow::Result;
use cashrev_http::ClientConfig;
use std::path::Path;

/// Load the client configuration from a file (or defaults plus environment)
/// and apply the command-line timeout override
pub fn load_client_config(path: Option<&Path>, timeout_ms: Option<u64>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };

    if let Some(timeout_ms) = timeout_ms {
        config.request.timeout_ms = timeout_ms;
        config.validate()?;
    }

    Ok(config)
}

/// Render a configuration as TOML
pub fn render_config(config: &ClientConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

/// Save configuration to a TOML file
pub fn save_config<P: AsRef<Path>>(config: &ClientConfig, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_config(config)?)?;
    Ok(())
}

/// Generate a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    save_config(&ClientConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cashrev").join("config.toml");

        generate_default_config(&path).unwrap();
        let loaded = load_client_config(Some(&path), None).unwrap();
        let defaults = ClientConfig::default();
        assert_eq!(loaded.base_url, defaults.base_url);
        assert_eq!(loaded.secondary, defaults.secondary);
        assert_eq!(loaded.endpoints, defaults.endpoints);
        assert_eq!(loaded.request.timeout_ms, defaults.request.timeout_ms);
        assert_eq!(loaded.session, defaults.session);

        let mut headers: Vec<_> = loaded
            .request
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        headers.sort();
        assert_eq!(
            headers,
            vec![
                ("accept".to_string(), "application/json".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn timeout_override_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        generate_default_config(&path).unwrap();

        let config = load_client_config(Some(&path), Some(2500)).unwrap();
        assert_eq!(config.request.timeout_ms, 2500);

        assert!(load_client_config(Some(&path), Some(0)).is_err());
    }
}
