use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// Nested keys are addressed with a double underscore, e.g.
/// `WARNBOT_LIVENESS__PORT=8081`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("WARNBOT_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[roles]
admin = 11
moderator = 22
owner = 33

[liveness]
port = 9000
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.liveness.port, 9000);
        assert_eq!(config.roles.owner, 33);
    }

    #[test]
    fn test_load_config_from_str_missing_roles() {
        let toml = r#"
[liveness]
port = 8080
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[roles]
admin = 11
moderator = 22
owner = 33
perma_ban = 44

[storage]
tickets_path = "/data/tickets.json"

[tickets]
delete_delay_secs = 2
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.roles.perma_ban, Some(44));
        assert_eq!(
            config.storage.tickets_path.to_str().unwrap(),
            "/data/tickets.json"
        );
        assert_eq!(config.tickets.delete_delay_secs, 2);
        assert_eq!(config.storage.warns_path.to_str().unwrap(), "warns.json");
    }
}
