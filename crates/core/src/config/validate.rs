use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Roles section exists (enforced by serde)
/// - Role ids are non-zero and distinct
/// - Warning tier role names are set and distinct
/// - Liveness port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let roles = &config.roles;
    for (name, id) in [
        ("roles.admin", roles.admin),
        ("roles.moderator", roles.moderator),
        ("roles.owner", roles.owner),
    ] {
        if id == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
        }
    }

    if roles.admin == roles.moderator || roles.admin == roles.owner || roles.moderator == roles.owner
    {
        return Err(ConfigError::ValidationError(
            "roles.admin, roles.moderator and roles.owner must be distinct".to_string(),
        ));
    }

    let warnings = &config.warnings;
    if warnings.author_marker.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "warnings.author_marker cannot be empty".to_string(),
        ));
    }
    if warnings.level_one_role.trim().is_empty() || warnings.level_two_role.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "warning tier role names cannot be empty".to_string(),
        ));
    }
    if warnings.level_one_role == warnings.level_two_role {
        return Err(ConfigError::ValidationError(
            "warnings.level_one_role and warnings.level_two_role must differ".to_string(),
        ));
    }

    if config.liveness.port == 0 {
        return Err(ConfigError::ValidationError(
            "liveness.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}
