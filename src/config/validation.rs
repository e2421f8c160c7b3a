//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, address parses)
//! - Check static mounts have a usable route and directory
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("static_files[{index}].path '{path}' must start with '/' and end with '/*filepath'")]
    InvalidStaticPath { index: usize, path: String },

    #[error("static_files[{index}].root must not be empty")]
    EmptyStaticRoot { index: usize },

    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("auth.api_key must not be empty when set")]
    EmptyApiKey,
}

/// Check every field, collecting all problems.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (index, mount) in config.static_files.iter().enumerate() {
        if !mount.path.starts_with('/') || !mount.path.ends_with("/*filepath") {
            errors.push(ValidationError::InvalidStaticPath {
                index,
                path: mount.path.clone(),
            });
        }
        if mount.root.trim().is_empty() {
            errors.push(ValidationError::EmptyStaticRoot { index });
        }
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroLimit("max_body_size"));
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroLimit("request_timeout_secs"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if matches!(&config.auth.api_key, Some(key) if key.trim().is_empty()) {
        errors.push(ValidationError::EmptyApiKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StaticMount;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "not-an-addr".into();
        config.limits.max_body_size = 0;
        config.observability.log_level = "loud".into();
        config.auth.api_key = Some("  ".into());
        config.static_files.push(StaticMount {
            path: "/assets".into(),
            root: String::new(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("not-an-addr".into()),
                ValidationError::InvalidStaticPath {
                    index: 0,
                    path: "/assets".into()
                },
                ValidationError::EmptyStaticRoot { index: 0 },
                ValidationError::ZeroLimit("max_body_size"),
                ValidationError::UnknownLogLevel("loud".into()),
                ValidationError::EmptyApiKey,
            ]
        );
    }

    #[test]
    fn test_accepts_static_mount() {
        let mut config = ServerConfig::default();
        config.static_files.push(StaticMount {
            path: "/assets/*filepath".into(),
            root: "./public".into(),
        });
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
