//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate path settings (absolute paths, HTML waypoint)
//! - Validate value ranges (timeouts > 0, loopback listener)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::IpAddr;

use crate::config::schema::BridgeConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a configuration for semantic errors.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.listener.host.parse::<IpAddr>() {
        Ok(ip) if !ip.is_loopback() => errors.push(ValidationError::new(
            "listener.host",
            format!("{ip} is not a loopback address"),
        )),
        Ok(_) => {}
        Err(_) if config.listener.host == "localhost" => {}
        Err(_) => errors.push(ValidationError::new(
            "listener.host",
            format!("'{}' is not an IP address", config.listener.host),
        )),
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::new("listener.max_connections", "must be greater than 0"));
    }

    if let Some(waypoint) = &config.bridge.waypoint {
        if !waypoint.starts_with('/') {
            errors.push(ValidationError::new("bridge.waypoint", "must start with '/'"));
        }
        if !waypoint.ends_with(".html") {
            errors.push(ValidationError::new("bridge.waypoint", "must name an .html document"));
        }
    }

    for (i, prefix) in config.bridge.bypass.iter().enumerate() {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::new(
                &format!("bridge.bypass[{i}]"),
                format!("'{prefix}' must start with '/'"),
            ));
        }
    }

    if config.bridge.not_found_page.is_empty() {
        errors.push(ValidationError::new("bridge.not_found_page", "must not be empty"));
    }

    if !config.session.id.contains('@') {
        errors.push(ValidationError::new("session.id", "must have the form <key>@<startId>"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
