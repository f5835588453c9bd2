//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Longest socket path most Unix kernels accept (`sun_path` minus the NUL)
pub const MAX_UNIX_SOCKET_PATH: usize = 107;

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Warn about socket paths the kernel is likely to reject at bind time
pub fn check_socket_path_length(path: &str, field_name: &str) {
    if path.len() > MAX_UNIX_SOCKET_PATH {
        log::warn!(
            "{} is {} bytes long; most systems limit socket paths to {} bytes",
            field_name,
            path.len(),
            MAX_UNIX_SOCKET_PATH
        );
    }
}
