//! Errors shared by configuration types across the workspace

/// A tunable failed validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },
}

impl ConfigError {
    /// Check that a value is finite and `>= 0`
    pub fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { field, value });
        }
        if value < 0.0 {
            return Err(ConfigError::Negative { field, value });
        }
        Ok(())
    }

    /// Check that a value is finite and `> 0`
    pub fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { field, value });
        }
        if value <= 0.0 {
            return Err(ConfigError::NotPositive { field, value });
        }
        Ok(())
    }

    /// Check that a value is finite
    pub fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NotFinite { field, value })
        }
    }
}
