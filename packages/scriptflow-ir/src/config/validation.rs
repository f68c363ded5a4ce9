//! Configuration validation

use super::error::ConfigResult;

/// Configuration objects with range and consistency checks
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Name used in log lines and error hints
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Validation of optional stage overrides
pub trait ValidatableCollection {
    fn validate_all(&self) -> ConfigResult<()>;
}

impl<T: Validatable> ValidatableCollection for Vec<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        self.iter().try_for_each(Validatable::validate)
    }
}

impl<T: Validatable> ValidatableCollection for Option<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        self.iter().try_for_each(Validatable::validate)
    }
}
