//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration entry for error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_unchanged() {
        assert_eq!(expand_env("txt2img", "f").unwrap(), "txt2img");
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PD_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${PD_EXPAND_UNSET:-/srv/out}", "output.root").unwrap(),
            "/srv/out"
        );
    }

    #[test]
    fn test_missing_var_is_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PD_EXPAND_MISSING");
        }
        let err = expand_env("${PD_EXPAND_MISSING}/x", "templates.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in templates.dir: ${PD_EXPAND_MISSING} not set"
        );
    }
}
