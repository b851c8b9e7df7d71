use thiserror::Error;

/// Tolerance configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid projection_tolerance: {0} (must be > 0)")]
    InvalidProjectionTolerance(f64),

    #[error("equality_threshold ({threshold}) must be larger than projection_tolerance ({tolerance})")]
    ThresholdNotAboveTolerance { threshold: f64, tolerance: f64 },
}

/// Constraint evaluation errors.
///
/// Copy + static layout for cheap propagation in hot paths: `function` and
/// `jacobian` are called thousands of times per planning query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Joint vector dimension mismatch: expected {expected}, got {got}")]
    DofMismatch { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidProjectionTolerance(0.0).to_string(),
            "Invalid projection_tolerance: 0 (must be > 0)"
        );
        assert_eq!(
            ConfigError::ThresholdNotAboveTolerance {
                threshold: 0.0001,
                tolerance: 0.001
            }
            .to_string(),
            "equality_threshold (0.0001) must be larger than projection_tolerance (0.001)"
        );
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn eval_error_display_messages() {
        assert_eq!(
            EvalError::DofMismatch {
                expected: 7,
                got: 6
            }
            .to_string(),
            "Joint vector dimension mismatch: expected 7, got 6"
        );
    }

    #[test]
    fn eval_error_is_copy() {
        let err = EvalError::DofMismatch {
            expected: 6,
            got: 3,
        };
        let err2 = err; // Copy
        assert_eq!(err, err2);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn errors_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<EvalError>();
    }
}
