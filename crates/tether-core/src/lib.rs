// tether-core: Tolerance config, error types, and the kinematics capability
// trait shared by the tether constraint crates.

pub mod config;
pub mod error;
pub mod traits;

pub use config::ToleranceConfig;
pub use error::{ConfigError, EvalError};
pub use traits::KinematicsProvider;
