//! TokenVerifier trait 定義

use super::{entity::Identity, error::AuthError};

/// Validates a bearer credential and extracts the identity it carries.
///
/// Authentication happens exactly once, when a connection is established.
#[cfg_attr(test, mockall::automock)]
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, raw_token: &str) -> Result<Identity, AuthError>;
}
