//! JWT (HS256) を使った TokenVerifier 実装
//!
//! The credential service signs `{ userId, name }` with a shared secret.
//! Tokens without `exp` are accepted; when `exp` is present it is enforced.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, DisplayName, Identity, TokenVerifier, UserId};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId", alias = "sub")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

pub struct JwtTokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// 共有シークレットから Verifier を作成
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, raw_token: &str) -> Result<Identity, AuthError> {
        if raw_token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let token_data = decode::<Claims>(raw_token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = token_data.claims;

        let user_id =
            UserId::new(claims.user_id).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        // 表示名がなければ user id を使う
        let name = claims
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| user_id.as_str().to_string());
        let display_name =
            DisplayName::new(name).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(Identity::new(user_id, display_name))
    }
}
