//! UseCase: ルーム作成
//!
//! ルーム名から slug を作り、作成者を管理者として登録する。

use std::sync::Arc;

use crate::domain::{AuthError, RepositoryError, RoomDirectory, RoomId, TokenVerifier};

use super::error::CreateRoomError;

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    token_verifier: Arc<dyn TokenVerifier>,
    rooms: Arc<dyn RoomDirectory>,
}

impl CreateRoomUseCase {
    pub fn new(token_verifier: Arc<dyn TokenVerifier>, rooms: Arc<dyn RoomDirectory>) -> Self {
        Self {
            token_verifier,
            rooms,
        }
    }

    /// ルームを作成する
    ///
    /// # Returns
    ///
    /// * `Ok(RoomId)` - 作成されたルームの ID
    /// * `Err(CreateRoomError)` - 認証失敗、名前が空、slug の重複など
    pub async fn execute(
        &self,
        raw_token: Option<&str>,
        name: &str,
    ) -> Result<RoomId, CreateRoomError> {
        let raw_token = raw_token.ok_or(AuthError::MissingToken)?;
        let identity = self.token_verifier.verify(raw_token)?;

        let slug = slugify(name);
        if slug.is_empty() {
            return Err(CreateRoomError::InvalidName);
        }

        self.rooms
            .create_room(&slug, &identity.user_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => CreateRoomError::AlreadyExists,
                other => {
                    tracing::error!("Failed to create room '{}': {}", slug, other);
                    CreateRoomError::Storage(other)
                }
            })
    }
}

/// ルーム名を URL に使える slug に変換する
///
/// 英数字以外の連続は 1 つの `-` にまとめ、前後の `-` は取り除く。
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
